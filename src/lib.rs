//! # scopus-report
//!
//! Scopus search export with journal metrics enrichment.
//!
//! ## Modules
//!
//! - [`query`] - Search expression builder
//! - [`scopus`] - Scopus Search API client
//! - [`pagination`] - Lazy walk over result pages
//! - [`extract`] - Search entry normalization
//! - [`document`] - Document page scraping (authors, funding text)
//! - [`metrics`] - CiteScore and SJR quartile lookups
//! - [`crossref`] - Crossref fallback for authors and funders
//! - [`filter`] - Funding-text phrase filter
//! - [`citation`] - Citation string formatting
//! - [`report`] - Report rows and xlsx output
//! - [`pipeline`] - End-to-end run
//! - [`config`] - API key and endpoints
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scopus_report::{config::Settings, pipeline, query};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let request = pipeline::RunRequest {
//!         query: query::build_query("", Some(60000001), Some(2023))?,
//!         max_fetch: Some(10),
//!         result_file: "result.xlsx".into(),
//!         filter: None,
//!         crossref_fallback: false,
//!     };
//!     let outcome = pipeline::run(&Settings::from_env(), &request).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod citation;
pub mod config;
pub mod crossref;
pub mod document;
pub mod error;
pub mod extract;
pub mod filter;
pub mod metrics;
pub mod pagination;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod scopus;

pub use error::{ReportError, Result};
