//! scopus-report - Scopus search export
//!
//! Searches Scopus, enriches every hit with CiteScore, SJR quartile and
//! document page details, and writes an xlsx report.
//!
//! ## Usage
//!
//! ```bash
//! scopus-report --af-id 60000001 --year 2023 --max-fetch 50 -o report.xlsx
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use scopus_report::{
    config::Settings,
    filter::FilterPhrases,
    pipeline::{RunOutcome, RunRequest, SearchRun},
    query,
};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Export Scopus search results with journal metrics to xlsx
#[derive(Parser)]
#[command(name = "scopus-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Affiliation id; matches documents by authors affiliated with it
    #[arg(short = 'a', long)]
    af_id: Option<u64>,

    /// Publication year
    #[arg(short, long)]
    year: Option<i32>,

    /// Query in Scopus advanced search syntax
    #[arg(short = 'q', long, default_value = "")]
    raw_query: String,

    /// Maximum number of rows to collect
    #[arg(short, long)]
    max_fetch: Option<usize>,

    /// Output xlsx file
    #[arg(short = 'o', long, default_value = "result.xlsx")]
    result_file: PathBuf,

    /// File with funding-text phrases, one per line
    #[arg(short, long)]
    filter_phrases_file: Option<PathBuf>,

    /// Keep only documents whose funding text contains a loaded phrase
    #[arg(long)]
    apply_filter: bool,

    /// Fill missing authors/funding from Crossref by DOI
    #[arg(long)]
    crossref_fallback: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let settings = Settings::from_env();

    let phrases = match &cli.filter_phrases_file {
        Some(path) => Some(
            FilterPhrases::load(path)
                .with_context(|| format!("Failed to load filter phrases from {}", path.display()))?,
        ),
        None => None,
    };
    if let Some(phrases) = &phrases {
        println!("Filter phrases: {:?}", phrases.phrases());
    }
    let filter = cli.apply_filter.then(|| phrases.unwrap_or_default());

    let query = query::build_query(&cli.raw_query, cli.af_id, cli.year)?;
    println!("Query: {}", query);

    let request = RunRequest {
        query,
        max_fetch: cli.max_fetch,
        result_file: cli.result_file,
        filter,
        crossref_fallback: cli.crossref_fallback,
    };

    let search = SearchRun::start(&settings, &request.query).await?;
    println!("Total found: {}", search.total_results());

    match search.finish(&settings, &request).await? {
        RunOutcome::NoResults => {}
        RunOutcome::Written {
            rows,
            pages,
            path,
            quota,
            ..
        } => {
            println!("Saved {} rows from {} page(s) to {}", rows, pages, path.display());
            if let Some(quota) = quota {
                println!("{}", quota);
            }
            println!("Done.");
        }
    }

    Ok(())
}
