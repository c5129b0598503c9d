//! Custom error types for scopus-report.
//!
//! Every failure that aborts a run is a [`ReportError`]. Lookups that are
//! allowed to miss (CiteScore, quartile, CrossRef) never produce one; they
//! log the cause and hand back a sentinel instead.

use thiserror::Error;

/// Main error type for scopus-report operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No query fragment was supplied
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Search API rejected the query syntax (HTTP 400)
    #[error("Invalid query")]
    InvalidQuery,

    /// Search API rejected the key (HTTP 401)
    #[error("Missing or invalid API key")]
    Unauthorized,

    /// Search API quota is used up (HTTP 429)
    #[error("Quota exhausted")]
    QuotaExhausted,

    /// Any other non-success status from an upstream service
    #[error("Request failed: {code} - {message}")]
    Upstream {
        /// HTTP status code
        code: u16,
        /// Short description of the failed request
        message: String,
    },

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML or payload parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search entry has no `scopus` link to its document page
    #[error("Entry {0} has no document page link")]
    MissingDocumentLink(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet serialization error
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ReportError`
pub type Result<T> = std::result::Result<T, ReportError>;

/// Map a non-success search API status to the matching error.
pub fn search_status_error(status: reqwest::StatusCode) -> ReportError {
    match status.as_u16() {
        400 => ReportError::InvalidQuery,
        401 => ReportError::Unauthorized,
        429 => ReportError::QuotaExhausted,
        code => ReportError::Upstream {
            code,
            message: format!("Scopus search error: {}", status),
        },
    }
}
