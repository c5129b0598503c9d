//! Scopus document page scraping.
//!
//! The search API does not return the full author list or the funding
//! acknowledgement, so both are read from the public document page.

use crate::error::{ReportError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Browser identification sent with page requests
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.5112.79 Safari/537.36";

/// Data scraped from a document page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPageData {
    pub authors: Vec<String>,
    pub funding_text: String,
}

/// Fetches and parses document pages
pub struct DocumentScraper {
    client: reqwest::Client,
}

impl DocumentScraper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch a document page and extract authors and funding text.
    ///
    /// # Errors
    ///
    /// Network failures and non-success statuses are returned as errors;
    /// missing page sections are not.
    pub async fn fetch(&self, url: &str) -> Result<DocumentPageData> {
        debug!(url = url, "Fetching document page");

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Upstream {
                code: status.as_u16(),
                message: format!("Document page error: {}", url),
            });
        }

        let html = response.text().await?;
        parse_document_page(&html)
    }
}

/// Parse author names and funding text from document page HTML
pub fn parse_document_page(html: &str) -> Result<DocumentPageData> {
    let document = Html::parse_document(html);

    let author_selector = Selector::parse(
        r#"section#authorlist > ul span[class="previewTxt"], section#authorlist > ul span[class="c"]"#,
    )
    .map_err(|e| ReportError::Parse(e.to_string()))?;
    let funding_selector =
        Selector::parse("#fundingText").map_err(|e| ReportError::Parse(e.to_string()))?;
    let whitespace = Regex::new(r"\s+").map_err(|e| ReportError::Parse(e.to_string()))?;

    let authors = document
        .select(&author_selector)
        .flat_map(|span| own_text(span, &whitespace))
        .collect();

    let funding_text = document
        .select(&funding_selector)
        .next()
        .and_then(|node| own_text(node, &whitespace).into_iter().next())
        .unwrap_or_default();

    Ok(DocumentPageData {
        authors,
        funding_text,
    })
}

/// Non-empty text nodes that are direct children of the element
fn own_text(element: ElementRef<'_>, whitespace: &Regex) -> Vec<String> {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| whitespace.replace_all(text.trim(), " ").into_owned())
        .filter(|text| !text.is_empty())
        .collect()
}
