//! Best current quartile scraped from the SCImago Journal Rank site.
//!
//! Three steps: search by ISSN, follow the single journal link, read the
//! quartile-by-year table next to the `svgquartiles` chart.

use super::MetricValue;
use crate::error::{ReportError, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// One row of the quartile table
#[derive(Debug, Clone, PartialEq)]
pub struct QuartileRow {
    pub field: String,
    pub year: String,
    pub quartile: String,
}

/// SJR scraping client
pub struct QuartileClient {
    base_url: Url,
    client: reqwest::Client,
}

impl QuartileClient {
    /// Create a new QuartileClient rooted at the SJR site URL
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| ReportError::Config(format!("Invalid SJR URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Best quartile of the latest year for the journal with this ISSN.
    ///
    /// Never fails; misses are reported as sentinels.
    pub async fn best_quartile(&self, issn: &str) -> MetricValue {
        let issn = issn.trim();
        if issn.is_empty() {
            debug!("No ISSN, skipping quartile lookup");
            return MetricValue::NotAvailable;
        }

        match self.lookup(issn).await {
            Ok(value) => value,
            Err(e) => {
                warn!(issn = issn, error = %e, "Quartile lookup failed");
                MetricValue::NotAvailable
            }
        }
    }

    async fn lookup(&self, issn: &str) -> Result<MetricValue> {
        let mut search_url = self
            .base_url
            .join("journalsearch.php")
            .map_err(|e| ReportError::Parse(e.to_string()))?;
        search_url.query_pairs_mut().append_pair("q", issn);

        let search_html = self.fetch(search_url).await?;
        let Some(journal_link) = parse_journal_link(&search_html)? else {
            warn!(issn = issn, "No journal links in SJR search results");
            return Ok(MetricValue::NoJournalLinks);
        };

        let journal_url = self
            .base_url
            .join(&journal_link)
            .map_err(|e| ReportError::Parse(format!("Bad journal link '{}': {}", journal_link, e)))?;
        let journal_html = self.fetch(journal_url).await?;

        let Some(rows) = parse_quartile_table(&journal_html)? else {
            warn!(issn = issn, "No quartile table on journal page");
            return Ok(MetricValue::NotAvailable);
        };

        match best_quartile(&rows) {
            Some(q) => {
                info!(issn = issn, quartile = %q, "Found quartile");
                Ok(MetricValue::Value(q))
            }
            None => Ok(MetricValue::NotAvailable),
        }
    }

    async fn fetch(&self, url: Url) -> Result<String> {
        debug!(url = %url, "Fetching SJR page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Upstream {
                code: status.as_u16(),
                message: format!("SJR error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

/// First journal link of an SJR search results page.
///
/// An ISSN search is expected to match exactly one journal.
pub fn parse_journal_link(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let results_selector =
        Selector::parse(".search_results").map_err(|e| ReportError::Parse(e.to_string()))?;
    let link_selector = Selector::parse("a").map_err(|e| ReportError::Parse(e.to_string()))?;

    Ok(document
        .select(&results_selector)
        .next()
        .and_then(|results| results.select(&link_selector).next())
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty()))
}

/// Rows of the quartile table, or None when the page has no such table
pub fn parse_quartile_table(html: &str) -> Result<Option<Vec<QuartileRow>>> {
    let document = Html::parse_document(html);
    let chart_selector =
        Selector::parse("div#svgquartiles").map_err(|e| ReportError::Parse(e.to_string()))?;
    let table_selector = Selector::parse("table").map_err(|e| ReportError::Parse(e.to_string()))?;
    let row_selector = Selector::parse("tbody tr").map_err(|e| ReportError::Parse(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| ReportError::Parse(e.to_string()))?;

    let table = document
        .select(&chart_selector)
        .next()
        .and_then(|chart| chart.parent().and_then(ElementRef::wrap))
        .and_then(|container| container.select(&table_selector).next());

    let Some(table) = table else {
        return Ok(None);
    };

    let rows = table
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            match cells.as_slice() {
                [field, year, quartile, ..] => Some(QuartileRow {
                    field: field.clone(),
                    year: year.clone(),
                    quartile: quartile.clone(),
                }),
                _ => None,
            }
        })
        .collect();

    Ok(Some(rows))
}

/// Minimum (best) quartile among the rows of the latest year
pub fn best_quartile(rows: &[QuartileRow]) -> Option<String> {
    let latest = rows
        .iter()
        .filter_map(|r| r.year.parse::<i32>().ok())
        .max()?;

    rows.iter()
        .filter(|r| r.year.parse::<i32>().ok() == Some(latest))
        .map(|r| r.quartile.clone())
        .filter(|q| !q.is_empty())
        .min()
}
