//! Normalization of raw search entries.

use crate::error::{ReportError, Result};
use crate::scopus::{find_link, Entry};
use chrono::{Datelike, NaiveDate};
use tracing::warn;

/// Normalized fields of one search entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRecord {
    /// Scopus document page
    pub doc_link: String,
    pub scopus_id: String,
    pub doi: String,
    pub eid: String,
    pub subtype_description: String,
    /// First author only
    pub creator: String,
    pub title: String,
    pub journal: String,
    pub year: Option<i32>,
    pub volume: String,
    pub issue: String,
    pub pages: String,
    pub cited_by_count: Option<u64>,
    pub issn: String,
}

/// Map a raw entry to an [`ExtractedRecord`].
///
/// # Errors
///
/// Returns [`ReportError::MissingDocumentLink`] when the entry carries no
/// `scopus` link.
pub fn extract_record(entry: &Entry) -> Result<ExtractedRecord> {
    let identifier = text(&entry.identifier);
    let scopus_id = match identifier.split_once(':') {
        Some((_, id)) => id.to_string(),
        None => identifier.clone(),
    };

    let doc_link = find_link(&entry.links, "scopus")
        .filter(|href| !href.is_empty())
        .ok_or_else(|| ReportError::MissingDocumentLink(identifier.clone()))?
        .to_string();

    Ok(ExtractedRecord {
        doc_link,
        scopus_id,
        doi: text(&entry.doi),
        eid: text(&entry.eid),
        subtype_description: text(&entry.subtype_description),
        creator: text(&entry.creator),
        title: text(&entry.title),
        journal: text(&entry.publication_name),
        year: cover_year(entry.cover_date.as_deref()),
        volume: text(&entry.volume),
        issue: text(&entry.issue),
        pages: text(&entry.page_range),
        cited_by_count: entry.cited_by_count,
        issn: entry.serial_issn().to_string(),
    })
}

fn text(field: &Option<String>) -> String {
    field.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Year component of a `YYYY-MM-DD` cover date
fn cover_year(cover_date: Option<&str>) -> Option<i32> {
    let date = cover_date.map(str::trim).filter(|d| !d.is_empty())?;
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => Some(d.year()),
        Err(e) => {
            warn!(cover_date = date, error = %e, "Unparseable cover date");
            None
        }
    }
}
