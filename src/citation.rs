//! Bibliographic citation string in the report's standard layout.

use crate::extract::ExtractedRecord;

/// Authors listed before the list is cut short
const MAX_AUTHORS: usize = 3;

/// Marker appended to a truncated author list
const ET_AL: &str = "и др.";

/// Render the citation line for a record and its scraped author list
pub fn format_citation(record: &ExtractedRecord, authors: &[String]) -> String {
    let mut names: Vec<String> = authors
        .iter()
        .take(MAX_AUTHORS)
        .map(|a| a.replace(',', ""))
        .collect();
    if authors.len() > MAX_AUTHORS {
        names.push(ET_AL.to_string());
    }

    let year = record.year.map(|y| y.to_string()).unwrap_or_default();
    let issue_part = if record.issue.is_empty() {
        String::new()
    } else {
        format!("No. {}. ", record.issue)
    };
    let pages_part = if record.pages.is_empty() {
        String::new()
    } else {
        format!("pp. {}. ", record.pages)
    };

    format!(
        "{} {} //\n {}.\n {}. Vol. {}. {}{}https://doi.org/{}",
        names.join(", "),
        record.title,
        record.journal,
        year,
        record.volume,
        issue_part,
        pages_part,
        record.doi
    )
}
