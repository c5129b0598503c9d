//! Report rows and xlsx serialization.

use crate::error::Result;
use crate::metrics::MetricValue;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use tracing::info;

/// Column headers of the report, after the unnamed index column
pub const REPORT_COLUMNS: [&str; 14] = [
    "page_link",
    "scopus_id",
    "doi",
    "eid",
    "тип публикации",
    "citeScore",
    "квартиль",
    "год",
    "кол-во цитирований",
    "article full",
    "авторы",
    "название",
    "журнал",
    "текст о финансировании",
];

/// One flattened report line
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub page_link: String,
    pub scopus_id: String,
    pub doi: String,
    pub eid: String,
    pub subtype_description: String,
    pub cite_score: MetricValue,
    pub quartile: MetricValue,
    pub year: Option<i32>,
    pub cited_by_count: u64,
    pub citation: String,
    pub authors: String,
    pub title: String,
    pub journal: String,
    pub funding_text: String,
}

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

impl ReportRow {
    fn cells(&self) -> [Cell<'_>; 14] {
        [
            Cell::Text(&self.page_link),
            Cell::Text(&self.scopus_id),
            Cell::Text(&self.doi),
            Cell::Text(&self.eid),
            Cell::Text(&self.subtype_description),
            Cell::Text(self.cite_score.as_str()),
            Cell::Text(self.quartile.as_str()),
            self.year.map_or(Cell::Blank, |y| Cell::Number(f64::from(y))),
            Cell::Number(self.cited_by_count as f64),
            Cell::Text(&self.citation),
            Cell::Text(&self.authors),
            Cell::Text(&self.title),
            Cell::Text(&self.journal),
            Cell::Text(&self.funding_text),
        ]
    }
}

/// Ordered collection of rows, written once at the end of a run
#[derive(Debug, Clone, Default)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the row cap has been reached
    pub fn is_full(&self, max_rows: Option<usize>) -> bool {
        max_rows.is_some_and(|max| self.rows.len() >= max)
    }

    /// Write the report as an xlsx workbook.
    ///
    /// The first column holds 1-based row numbers under an empty header.
    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, name) in REPORT_COLUMNS.iter().enumerate() {
            let col = u16::try_from(col + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            worksheet.write_string_with_format(0, col, *name, &header)?;
        }

        for (idx, row) in self.rows.iter().enumerate() {
            let line = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            worksheet.write_number_with_format(line, 0, f64::from(line), &header)?;

            for (col, cell) in (1u16..).zip(row.cells()) {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(line, col, text)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(line, col, n)?;
                    }
                    Cell::Blank => {}
                }
            }
        }

        workbook.save(path)?;
        info!(path = %path.display(), rows = self.rows.len(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::tempdir;

    fn row(id: &str) -> ReportRow {
        ReportRow {
            page_link: format!("https://scopus/{}", id),
            scopus_id: id.to_string(),
            doi: format!("10.1/{}", id),
            eid: format!("2-s2.0-{}", id),
            subtype_description: "Article".to_string(),
            cite_score: MetricValue::Value("4.5".to_string()),
            quartile: MetricValue::NoJournalLinks,
            year: Some(2021),
            cited_by_count: 3,
            citation: "A //\n B".to_string(),
            authors: "Smith A., Jones B.".to_string(),
            title: "Title".to_string(),
            journal: "Journal".to_string(),
            funding_text: "Funded".to_string(),
        }
    }

    fn text_at(range: &calamine::Range<Data>, pos: (u32, u32)) -> Option<String> {
        range.get_value(pos).map(|d| d.to_string())
    }

    #[test]
    fn test_is_full() {
        let mut report = Report::new();
        assert!(!report.is_full(None));
        assert!(report.is_full(Some(0)));
        report.push(row("1"));
        assert!(!report.is_full(Some(2)));
        report.push(row("2"));
        assert!(report.is_full(Some(2)));
        assert!(!report.is_full(None));
    }

    #[test]
    fn test_write_xlsx_layout() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("result.xlsx");

        let mut report = Report::new();
        report.push(row("1"));
        report.push(row("2"));
        report.write_xlsx(&path)?;

        let mut workbook: Xlsx<_> = open_workbook(&path).expect("Workbook should open");
        let range = workbook
            .worksheet_range_at(0)
            .expect("Sheet should exist")
            .expect("Sheet should read");

        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 15);
        for (col, name) in REPORT_COLUMNS.iter().enumerate() {
            assert_eq!(text_at(&range, (0, col as u32 + 1)).as_deref(), Some(*name));
        }
        assert_eq!(text_at(&range, (1, 0)).as_deref(), Some("1"));
        assert_eq!(text_at(&range, (2, 0)).as_deref(), Some("2"));
        assert_eq!(text_at(&range, (1, 2)).as_deref(), Some("1"));
        assert_eq!(text_at(&range, (2, 2)).as_deref(), Some("2"));
        assert_eq!(text_at(&range, (1, 6)).as_deref(), Some("4.5"));
        assert_eq!(text_at(&range, (1, 7)).as_deref(), Some("N/A (no links)"));
        assert_eq!(text_at(&range, (1, 8)).as_deref(), Some("2021"));
        assert_eq!(text_at(&range, (1, 9)).as_deref(), Some("3"));
        Ok(())
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let report = Report::new();
        assert!(report
            .write_xlsx(Path::new("/nonexistent/dir/result.xlsx"))
            .is_err());
    }
}
