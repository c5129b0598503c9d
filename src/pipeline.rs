//! Search → enrich → report pipeline.
//!
//! Per entry: normalize, scrape the document page (fatal on failure),
//! optionally fall back to Crossref, optionally filter on funding text,
//! then look up CiteScore and quartile (never fatal).

use crate::citation::format_citation;
use crate::config::Settings;
use crate::crossref::CrossrefClient;
use crate::document::DocumentScraper;
use crate::error::{ReportError, Result};
use crate::extract::extract_record;
use crate::filter::FilterPhrases;
use crate::metrics::{CiteScoreClient, QuartileClient};
use crate::pagination::PageWalker;
use crate::report::{Report, ReportRow};
use crate::scopus::{Entry, QuotaInfo, SearchClient, SearchPage};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info};

/// What to search for and where to put the result
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub query: String,
    pub max_fetch: Option<usize>,
    pub result_file: PathBuf,
    /// Keep only rows whose funding text passes this filter
    pub filter: Option<FilterPhrases>,
    pub crossref_fallback: bool,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The search matched nothing; no file was written
    NoResults,
    Written {
        total_results: u64,
        rows: usize,
        pages: usize,
        path: PathBuf,
        quota: Option<QuotaInfo>,
    },
}

/// Turns search entries into report rows
pub struct Enricher {
    documents: DocumentScraper,
    cite_scores: CiteScoreClient,
    quartiles: QuartileClient,
    crossref: Option<CrossrefClient>,
    filter: Option<FilterPhrases>,
}

impl Enricher {
    pub fn new(settings: &Settings, filter: Option<FilterPhrases>, crossref_fallback: bool) -> Result<Self> {
        let endpoints = &settings.endpoints;
        let crossref = if crossref_fallback {
            Some(CrossrefClient::new(&endpoints.crossref)?)
        } else {
            None
        };

        Ok(Self {
            documents: DocumentScraper::new()?,
            cite_scores: CiteScoreClient::new(settings.api_key.clone(), &endpoints.elsevier)?,
            quartiles: QuartileClient::new(&endpoints.sjr)?,
            crossref,
            filter,
        })
    }

    /// Build the report row for one entry.
    ///
    /// Returns `Ok(None)` when the funding filter rejects the entry.
    pub async fn build_row(&self, entry: &Entry) -> Result<Option<ReportRow>> {
        let record = extract_record(entry)?;
        let mut page = self.documents.fetch(&record.doc_link).await?;

        if let Some(crossref) = &self.crossref {
            if page.authors.is_empty() || page.funding_text.is_empty() {
                if let Some(work) = crossref.work(&record.doi).await {
                    if page.authors.is_empty() {
                        page.authors = work.authors;
                    }
                    if page.funding_text.is_empty() {
                        page.funding_text = work.funding_text;
                    }
                }
            }
        }

        if let Some(filter) = &self.filter {
            if !filter.accepts(&page.funding_text) {
                debug!(scopus_id = %record.scopus_id, "Rejected by funding filter");
                return Ok(None);
            }
        }

        let cite_score = self.cite_scores.cite_score(&record.issn).await;
        let quartile = self.quartiles.best_quartile(&record.issn).await;
        let citation = format_citation(&record, &page.authors);

        Ok(Some(ReportRow {
            page_link: record.doc_link,
            scopus_id: record.scopus_id,
            doi: record.doi,
            eid: record.eid,
            subtype_description: record.subtype_description,
            cite_score,
            quartile,
            year: record.year,
            cited_by_count: record.cited_by_count.unwrap_or(0),
            citation,
            authors: page.authors.join(", "),
            title: record.title,
            journal: record.journal,
            funding_text: page.funding_text,
        }))
    }
}

/// Pull entries until the walk ends or `max_fetch` rows are collected
pub async fn collect_report(
    walker: &mut PageWalker<'_>,
    enricher: &Enricher,
    max_fetch: Option<usize>,
    progress: &ProgressBar,
) -> Result<Report> {
    let mut report = Report::new();

    while !report.is_full(max_fetch) {
        let Some(entry) = walker.next_entry().await? else {
            break;
        };

        if let Some(row) = enricher.build_row(&entry).await? {
            report.push(row);
        }
        progress.inc(1);
    }

    Ok(report)
}

/// Result of the initial search, before any page is walked
pub struct SearchRun {
    search: SearchClient,
    first: SearchPage,
}

impl SearchRun {
    /// Run the initial search request
    pub async fn start(settings: &Settings, query: &str) -> Result<Self> {
        let search = SearchClient::new(settings.api_key.clone(), &settings.endpoints.scopus)?;
        let first = search.search(query).await?;
        info!(total = first.results.total(), "Search complete");

        Ok(Self { search, first })
    }

    /// Total hits reported by the first page
    pub fn total_results(&self) -> u64 {
        self.first.results.total()
    }

    /// Walk the pages, enrich every entry and write the workbook
    pub async fn finish(self, settings: &Settings, request: &RunRequest) -> Result<RunOutcome> {
        let total_results = self.total_results();
        if total_results == 0 {
            return Ok(RunOutcome::NoResults);
        }

        let enricher = Enricher::new(settings, request.filter.clone(), request.crossref_fallback)?;
        let mut walker = PageWalker::new(&self.search, self.first);

        let expected = match request.max_fetch {
            Some(max) if request.filter.is_none() => total_results.min(max as u64),
            _ => total_results,
        };
        let progress = ProgressBar::new(expected);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
                .map_err(|e| ReportError::Config(e.to_string()))?
                .progress_chars("=> "),
        );

        let report = collect_report(&mut walker, &enricher, request.max_fetch, &progress).await?;
        progress.finish_and_clear();

        report.write_xlsx(&request.result_file)?;

        Ok(RunOutcome::Written {
            total_results,
            rows: report.len(),
            pages: walker.pages(),
            path: request.result_file.clone(),
            quota: walker.quota().cloned(),
        })
    }
}

/// Run a whole export: search, walk pages, enrich, write the workbook
pub async fn run(settings: &Settings, request: &RunRequest) -> Result<RunOutcome> {
    SearchRun::start(settings, &request.query)
        .await?
        .finish(settings, request)
        .await
}
