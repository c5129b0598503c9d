//! Lazy walk over the pages of a search.
//!
//! Entries are handed out one at a time; the next page is requested only
//! when the current one is drained and the caller asks for more. A caller
//! that stops pulling (result cap reached) never triggers another request.

use crate::error::Result;
use crate::scopus::{Entry, QuotaInfo, SearchClient, SearchPage};
use std::collections::VecDeque;
use tracing::info;

enum WalkState {
    Fetching {
        entries: VecDeque<Entry>,
        next: Option<String>,
    },
    Done,
}

/// Walks `next` links starting from an already fetched first page
pub struct PageWalker<'a> {
    client: &'a SearchClient,
    state: WalkState,
    pages: usize,
    quota: Option<QuotaInfo>,
}

impl<'a> PageWalker<'a> {
    pub fn new(client: &'a SearchClient, first: SearchPage) -> Self {
        let mut walker = Self {
            client,
            state: WalkState::Done,
            pages: 0,
            quota: None,
        };
        walker.load(first);
        walker
    }

    fn load(&mut self, page: SearchPage) {
        self.pages += 1;
        if page.quota.is_some() {
            self.quota = page.quota;
        }

        let results = page.results;
        let next = results.next_link().map(str::to_string);
        info!(
            page = self.pages,
            entries = results.entries.len(),
            "Processing page"
        );

        self.state = WalkState::Fetching {
            entries: results.entries.into(),
            next,
        };
    }

    /// Pull the next entry, fetching a follow-up page when needed.
    ///
    /// Returns `Ok(None)` once the last page is drained.
    ///
    /// # Errors
    ///
    /// A failed follow-up request ends the walk with the same errors as
    /// the initial search.
    pub async fn next_entry(&mut self) -> Result<Option<Entry>> {
        loop {
            let next_url = match &mut self.state {
                WalkState::Done => return Ok(None),
                WalkState::Fetching { entries, next } => {
                    if let Some(entry) = entries.pop_front() {
                        return Ok(Some(entry));
                    }
                    next.take()
                }
            };

            match next_url {
                Some(url) => {
                    self.state = WalkState::Done;
                    let page = self.client.fetch_page(&url).await?;
                    self.load(page);
                }
                None => self.state = WalkState::Done,
            }
        }
    }

    /// Number of pages fetched so far, including the first
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Quota reported by the most recent response
    pub fn quota(&self) -> Option<&QuotaInfo> {
        self.quota.as_ref()
    }
}
