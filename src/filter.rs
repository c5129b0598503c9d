//! Funding-text phrase filter.

use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Phrases searched for in a document's funding acknowledgement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPhrases {
    phrases: Vec<String>,
}

impl FilterPhrases {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    /// Load a newline-delimited phrase list; blank lines are skipped
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let phrases: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        info!(path = %path.display(), count = phrases.len(), "Loaded filter phrases");
        Ok(Self { phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Whether a row with this funding text is kept.
    ///
    /// Rows without funding text are dropped; with no phrases loaded any
    /// non-empty funding text passes.
    pub fn accepts(&self, funding_text: &str) -> bool {
        if funding_text.trim().is_empty() {
            return false;
        }
        self.phrases.is_empty() || self.phrases.iter().any(|p| funding_text.contains(p.as_str()))
    }
}
