//! Crossref API client used as a fallback source of authors and funders.
//!
//! Only consulted when the Scopus document page yields nothing. Lookups
//! never fail the run: errors are logged and treated as "no data".

use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Polite pool email for Crossref API
const MAILTO: &str = "scopus-report@example.com";

/// Authors and funders of one work
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossrefWork {
    /// Authors as "Family Given"
    pub authors: Vec<String>,
    /// Funders as "Name award, award", joined with "; "
    pub funding_text: String,
}

/// Crossref works API client
pub struct CrossrefClient {
    base_url: Url,
    client: reqwest::Client,
}

impl CrossrefClient {
    /// Create a new CrossrefClient rooted at the Crossref API host
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ReportError::Config(format!("Invalid Crossref URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .user_agent(format!("scopus-report/0.1 (mailto:{})", MAILTO))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Lookup a work by DOI
    ///
    /// Returns None if not found or on error
    pub async fn work(&self, doi: &str) -> Option<CrossrefWork> {
        let doi = doi.trim();
        if doi.is_empty() {
            return None;
        }

        match self.do_lookup(doi).await {
            Ok(Some(work)) => {
                info!(doi = doi, authors = work.authors.len(), "Crossref fallback hit");
                Some(work)
            }
            Ok(None) => {
                debug!(doi = doi, "Crossref returned no data");
                None
            }
            Err(e) => {
                warn!(doi = doi, error = %e, "Crossref lookup failed");
                None
            }
        }
    }

    async fn do_lookup(&self, doi: &str) -> Result<Option<CrossrefWork>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ReportError::Config("Crossref URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("works")
            .push(doi);

        let response = self
            .client
            .get(url)
            .query(&[("mailto", MAILTO)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ReportError::Upstream {
                code: response.status().as_u16(),
                message: format!("Crossref API error: {}", response.status()),
            });
        }

        let data: CrossrefResponse = response.json().await?;
        if data.status != "ok" {
            return Ok(None);
        }

        Ok(data.message.map(parse_crossref_message))
    }
}

// === Crossref API Response Types ===

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<CrossrefMessage>,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    #[serde(default)]
    funder: Vec<CrossrefFunder>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    #[serde(default)]
    given: String,
    #[serde(default)]
    family: String,
}

#[derive(Debug, Deserialize)]
struct CrossrefFunder {
    #[serde(default)]
    name: String,
    #[serde(default)]
    award: Vec<String>,
}

fn parse_crossref_message(message: CrossrefMessage) -> CrossrefWork {
    let authors = message
        .author
        .iter()
        .map(|a| format!("{} {}", a.family, a.given).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let funding_text = message
        .funder
        .iter()
        .map(|f| format!("{} {}", f.name, f.award.join(", ")).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    CrossrefWork {
        authors,
        funding_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_parse_crossref_message() {
        let message = CrossrefMessage {
            author: vec![
                CrossrefAuthor {
                    given: "John".to_string(),
                    family: "Doe".to_string(),
                },
                CrossrefAuthor {
                    given: String::new(),
                    family: "Consortium".to_string(),
                },
            ],
            funder: vec![
                CrossrefFunder {
                    name: "Russian Science Foundation".to_string(),
                    award: vec!["21-00-00001".to_string(), "21-00-00002".to_string()],
                },
                CrossrefFunder {
                    name: "NSF".to_string(),
                    award: vec![],
                },
            ],
        };

        let work = parse_crossref_message(message);
        assert_eq!(work.authors, vec!["Doe John", "Consortium"]);
        assert_eq!(
            work.funding_text,
            "Russian Science Foundation 21-00-00001, 21-00-00002; NSF"
        );
    }

    #[tokio::test]
    async fn test_work_lookup() -> Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/works/10.1000%2Ftest")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "ok",
                    "message": {
                        "author": [{"given": "Ada", "family": "Lovelace"}],
                        "funder": [{"name": "Fund", "award": ["A-1"]}]
                    }
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = CrossrefClient::new(&server.url())?;
        let work = client.work("10.1000/test").await.expect("Work should be found");
        assert_eq!(work.authors, vec!["Lovelace Ada"]);
        assert_eq!(work.funding_text, "Fund A-1");
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_work_is_none() -> Result<()> {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = CrossrefClient::new(&server.url())?;
        assert!(client.work("10.1000/missing").await.is_none());
        assert!(client.work("").await.is_none());
        Ok(())
    }
}
