//! Scopus Search API client.
//!
//! Payloads are decoded into typed records whose fields are all optional,
//! so a missing key is an empty value rather than a lookup failure.

use crate::error::{search_status_error, ReportError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Search endpoint path, relative to the Elsevier API host
const SEARCH_PATH: &str = "/content/search/scopus";

/// Header carrying the API key on follow-up page requests
const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// One page of search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(
        rename = "opensearch:totalResults",
        default,
        deserialize_with = "de_opt_count"
    )]
    pub total_results: Option<u64>,
    #[serde(rename = "entry", default)]
    pub entries: Vec<Entry>,
    #[serde(rename = "link", default)]
    pub links: Vec<Link>,
}

impl SearchResults {
    /// Total hits for the query (0 when the field is absent)
    pub fn total(&self) -> u64 {
        self.total_results.unwrap_or(0)
    }

    /// URL of the following page, if any
    pub fn next_link(&self) -> Option<&str> {
        find_link(&self.links, "next")
    }
}

/// Link object as used by both pages and entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(rename = "@ref", default)]
    pub rel: String,
    #[serde(rename = "@href", default)]
    pub href: String,
}

/// Return the href of the first link with the given relation
pub fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.rel == rel)
        .map(|l| l.href.as_str())
}

/// A raw search-result entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(rename = "dc:identifier", default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub eid: Option<String>,
    #[serde(rename = "prism:doi", default)]
    pub doi: Option<String>,
    #[serde(rename = "subtypeDescription", default)]
    pub subtype_description: Option<String>,
    #[serde(rename = "dc:creator", default)]
    pub creator: Option<String>,
    #[serde(rename = "dc:title", default)]
    pub title: Option<String>,
    #[serde(rename = "prism:publicationName", default)]
    pub publication_name: Option<String>,
    #[serde(rename = "prism:coverDate", default)]
    pub cover_date: Option<String>,
    #[serde(rename = "prism:volume", default)]
    pub volume: Option<String>,
    #[serde(rename = "prism:issueIdentifier", default)]
    pub issue: Option<String>,
    #[serde(rename = "prism:pageRange", default)]
    pub page_range: Option<String>,
    #[serde(rename = "citedby-count", default, deserialize_with = "de_opt_count")]
    pub cited_by_count: Option<u64>,
    #[serde(rename = "prism:issn", default)]
    pub issn: Option<String>,
    #[serde(rename = "prism:eIssn", default)]
    pub eissn: Option<String>,
    #[serde(rename = "link", default)]
    pub links: Vec<Link>,
}

impl Entry {
    /// Print ISSN, falling back to the electronic one
    pub fn serial_issn(&self) -> &str {
        [&self.issn, &self.eissn]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Accept counts sent either as JSON strings or numbers
fn de_opt_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "search-results")]
    search_results: SearchResults,
}

/// API quota as reported by the rate limit headers
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaInfo {
    pub limit: String,
    pub remaining: String,
    pub reset: Option<DateTime<Utc>>,
}

impl QuotaInfo {
    /// Read quota headers; None when the limit header is absent
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        };

        let limit = header("X-RateLimit-Limit")?;
        let remaining = header("X-RateLimit-Remaining").unwrap_or_default();
        let reset = header("X-RateLimit-Reset")
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }
}

impl fmt::Display for QuotaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quota limit: {}", self.limit)?;
        writeln!(f, "Quota remaining: {}", self.remaining)?;
        match self.reset {
            Some(reset) => write!(f, "Quota resets at: {} UTC", reset.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "Quota resets at: unknown"),
        }
    }
}

/// A decoded page together with the quota of the response that carried it
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: SearchResults,
    pub quota: Option<QuotaInfo>,
}

/// Scopus Search API client
pub struct SearchClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SearchClient {
    /// Create a new SearchClient
    ///
    /// # Arguments
    ///
    /// * `api_key` - Elsevier API key
    /// * `base_url` - Elsevier API host
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Run the initial search request
    ///
    /// # Errors
    ///
    /// Status 400/401/429 map to their dedicated variants, any other
    /// non-success status to [`ReportError::Upstream`].
    pub async fn search(&self, query: &str) -> Result<SearchPage> {
        info!(query = query, "Querying Scopus");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .header(ACCEPT, "application/json")
            .query(&[("query", query), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        read_page(response).await
    }

    /// Fetch a follow-up page from a `next` link
    pub async fn fetch_page(&self, url: &str) -> Result<SearchPage> {
        debug!(url = url, "Fetching next page");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;

        read_page(response).await
    }
}

async fn read_page(response: reqwest::Response) -> Result<SearchPage> {
    let status = response.status();
    if !status.is_success() {
        return Err(search_status_error(status));
    }

    let quota = QuotaInfo::from_headers(response.headers());
    let envelope: SearchEnvelope = response.json().await?;

    debug!(
        entries = envelope.search_results.entries.len(),
        has_next = envelope.search_results.next_link().is_some(),
        "Decoded search page"
    );

    Ok(SearchPage {
        results: envelope.search_results,
        quota,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_decode_search_results() {
        let payload = json!({
            "opensearch:totalResults": "2",
            "link": [
                {"@ref": "self", "@href": "https://api/self"},
                {"@ref": "next", "@href": "https://api/next"}
            ],
            "entry": [
                {
                    "dc:identifier": "SCOPUS_ID:1",
                    "citedby-count": "12",
                    "prism:eIssn": "12345678",
                    "link": [{"@ref": "scopus", "@href": "https://scopus/1"}]
                },
                {"dc:identifier": "SCOPUS_ID:2", "citedby-count": 3}
            ]
        });

        let results: SearchResults =
            serde_json::from_value(payload).expect("Payload should decode");
        assert_eq!(results.total(), 2);
        assert_eq!(results.next_link(), Some("https://api/next"));
        assert_eq!(results.entries[0].cited_by_count, Some(12));
        assert_eq!(results.entries[0].serial_issn(), "12345678");
        assert_eq!(results.entries[1].cited_by_count, Some(3));
        assert_eq!(results.entries[1].serial_issn(), "");
    }

    #[test]
    fn test_missing_fields_default() {
        let results: SearchResults = serde_json::from_value(json!({})).expect("Empty decodes");
        assert_eq!(results.total(), 0);
        assert!(results.entries.is_empty());
        assert!(results.next_link().is_none());
    }

    #[test]
    fn test_quota_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Limit", HeaderValue::from_static("20000"));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("19990"));
        headers.insert("X-RateLimit-Reset", HeaderValue::from_static("1700000000"));

        let quota = QuotaInfo::from_headers(&headers).expect("Quota should parse");
        assert_eq!(quota.limit, "20000");
        assert_eq!(quota.remaining, "19990");
        assert!(quota
            .to_string()
            .contains("Quota resets at: 2023-11-14 22:13:20 UTC"));

        assert!(QuotaInfo::from_headers(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn test_search_status_errors() -> Result<()> {
        for (status, expected) in [(400, "Invalid query"), (401, "Missing or invalid API key"), (429, "Quota exhausted")] {
            let mut server = Server::new_async().await;
            let _mock = server
                .mock("GET", SEARCH_PATH)
                .match_query(Matcher::Any)
                .with_status(status)
                .create_async()
                .await;

            let client = SearchClient::new("key".to_string(), &server.url())?;
            let err = client.search("KEY(x)").await.expect_err("Search should fail");
            assert_eq!(err.to_string(), expected);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_search_sends_query_and_key() -> Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "AF-ID(1)".into()),
                Matcher::UrlEncoded("apiKey".into(), "key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("X-RateLimit-Limit", "10")
            .with_header("X-RateLimit-Remaining", "9")
            .with_header("X-RateLimit-Reset", "0")
            .with_body(json!({"search-results": {"opensearch:totalResults": "0"}}).to_string())
            .create_async()
            .await;

        let client = SearchClient::new("key".to_string(), &server.url())?;
        let page = client.search("AF-ID(1)").await?;
        mock.assert_async().await;
        assert_eq!(page.results.total(), 0);
        assert_eq!(page.quota.map(|q| q.remaining), Some("9".to_string()));
        Ok(())
    }
}
