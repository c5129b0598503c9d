//! CiteScore lookup through the Elsevier serial title API.

use super::{value_to_string, MetricValue};
use crate::error::{ReportError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Serial title endpoint path, relative to the Elsevier API host
const SERIAL_TITLE_PATH: &str = "/content/serial/title/issn";

/// Location of the current CiteScore within the response
const CITE_SCORE_POINTER: &str =
    "/serial-metadata-response/entry/0/citeScoreYearInfoList/citeScoreCurrentMetric";

/// Serial title API client
pub struct CiteScoreClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl CiteScoreClient {
    /// Create a new CiteScoreClient
    ///
    /// # Arguments
    ///
    /// * `api_key` - Elsevier API key
    /// * `base_url` - Elsevier API host
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Current CiteScore of the journal with the given ISSN or eISSN.
    ///
    /// Never fails; any problem yields [`MetricValue::NotAvailable`].
    pub async fn cite_score(&self, issn: &str) -> MetricValue {
        let issn = issn.trim();
        if issn.is_empty() {
            debug!("No ISSN, skipping CiteScore lookup");
            return MetricValue::NotAvailable;
        }

        match self.do_request(issn).await {
            Ok(body) => {
                let score = extract_cite_score(&body);
                if score.is_available() {
                    info!(issn = issn, score = %score, "Found CiteScore");
                }
                score
            }
            Err(e) => {
                warn!(issn = issn, error = %e, "CiteScore lookup failed");
                MetricValue::NotAvailable
            }
        }
    }

    async fn do_request(&self, issn: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}{}/{}", self.base_url, SERIAL_TITLE_PATH, issn))
            .header("Accept", "application/json")
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Upstream {
                code: status.as_u16(),
                message: format!("Serial title API error: {}", status),
            });
        }

        Ok(response.json().await?)
    }
}

/// Pull the current CiteScore out of a serial title response
pub fn extract_cite_score(body: &serde_json::Value) -> MetricValue {
    match body.pointer(CITE_SCORE_POINTER).and_then(value_to_string) {
        Some(score) => MetricValue::Value(score),
        None => {
            warn!(path = CITE_SCORE_POINTER, "CiteScore missing from response");
            MetricValue::NotAvailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_extract_present() {
        let body = json!({
            "serial-metadata-response": {
                "entry": [{
                    "citeScoreYearInfoList": {
                        "citeScoreCurrentMetric": "10.4",
                        "citeScoreCurrentMetricYear": "2023"
                    }
                }]
            }
        });
        assert_eq!(extract_cite_score(&body), MetricValue::Value("10.4".into()));
    }

    #[test]
    fn test_extract_missing_key_is_sentinel() {
        let body = json!({"serial-metadata-response": {"entry": [{"dc:title": "Carbon"}]}});
        assert_eq!(extract_cite_score(&body), MetricValue::NotAvailable);
        assert_eq!(extract_cite_score(&json!({})).to_string(), "N/A");
    }

    #[tokio::test]
    async fn test_lookup_by_issn() -> Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/content/serial/title/issn/00086223")
            .match_query(Matcher::UrlEncoded("apiKey".into(), "key".into()))
            .with_body(
                json!({
                    "serial-metadata-response": {
                        "entry": [{"citeScoreYearInfoList": {"citeScoreCurrentMetric": 10.4}}]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = CiteScoreClient::new("key".to_string(), &server.url())?;
        assert_eq!(client.cite_score("00086223").await.to_string(), "10.4");
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_failures_are_sentinels() -> Result<()> {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = CiteScoreClient::new("key".to_string(), &server.url())?;
        assert_eq!(client.cite_score("12345678").await, MetricValue::NotAvailable);
        assert_eq!(client.cite_score("").await, MetricValue::NotAvailable);
        Ok(())
    }
}
