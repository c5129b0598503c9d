//! Journal-level metrics lookups.
//!
//! Both lookups are allowed to miss: a failure is logged and reported as
//! a [`MetricValue`] sentinel so one journal never aborts the batch.

pub mod citescore;
pub mod quartile;

pub use citescore::CiteScoreClient;
pub use quartile::QuartileClient;

use std::fmt;

/// Outcome of a metric lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    Value(String),
    /// Data missing at the source or the request failed
    NotAvailable,
    /// The ranking site search returned no journal link
    NoJournalLinks,
}

impl MetricValue {
    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Value(_))
    }

    /// The value, or the sentinel text written in its place
    pub fn as_str(&self) -> &str {
        match self {
            MetricValue::Value(v) => v,
            MetricValue::NotAvailable => "N/A",
            MetricValue::NoJournalLinks => "N/A (no links)",
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert JSON value to string
fn value_to_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Null => None,
        _ => Some(val.to_string()),
    }
}
