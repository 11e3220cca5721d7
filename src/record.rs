use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain;

/// One page observation written by a crawler worker, kept exactly as read.
///
/// Nothing is validated on the way in: a record may miss fields, carry fields
/// of the wrong type, or not be an object at all. The accessors below are the
/// only place defaults are applied. A value that is absent, `null`, or not of
/// the documented type (string `url`, non-negative integer counts) reads as
/// the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlRecord(Value);

impl CrawlRecord {
    /// The record as it appeared in its source document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn count(&self, key: &str) -> u64 {
        self.0.get(key).and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn url(&self) -> &str {
        self.0.get("url").and_then(Value::as_str).unwrap_or("")
    }

    pub fn depth(&self) -> u64 {
        self.count("depth")
    }

    pub fn links_extracted(&self) -> u64 {
        self.count("linksExtracted")
    }

    pub fn time_taken_ms(&self) -> u64 {
        self.count("timeTakenMs")
    }

    /// Network location of the record's URL, empty when absent or unparsable.
    pub fn domain(&self) -> String {
        domain::domain_of(self.url())
    }
}

impl From<Value> for CrawlRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
