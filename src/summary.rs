use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum number of entries in [`AnalysisSummary::top_domains`].
pub const TOP_DOMAINS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

/// Statistics derived from one complete record sequence.
///
/// `total_pages == 0` means there was no data; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_pages: u64,
    pub total_links: u128,
    pub total_time_seconds: f64,
    pub depth_distribution: BTreeMap<u64, u64>,
    /// Most frequent domains, count descending, ties in first-seen order.
    pub top_domains: Vec<DomainCount>,
    pub unique_domain_count: usize,
    /// Every distinct domain, not just the top ones.
    pub domain_total_time_ms: BTreeMap<String, u128>,
}

impl AnalysisSummary {
    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }
}

/// A finished run: the summary plus where its records came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlAnalysis {
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "sources")]
    pub sources_attempted: usize,
    pub failed_sources: Vec<String>,
    pub summary: AnalysisSummary,
}
