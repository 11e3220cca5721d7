use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

use crate::record::CrawlRecord;
use crate::summary::{AnalysisSummary, DomainCount, TOP_DOMAINS_LIMIT};

#[derive(Debug)]
struct DomainTally {
    count: u64,
    time_ms: u128,
    /// Index of the first record carrying this domain.
    first_seen: usize,
}

/// Running totals over a contiguous or scattered subset of the records.
/// Every field combines additively, except `first_seen` which keeps the minimum.
/// Counts are bounded by the number of records; the summed `u64` fields are
/// widened to `u128` so no valid input can overflow them.
#[derive(Debug, Default)]
struct Tally {
    pages: u64,
    links: u128,
    time_ms: u128,
    depths: HashMap<u64, u64>,
    domains: HashMap<String, DomainTally>,
}

impl Tally {
    fn absorb(mut self, (index, record): (usize, &CrawlRecord)) -> Self {
        let time_ms = u128::from(record.time_taken_ms());
        self.pages += 1;
        self.links += u128::from(record.links_extracted());
        self.time_ms += time_ms;
        *self.depths.entry(record.depth()).or_insert(0) += 1;

        let domain = self
            .domains
            .entry(record.domain())
            .or_insert(DomainTally {
                count: 0,
                time_ms: 0,
                first_seen: index,
            });
        domain.count += 1;
        domain.time_ms += time_ms;
        self
    }

    fn combine(mut self, other: Tally) -> Self {
        self.pages += other.pages;
        self.links += other.links;
        self.time_ms += other.time_ms;
        for (depth, count) in other.depths {
            *self.depths.entry(depth).or_insert(0) += count;
        }
        for (domain, tally) in other.domains {
            match self.domains.entry(domain) {
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    existing.count += tally.count;
                    existing.time_ms += tally.time_ms;
                    existing.first_seen = existing.first_seen.min(tally.first_seen);
                }
                Entry::Vacant(entry) => {
                    entry.insert(tally);
                }
            }
        }
        self
    }

    fn finish(self) -> AnalysisSummary {
        let unique_domain_count = self.domains.len();

        let mut ranked: Vec<(String, DomainTally)> = self.domains.into_iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        let domain_total_time_ms = ranked
            .iter()
            .map(|(domain, tally)| (domain.clone(), tally.time_ms))
            .collect();
        let top_domains = ranked
            .into_iter()
            .take(TOP_DOMAINS_LIMIT)
            .map(|(domain, tally)| DomainCount {
                domain,
                count: tally.count,
            })
            .collect();

        AnalysisSummary {
            total_pages: self.pages,
            total_links: self.links,
            total_time_seconds: self.time_ms as f64 / 1000.0,
            depth_distribution: self.depths.into_iter().collect(),
            top_domains,
            unique_domain_count,
            domain_total_time_ms,
        }
    }
}

/// Computes the summary in a single pass over `records`.
pub fn summarize(records: &[CrawlRecord]) -> AnalysisSummary {
    records
        .iter()
        .enumerate()
        .fold(Tally::default(), Tally::absorb)
        .finish()
}

/// Same result as [`summarize`], with the grouping spread over `workers` threads.
pub fn summarize_parallel(records: &[CrawlRecord], workers: usize) -> Result<AnalysisSummary> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "aggregation",
        record_count = records.len(),
        worker_count = workers,
        "Starting aggregation"
    );

    let summary = if workers <= 1 {
        summarize(records)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("Failed to build aggregation thread pool")?;
        pool.install(|| {
            records
                .par_iter()
                .enumerate()
                .fold(Tally::default, Tally::absorb)
                .reduce(Tally::default, Tally::combine)
        })
        .finish()
    };

    info!(
        action = "complete",
        component = "aggregation",
        unique_domains = summary.unique_domain_count,
        duration_ms = start_time.elapsed().as_millis(),
        "Aggregation completed"
    );
    Ok(summary)
}

pub fn default_workers() -> usize {
    std::cmp::min(num_cpus::get(), 8)
}
