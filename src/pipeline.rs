use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate;
use crate::error::PipelineError;
use crate::merge::{self, MergeOptions, MergeStatus};
use crate::repair::DocumentRepair;
use crate::summary::CrawlAnalysis;
use crate::Args;

/// Merges the inputs named in `args`, optionally persists the merged dataset,
/// and summarizes it.
///
/// Fails only when every source failed; a merge that yields zero records is a
/// valid, empty analysis.
pub fn analyze_crawl(args: &Args) -> Result<CrawlAnalysis> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "pipeline", "Starting crawl analysis");

    let mut sources = merge::collect_sources(&args.inputs)?;
    if let Some(output) = &args.merged_output {
        exclude_path(&mut sources, output);
    }

    let options = MergeOptions {
        repair: if args.repair {
            Some(DocumentRepair::new()?)
        } else {
            None
        },
    };
    let merged = merge::merge_files(&sources, &options);

    match merged.status() {
        MergeStatus::Failed => {
            return Err(PipelineError::AllSourcesFailed {
                attempted: merged.sources_attempted,
            }
            .into());
        }
        MergeStatus::Partial => warn!(
            action = "merge",
            component = "pipeline",
            sources_failed = merged.failures.len(),
            sources_attempted = merged.sources_attempted,
            "Merge partially failed"
        ),
        MergeStatus::Complete => {}
    }

    if let Some(output) = &args.merged_output {
        merge::write_dataset(output, &merged.records)?;
    }

    let workers = args
        .workers
        .map_or_else(aggregate::default_workers, usize::from);
    let summary = aggregate::summarize_parallel(&merged.records, workers)?;

    info!(
        action = "complete",
        component = "pipeline",
        total_pages = summary.total_pages,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );

    Ok(CrawlAnalysis {
        generated_at: Utc::now(),
        sources_attempted: merged.sources_attempted,
        failed_sources: merged.failures.iter().map(|e| e.source_name()).collect(),
        summary,
    })
}

/// Drops the merged output from the sources so a rerun over the same
/// directory does not count its records twice.
fn exclude_path(sources: &mut Vec<PathBuf>, output: &Path) {
    let Ok(output) = fs::canonicalize(output) else {
        return;
    };
    sources.retain(|source| {
        let keep = fs::canonicalize(source).map_or(true, |source| source != output);
        if !keep {
            info!(action = "exclude", component = "sources", file_path = ?source, "Skipping merged output among inputs");
        }
        keep
    });
}
