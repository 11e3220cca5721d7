use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{display_domain, redact_domain};
use crate::summary::{AnalysisSummary, CrawlAnalysis, TOP_DOMAINS_LIMIT};
use crate::utils::format_number;
use crate::Args;

pub const DEPTH_CHART_FILE: &str = "depth_distribution.dat";
pub const TOP_DOMAINS_CHART_FILE: &str = "top_domains.dat";
pub const DOMAIN_TIME_CHART_FILE: &str = "time_per_domain.dat";

/// Per-domain totals, largest first, ties by domain name.
pub fn domain_times_by_duration(summary: &AnalysisSummary) -> Vec<(&str, u128)> {
    let mut times: Vec<(&str, u128)> = summary
        .domain_total_time_ms
        .iter()
        .map(|(domain, ms)| (domain.as_str(), *ms))
        .collect();
    times.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    times
}

fn shown(domain: &str, redact: bool) -> String {
    if redact {
        redact_domain(domain)
    } else {
        display_domain(domain).to_string()
    }
}

pub fn print_analysis_results(analysis: &CrawlAnalysis, args: &Args) {
    let summary = &analysis.summary;

    println!("\n--- Crawl Analysis ---");

    let failed = analysis.failed_sources.len();
    if failed > 0 {
        println!(
            "Sources: {} merged, {} skipped ({})",
            analysis.sources_attempted - failed,
            failed,
            analysis.failed_sources.join(", ")
        );
    } else {
        println!("Sources: {} merged", analysis.sources_attempted);
    }

    if summary.is_empty() {
        println!("No crawled pages found in the merged dataset.");
        return;
    }

    println!(
        "Total pages crawled: {}",
        format_number(u128::from(summary.total_pages))
    );
    println!("Total links found: {}", format_number(summary.total_links));
    println!(
        "Time taken for crawling: {:.2} seconds",
        summary.total_time_seconds
    );
    println!(
        "Unique sites crawled: {}",
        format_number(summary.unique_domain_count as u128)
    );

    println!("\nDepth distribution:");
    for (depth, count) in &summary.depth_distribution {
        println!("- depth {}: {} pages", depth, format_number(u128::from(*count)));
    }

    let top_count = args.top.map_or(TOP_DOMAINS_LIMIT, usize::from);
    println!(
        "\nTop {} domains:",
        std::cmp::min(top_count, summary.top_domains.len())
    );
    for entry in summary.top_domains.iter().take(top_count) {
        println!(
            "- {}: {} pages",
            shown(&entry.domain, args.redact),
            format_number(u128::from(entry.count))
        );
    }

    if args.domain_times {
        println!("\nTime per domain:");
        for (domain, ms) in domain_times_by_duration(summary) {
            println!("- {}: {} ms", shown(domain, args.redact), format_number(ms));
        }
    }
}

pub fn write_json_report(path: &Path, analysis: &CrawlAnalysis) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create report {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    analysis
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to write report {:?}", path))?;
    writer.flush()?;

    info!(action = "write", component = "json_report", file_path = ?path, "Summary report written");
    Ok(())
}

/// Writes whitespace-separated tables for the depth, top-domain and
/// per-domain time charts. Returns the files written.
pub fn write_chart_data(dir: &Path, summary: &AnalysisSummary) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart data directory {:?}", dir))?;

    let mut depth = String::from("# depth pages\n");
    for (level, count) in &summary.depth_distribution {
        depth.push_str(&format!("{} {}\n", level, count));
    }

    let mut top = String::from("# domain pages\n");
    for entry in &summary.top_domains {
        top.push_str(&format!("{} {}\n", display_domain(&entry.domain), entry.count));
    }

    let mut times = String::from("# domain time_ms\n");
    for (domain, ms) in domain_times_by_duration(summary) {
        times.push_str(&format!("{} {}\n", display_domain(domain), ms));
    }

    let mut written = Vec::new();
    for (name, content) in [
        (DEPTH_CHART_FILE, depth),
        (TOP_DOMAINS_CHART_FILE, top),
        (DOMAIN_TIME_CHART_FILE, times),
    ] {
        let path = dir.join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        written.push(path);
    }

    info!(action = "write", component = "chart_data", directory = ?dir, file_count = written.len(), "Chart data written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::record::CrawlRecord;

    fn summary() -> AnalysisSummary {
        let records: Vec<CrawlRecord> = serde_json::from_str(
            r#"[
                {"url": "http://a.com/1", "depth": 0, "timeTakenMs": 40},
                {"url": "http://b.com/1", "depth": 1, "timeTakenMs": 90},
                {"url": "http://a.com/2", "depth": 1, "timeTakenMs": 50},
                {"depth": 2}
            ]"#,
        )
        .unwrap();
        summarize(&records)
    }

    #[test]
    fn domain_times_sort_by_duration() {
        let summary = summary();
        assert_eq!(
            domain_times_by_duration(&summary),
            vec![("a.com", 90), ("b.com", 90), ("", 0)]
        );
    }

    #[test]
    fn chart_tables() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_chart_data(dir.path(), &summary()).unwrap();
        assert_eq!(written.len(), 3);

        let depth = fs::read_to_string(dir.path().join(DEPTH_CHART_FILE)).unwrap();
        assert_eq!(depth, "# depth pages\n0 1\n1 2\n2 1\n");

        let top = fs::read_to_string(dir.path().join(TOP_DOMAINS_CHART_FILE)).unwrap();
        assert_eq!(top, "# domain pages\na.com 2\nb.com 1\n(none) 1\n");

        let times = fs::read_to_string(dir.path().join(DOMAIN_TIME_CHART_FILE)).unwrap();
        assert_eq!(times, "# domain time_ms\na.com 90\nb.com 90\n(none) 0\n");
    }
}
