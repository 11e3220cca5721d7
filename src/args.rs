use clap::Parser;
use std::path::PathBuf;

use crate::summary::TOP_DOMAINS_LIMIT;

#[derive(Parser, Debug)]
#[command(
    name = "crawlstat",
    about = "Merge crawler worker output and summarize crawl coverage, depth and timing",
    version,
    long_about = None
)]
pub struct Args {
    /// Crawl result documents, or directories of *.json documents
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Write the merged dataset to this path
    #[arg(short = 'o', long)]
    pub merged_output: Option<PathBuf>,

    /// Write the summary report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Directory for gnuplot-ready chart data tables
    #[arg(long)]
    pub chart_data: Option<PathBuf>,

    /// Number of top domains to display (at most 10)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u8).range(1..=TOP_DOMAINS_LIMIT as i64)
    )]
    pub top: Option<u8>,

    /// Also print total fetch time per domain
    #[arg(long)]
    pub domain_times: bool,

    /// Close truncated worker documents before parsing
    #[arg(long)]
    pub repair: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads for aggregation
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Redact domain names for privacy
    #[arg(long)]
    pub redact: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(["crawlstat", "data.json"].iter().chain(extra).copied())
    }

    #[test]
    fn top_is_bounded_by_summary_size() {
        assert!(parse(&["--top", "0"]).is_err());
        assert!(parse(&["--top", "11"]).is_err());
        assert_eq!(parse(&["--top", "10"]).unwrap().top, Some(10));
        assert_eq!(parse(&["-t", "5"]).unwrap().top, Some(5));
    }

    #[test]
    fn workers_must_be_positive() {
        assert!(parse(&["--workers", "0"]).is_err());
        assert_eq!(parse(&["-w", "4"]).unwrap().workers, Some(4));
    }

    #[test]
    fn requires_an_input() {
        assert!(Args::try_parse_from(["crawlstat"]).is_err());
    }
}
