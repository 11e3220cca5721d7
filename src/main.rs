use anyhow::Result;
use clap::Parser;
use tracing::{error, warn};

use crawlstat::{analyze_crawl, report, utils, Args};

fn run(args: &Args) -> Result<()> {
    let analysis = analyze_crawl(args)?;
    report::print_analysis_results(&analysis, args);

    if let Some(path) = &args.json {
        report::write_json_report(path, &analysis)?;
    }
    if let Some(dir) = &args.chart_data {
        if analysis.summary.is_empty() {
            warn!(action = "skip", component = "chart_data", "No pages to chart");
        } else {
            report::write_chart_data(dir, &analysis.summary)?;
            println!("\nChart data saved in {:?}", dir);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    if let Err(e) = run(&args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
