pub mod aggregate;
pub mod args;
pub mod domain;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod repair;
pub mod report;
pub mod summary;
pub mod utils;

pub use aggregate::{summarize, summarize_parallel};
pub use args::Args;
pub use error::{PipelineError, SourceError};
pub use merge::{merge_documents, merge_files, MergeOptions, MergeStatus, MergedDataset};
pub use pipeline::analyze_crawl;
pub use record::CrawlRecord;
pub use summary::{AnalysisSummary, CrawlAnalysis, DomainCount};
