use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single input document. Recoverable: the merge skips the source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        source: serde_json::Error,
    },
}

impl SourceError {
    pub fn source_name(&self) -> String {
        match self {
            SourceError::Read { path, .. } => path.display().to_string(),
            SourceError::Parse { name, .. } => name.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("all {attempted} input sources failed to parse")]
    AllSourcesFailed { attempted: usize },
}
