use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::record::CrawlRecord;
use crate::repair::DocumentRepair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Every source parsed (also the case when there were no sources).
    Complete,
    /// Some sources were skipped, at least one contributed.
    Partial,
    /// Every attempted source failed.
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Finalize truncated worker documents before parsing.
    pub repair: Option<DocumentRepair>,
}

/// Records from all sources that parsed, in source order, plus what was skipped.
#[derive(Debug, Default)]
pub struct MergedDataset {
    pub records: Vec<CrawlRecord>,
    pub sources_attempted: usize,
    pub failures: Vec<SourceError>,
}

impl MergedDataset {
    pub fn sources_parsed(&self) -> usize {
        self.sources_attempted - self.failures.len()
    }

    pub fn status(&self) -> MergeStatus {
        if self.failures.is_empty() {
            MergeStatus::Complete
        } else if self.failures.len() < self.sources_attempted {
            MergeStatus::Partial
        } else {
            MergeStatus::Failed
        }
    }

    fn absorb(&mut self, name: &str, outcome: Result<Vec<CrawlRecord>, SourceError>) {
        self.sources_attempted += 1;
        match outcome {
            Ok(records) => {
                debug!(
                    action = "merge",
                    component = "merge",
                    source = name,
                    record_count = records.len(),
                    "Merged source"
                );
                self.records.extend(records);
            }
            Err(e) => {
                warn!(action = "skip", component = "merge", source = name, error = %e, "Skipping source");
                self.failures.push(e);
            }
        }
    }
}

/// Parses one document: a JSON array of records.
///
/// Only invalid JSON or a top-level value that is not an array fails the
/// source. Elements are kept as read whatever their shape; nothing is
/// defaulted here.
pub fn parse_document(
    name: &str,
    content: &str,
    options: &MergeOptions,
) -> Result<Vec<CrawlRecord>, SourceError> {
    let content = match &options.repair {
        Some(repair) => repair.finalize(content),
        None => content.into(),
    };
    serde_json::from_str(&content).map_err(|source| SourceError::Parse {
        name: name.to_string(),
        source,
    })
}

/// Merges in-memory documents given as `(name, content)` pairs.
pub fn merge_documents<'a, I>(documents: I, options: &MergeOptions) -> MergedDataset
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut merged = MergedDataset::default();
    for (name, content) in documents {
        merged.absorb(name, parse_document(name, content, options));
    }
    merged
}

/// Reads and merges the given files. An unreadable file is skipped like a
/// malformed one.
pub fn merge_files(paths: &[PathBuf], options: &MergeOptions) -> MergedDataset {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "merge",
        source_count = paths.len(),
        "Merging crawl documents"
    );

    let mut merged = MergedDataset::default();
    for path in paths {
        let name = path.display().to_string();
        let outcome = fs::read_to_string(path)
            .map_err(|source| SourceError::Read {
                path: path.clone(),
                source,
            })
            .and_then(|content| parse_document(&name, &content, options));
        merged.absorb(&name, outcome);
    }

    info!(
        action = "complete",
        component = "merge",
        record_count = merged.records.len(),
        sources_parsed = merged.sources_parsed(),
        sources_failed = merged.failures.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Merge completed"
    );
    merged
}

/// Expands directories into their `*.json` files, ordered by file name.
/// Plain paths are kept as given, so a missing file still surfaces as a
/// per-source read failure during the merge.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }

        let mut entries = Vec::new();
        for entry in
            fs::read_dir(path).with_context(|| format!("Failed to read directory {:?}", path))?
        {
            let entry_path = entry?.path();
            let is_json = entry_path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && entry_path.is_file() {
                entries.push(entry_path);
            }
        }
        entries.sort();

        info!(action = "expand", component = "sources", directory = ?path, file_count = entries.len(), "Collected documents from directory");
        sources.extend(entries);
    }
    Ok(sources)
}

/// Persists the merged dataset as a pretty-printed JSON array.
pub fn write_dataset(path: &Path, records: &[CrawlRecord]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create merged dataset {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to write merged dataset {:?}", path))?;
    writer.flush()?;

    info!(action = "write", component = "merged_dataset", file_path = ?path, record_count = records.len(), "Merged dataset written");
    Ok(())
}

/// Reads a previously persisted merged dataset.
pub fn load_dataset(path: &Path) -> Result<Vec<CrawlRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read merged dataset {:?}", path))?;
    let records: Vec<CrawlRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse merged dataset {:?}", path))?;
    info!(action = "load", component = "merged_dataset", file_path = ?path, record_count = records.len(), "Merged dataset loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(documents: &[(&str, &str)]) -> MergedDataset {
        merge_documents(documents.iter().copied(), &MergeOptions::default())
    }

    #[test]
    fn malformed_source_is_skipped() {
        let merged = merge(&[
            ("a.json", r#"[{"url":"http://a.com","depth":0}]"#),
            ("b.json", "not json"),
        ]);
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.records[0].url(), "http://a.com");
        assert_eq!(merged.status(), MergeStatus::Partial);
        assert_eq!(merged.failures.len(), 1);
        assert_eq!(merged.failures[0].source_name(), "b.json");
    }

    #[test]
    fn preserves_source_then_array_order() {
        let merged = merge(&[
            ("1", r#"[{"depth":1},{"depth":2}]"#),
            ("2", r#"[{"depth":3}]"#),
            ("3", r#"[{"depth":4},{"depth":5}]"#),
        ]);
        let depths: Vec<_> = merged.records.iter().map(|r| r.depth()).collect();
        assert_eq!(depths, vec![1, 2, 3, 4, 5]);
        assert_eq!(merged.status(), MergeStatus::Complete);
    }

    #[test]
    fn empty_array_is_not_a_failure() {
        let merged = merge(&[("empty", "[]"), ("one", r#"[{}]"#)]);
        assert_eq!(merged.records.len(), 1);
        assert!(merged.failures.is_empty());
        assert_eq!(merged.sources_parsed(), 2);
    }

    #[test]
    fn mistyped_fields_keep_the_source() {
        let merged = merge(&[(
            "w0",
            r#"[{"url":"http://a.com","timeTakenMs":100},{"url":"http://b.com","timeTakenMs":12.5},{"depth":"2"},{"depth":-1}]"#,
        )]);
        assert_eq!(merged.status(), MergeStatus::Complete);
        assert_eq!(merged.records.len(), 4);
        assert_eq!(merged.records[0].time_taken_ms(), 100);
        assert_eq!(merged.records[1].as_value()["timeTakenMs"], 12.5);
        assert_eq!(merged.records[2].as_value()["depth"], "2");
        assert_eq!(merged.records[3].depth(), 0);
    }

    #[test]
    fn non_object_elements_are_kept_as_records() {
        let merged = merge(&[("w0", r#"[{"url":"http://a.com"}, "stray", 3, null]"#)]);
        assert_eq!(merged.status(), MergeStatus::Complete);
        assert_eq!(merged.records.len(), 4);
        assert_eq!(merged.records[1].as_value(), "stray");
        assert_eq!(merged.records[1].domain(), "");
    }

    #[test]
    fn non_array_document_fails() {
        let merged = merge(&[("object", r#"{"url":"http://a.com"}"#)]);
        assert!(merged.records.is_empty());
        assert_eq!(merged.status(), MergeStatus::Failed);
    }

    #[test]
    fn all_sources_failing_is_distinct_from_no_records() {
        let failed = merge(&[("a", "{"), ("b", "")]);
        assert_eq!(failed.status(), MergeStatus::Failed);
        assert!(failed.records.is_empty());

        let empty = merge(&[("a", "[]")]);
        assert_eq!(empty.status(), MergeStatus::Complete);
        assert!(empty.records.is_empty());

        assert_eq!(merge(&[]).status(), MergeStatus::Complete);
    }

    #[test]
    fn repair_recovers_truncated_document() {
        let truncated = "[\n{\"url\":\"http://a.com\",\"depth\":1},\n{\"url\":\"http://b.com\"},\n";
        assert_eq!(merge(&[("t", truncated)]).status(), MergeStatus::Failed);

        let options = MergeOptions {
            repair: Some(DocumentRepair::new().unwrap()),
        };
        let merged = merge_documents([("t", truncated)], &options);
        assert_eq!(merged.records.len(), 2);
        assert_eq!(merged.status(), MergeStatus::Complete);
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let merged = merge_files(
            &[PathBuf::from("/nonexistent/crawl_data_1.json")],
            &MergeOptions::default(),
        );
        assert!(matches!(merged.failures[0], SourceError::Read { .. }));
        assert_eq!(merged.status(), MergeStatus::Failed);
    }
}
