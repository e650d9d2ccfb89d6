//! Structured reporting for batch stripping runs.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlstrip_core::StripStats;

use crate::discover::BatchOutcome;

/// Per-file result of one stripping pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// SHA-256 of the raw input bytes, lowercase hex.
    pub input_sha256: String,
    /// SHA-256 of the cleaned text, lowercase hex.
    pub output_sha256: String,
    pub stats: StripStats,
}

impl FileReport {
    /// Whether stripping changed the file at all.
    pub fn changed(&self) -> bool {
        self.input_sha256 != self.output_sha256
    }
}

/// A file that could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate counters over all files in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub files: usize,
    pub changed_files: usize,
    pub failed_files: usize,
    pub comments_removed: u64,
    pub chars_removed: u64,
    /// Files that ended inside an open comment.
    pub unterminated_files: usize,
}

/// Report for one batch run, suitable for JSON/YAML output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub tool_version: String,
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    pub totals: BatchTotals,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Builds a report from a finished batch.
    pub fn new(tool_version: &str, outcome: &BatchOutcome) -> Self {
        let files: Vec<FileReport> = outcome
            .outcomes
            .iter()
            .map(|outcome| outcome.report.clone())
            .collect();
        let failures = outcome.failures.clone();

        Self {
            tool_version: tool_version.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            totals: summarize(&files, &failures),
            files,
            failures,
        }
    }
}

fn summarize(files: &[FileReport], failures: &[FileFailure]) -> BatchTotals {
    let mut totals = BatchTotals {
        files: files.len(),
        failed_files: failures.len(),
        ..BatchTotals::default()
    };
    for file in files {
        if file.changed() {
            totals.changed_files += 1;
        }
        if file.stats.unterminated {
            totals.unterminated_files += 1;
        }
        totals.comments_removed += file.stats.comments_removed;
        totals.chars_removed += file.stats.chars_removed();
    }
    totals
}
