//! Output formatting for batch reports.

use crate::error::Result;
use crate::report::BatchReport;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats a batch report in the requested output format.
///
/// # Errors
///
/// Returns [`Json`](crate::BatchError::Json) or
/// [`Yaml`](crate::BatchError::Yaml) if serialization fails.
pub fn format_report(report: &BatchReport, format: OutputFormat) -> Result<String> {
    let raw = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::Table => report_to_table(report),
    };
    Ok(raw)
}

fn report_to_table(report: &BatchReport) -> String {
    let mut out = String::new();

    let path_width = report
        .files
        .iter()
        .map(|file| file.path.display().to_string().len())
        .chain(std::iter::once("File".len()))
        .max()
        .unwrap_or(4);

    out.push_str(&format!(
        "{:<path_width$}  {:>8}  {:>9}  {:>5}  {}\n",
        "File", "Comments", "Removed", "Depth", "Note"
    ));
    out.push_str(&format!(
        "{:-<path_width$}  {:->8}  {:->9}  {:->5}  {:-<4}\n",
        "", "", "", "", ""
    ));

    for file in &report.files {
        let note = if file.stats.unterminated {
            "unterminated"
        } else if !file.changed() {
            "unchanged"
        } else {
            ""
        };
        out.push_str(
            format!(
                "{:<path_width$}  {:>8}  {:>9}  {:>5}  {note}",
                file.path.display().to_string(),
                file.stats.comments_removed,
                file.stats.chars_removed(),
                file.stats.max_depth,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    for failure in &report.failures {
        out.push_str(&format!(
            "{:<path_width$}  failed: {}\n",
            failure.path.display().to_string(),
            failure.error
        ));
    }

    let totals = &report.totals;
    out.push('\n');
    out.push_str(&format!(
        "{} file(s), {} changed, {} failed; {} comment(s) and {} character(s) removed",
        totals.files,
        totals.changed_files,
        totals.failed_files,
        totals.comments_removed,
        totals.chars_removed
    ));
    if totals.unterminated_files > 0 {
        out.push_str(&format!("; {} unterminated", totals.unterminated_files));
    }
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sqlstrip_core::StripStats;

    use super::*;
    use crate::report::{BatchTotals, FileFailure, FileReport};

    fn sample_report() -> BatchReport {
        BatchReport {
            tool_version: "0.1.0".to_string(),
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            totals: BatchTotals {
                files: 2,
                changed_files: 1,
                failed_files: 1,
                comments_removed: 3,
                chars_removed: 42,
                unterminated_files: 1,
            },
            files: vec![
                FileReport {
                    path: PathBuf::from("db/001_init.sql"),
                    input_bytes: 100,
                    output_bytes: 58,
                    input_sha256: "aa".to_string(),
                    output_sha256: "bb".to_string(),
                    stats: StripStats {
                        chars_read: 100,
                        chars_emitted: 58,
                        comments_removed: 3,
                        max_depth: 2,
                        unterminated: true,
                        line_breaks_preserved: 0,
                    },
                },
                FileReport {
                    path: PathBuf::from("db/002.sql"),
                    input_bytes: 10,
                    output_bytes: 10,
                    input_sha256: "cc".to_string(),
                    output_sha256: "cc".to_string(),
                    stats: StripStats {
                        chars_read: 10,
                        chars_emitted: 10,
                        ..StripStats::default()
                    },
                },
            ],
            failures: vec![FileFailure {
                path: PathBuf::from("db/bad.sql"),
                error: "strip error: invalid UTF-8 at byte offset 7".to_string(),
            }],
        }
    }

    #[test]
    fn test_table_lists_files_failures_and_totals() {
        let table = format_report(&sample_report(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("File"));
        assert!(lines[2].starts_with("db/001_init.sql"));
        assert!(lines[2].ends_with("unterminated"));
        assert!(lines[3].starts_with("db/002.sql"));
        assert!(lines[3].ends_with("unchanged"));
        assert!(lines[4].contains("failed: strip error"));
        assert!(table.contains("2 file(s), 1 changed, 1 failed"));
        assert!(table.trim_end().ends_with("1 unterminated"));
    }

    #[test]
    fn test_json_roundtrips() {
        let raw = format_report(&sample_report(), OutputFormat::Json).unwrap();
        let parsed: BatchReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.totals.comments_removed, 3);
    }

    #[test]
    fn test_yaml_contains_fields() {
        let raw = format_report(&sample_report(), OutputFormat::Yaml).unwrap();
        assert!(raw.contains("tool_version:"));
        assert!(raw.contains("path: db/001_init.sql"));
        assert!(raw.contains("unterminated_files: 1"));
    }
}
