//! Script discovery and file workflows for batch stripping.

use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use sqlstrip_core::{CommentStrippingReader, StripOptions};
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::report::{FileFailure, FileReport};

/// Cleaned text of one file plus its report.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub report: FileReport,
    /// Text to write, including the source's byte-order mark if it had one.
    pub cleaned: String,
}

/// Result of stripping a set of files.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully stripped files, sorted by path.
    pub outcomes: Vec<FileOutcome>,
    /// Files that could not be read or decoded, sorted by path.
    pub failures: Vec<FileFailure>,
}

/// Where cleaned scripts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write each script into this directory under its original file name.
    Directory(PathBuf),
    /// Overwrite each source file.
    InPlace,
}

/// Resolves input paths to the sorted, deduplicated list of scripts to strip.
///
/// Directories are expanded (non-recursively) to the files accepted by
/// [`BatchConfig::matches`]. Files named explicitly are always accepted.
pub fn collect_script_paths(inputs: &[PathBuf], config: &BatchConfig) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(BatchError::InvalidInput(
            "No script paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && config.matches(&path) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            paths.insert(input.clone());
            continue;
        }

        return Err(BatchError::InvalidInput(format!(
            "Script path '{}' does not exist",
            input.display(),
        )));
    }

    if paths.is_empty() {
        return Err(BatchError::InvalidInput(format!(
            "No scripts matching extension(s) {} were found",
            config.extensions.join(", ")
        )));
    }

    Ok(paths.into_iter().collect())
}

/// Byte source that hashes everything read through it.
struct DigestReader<R> {
    inner: R,
    hasher: Sha256,
    bytes: u64,
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }
}

/// Strips block comments from one file.
///
/// The file is streamed through the reader and closed before returning.
/// A leading byte-order mark is kept in the output, so a script without
/// comments comes back byte-for-byte identical.
pub fn strip_file(path: &Path, options: StripOptions) -> Result<FileOutcome> {
    let file = File::open(path)?;
    let source = BufReader::new(DigestReader {
        inner: file,
        hasher: Sha256::new(),
        bytes: 0,
    });

    let mut reader = CommentStrippingReader::new(source).with_options(options);
    let mut cleaned = reader.read_to_string()?;
    let stats = *reader.stats();
    let chars = reader.into_inner();
    // The decoder drops a leading BOM; put it back so it survives the rewrite.
    if chars.had_bom() {
        cleaned.insert(0, '\u{FEFF}');
    }
    let digest = chars.into_inner().into_inner();

    if stats.unterminated {
        warn!(path = %path.display(), "script ends inside an unterminated block comment");
    }
    debug!(
        path = %path.display(),
        comments = stats.comments_removed,
        removed = stats.chars_removed(),
        "stripped script"
    );

    let report = FileReport {
        path: path.to_path_buf(),
        input_bytes: digest.bytes,
        output_bytes: cleaned.len() as u64,
        input_sha256: format!("{:x}", digest.hasher.finalize()),
        output_sha256: format!("{:x}", Sha256::digest(cleaned.as_bytes())),
        stats,
    };
    Ok(FileOutcome { report, cleaned })
}

/// Strips every file on a worker pool.
///
/// One reader per file; readers share nothing. Per-file failures are
/// collected rather than aborting the batch.
pub fn strip_files(
    paths: &[PathBuf],
    options: StripOptions,
    jobs: Option<usize>,
) -> Result<BatchOutcome> {
    let jobs = jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(paths.len()));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|err| BatchError::ThreadPool(err.to_string()))?;

    info!(files = paths.len(), jobs, "stripping scripts");

    let results: Vec<(PathBuf, Result<FileOutcome>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), strip_file(path, options)))
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for (path, result) in results {
        match result {
            Ok(file) => outcome.outcomes.push(file),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to strip script");
                outcome.failures.push(FileFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    // Sort by path for deterministic output.
    outcome
        .outcomes
        .sort_by(|a, b| a.report.path.cmp(&b.report.path));
    outcome.failures.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outcome)
}

/// Writes cleaned scripts to their destination and returns how many were
/// written.
///
/// For [`Destination::Directory`], two inputs with the same file name are
/// rejected before anything is written.
pub fn write_outcomes(outcomes: &[FileOutcome], destination: &Destination) -> Result<usize> {
    match destination {
        Destination::InPlace => {
            for outcome in outcomes {
                fs::write(&outcome.report.path, &outcome.cleaned)?;
            }
        }
        Destination::Directory(dir) => {
            let mut targets: HashMap<PathBuf, &Path> = HashMap::new();
            for outcome in outcomes {
                let source = outcome.report.path.as_path();
                let Some(name) = source.file_name() else {
                    return Err(BatchError::InvalidInput(format!(
                        "Script path '{}' has no file name",
                        source.display()
                    )));
                };
                let target = dir.join(name);
                if let Some(previous) = targets.insert(target.clone(), source) {
                    return Err(BatchError::InvalidInput(format!(
                        "'{}' and '{}' would both be written to '{}'",
                        previous.display(),
                        source.display(),
                        target.display()
                    )));
                }
            }

            fs::create_dir_all(dir)?;
            for outcome in outcomes {
                if let Some(name) = outcome.report.path.file_name() {
                    fs::write(dir.join(name), &outcome.cleaned)?;
                }
            }
        }
    }
    Ok(outcomes.len())
}

// Stripping is I/O bound per file; past a dozen threads only the disk queue grows.
fn default_parallel_jobs(file_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(12).max(1).min(file_count.max(1))
}
