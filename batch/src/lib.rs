//! Batch block-comment stripping over SQL script files.
//!
//! This crate drives [`sqlstrip_core::CommentStrippingReader`] over many
//! files at once:
//!
//! - [`collect_script_paths`] — expand files and directories into the list of
//!   scripts to process, filtered by [`BatchConfig`].
//! - [`strip_files`] — strip every script on a rayon worker pool, one reader
//!   per file, collecting per-file failures instead of aborting.
//! - [`write_outcomes`] — write cleaned scripts to a directory or back over
//!   the sources.
//! - [`BatchReport`] / [`format_report`] — checksums and counters per file,
//!   rendered as JSON, YAML, or a plain-text table.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use sqlstrip_batch::{
//!     BatchConfig, BatchReport, Destination, OutputFormat, collect_script_paths, format_report,
//!     strip_files, write_outcomes,
//! };
//!
//! let config = BatchConfig::default();
//! let paths = collect_script_paths(&[PathBuf::from("migrations")], &config).unwrap();
//! let outcome = strip_files(&paths, config.strip_options(), config.jobs).unwrap();
//! write_outcomes(&outcome.outcomes, &Destination::Directory("clean".into())).unwrap();
//!
//! let report = BatchReport::new(env!("CARGO_PKG_VERSION"), &outcome);
//! println!("{}", format_report(&report, OutputFormat::Table).unwrap());
//! ```

pub mod config;
pub mod discover;
pub mod error;
pub mod output;
pub mod report;

pub use config::{BatchConfig, CONFIG_VERSION};
pub use discover::{
    BatchOutcome, Destination, FileOutcome, collect_script_paths, strip_file, strip_files,
    write_outcomes,
};
pub use error::{BatchError, Result};
pub use output::{OutputFormat, format_report};
pub use report::{BatchReport, BatchTotals, FileFailure, FileReport};
