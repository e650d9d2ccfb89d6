//! Batch configuration for stripping runs.
//!
//! Defines the YAML-serializable configuration that controls which files are
//! picked up from directories, how comments are stripped, and how many worker
//! threads are used.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! extensions:
//!   - sql
//!   - ddl
//! exclude:
//!   - generated.sql
//! preserve_line_breaks: true
//! jobs: 4
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlstrip_core::StripOptions;

use crate::error::Result;

/// Current configuration format version.
pub const CONFIG_VERSION: &str = "1.0";

/// Top-level batch configuration.
///
/// Loaded from a YAML file (typically `.sqlstrip.yml` next to the scripts).
/// Every field except `version` may be omitted.
///
/// # Examples
///
/// ```
/// use sqlstrip_batch::BatchConfig;
///
/// let config: BatchConfig = serde_yaml::from_str("version: \"1.0\"\njobs: 2\n").unwrap();
/// assert_eq!(config.extensions, vec!["sql"]);
/// assert_eq!(config.jobs, Some(2));
/// assert!(!config.strip_options().preserve_line_breaks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// File extensions picked up when a directory is given as input,
    /// compared case-insensitively and without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// File names to skip when expanding directories.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Keep line breaks from inside comments.
    #[serde(default)]
    pub preserve_line_breaks: bool,
    /// Number of worker threads (unset = adaptive default).
    #[serde(default)]
    pub jobs: Option<usize>,
}

fn default_extensions() -> Vec<String> {
    vec!["sql".to_string()]
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            preserve_line_breaks: false,
            jobs: None,
        }
    }
}

impl BatchConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::BatchError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::BatchError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::BatchError::Io) if the file cannot be written, or
    /// [`Yaml`](crate::BatchError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Options handed to each reader.
    pub fn strip_options(&self) -> StripOptions {
        StripOptions {
            preserve_line_breaks: self.preserve_line_breaks,
        }
    }

    /// Returns `true` if the file name is in the exclusion list.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude.iter().any(|name| name == file_name)
    }

    /// Returns `true` if a directory entry with this path should be stripped.
    ///
    /// Matches the extension against [`extensions`](Self::extensions)
    /// ignoring case, and honors exclusions.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        if self.is_excluded(file_name) {
            return false;
        }
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
