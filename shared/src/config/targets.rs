//! Targets configuration.
//!
//! The targets file is YAML with four optional top-level sections:
//!
//! ```yaml
//! folders:
//!   - /data/incoming
//! regex_folders:
//!   - path: /data/exports
//!     pattern: "daily_.*\\.csv"
//! files:
//!   - /var/lib/pipeline/state.json
//! s3_buckets:
//!   - name: landing-zone
//!     aws_access_key_id: AKIA...
//!     aws_secret_access_key: ...
//! ```
//!
//! A missing or `null` section means "no targets of that kind".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{BucketTarget, FileTarget, FolderTarget, RegexFolderTarget, Target};

/// Errors that can occur while loading the targets configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Parsed targets configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Plain folders, tracked by newest entry creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<FolderTarget>>,
    /// Folders filtered by file name pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_folders: Option<Vec<RegexFolderTarget>>,
    /// Single files, tracked by modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileTarget>>,
    /// S3 buckets, tracked by newest object last-modified time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_buckets: Option<Vec<BucketTarget>>,
}

impl TargetsConfig {
    /// Loads the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            targets = config.target_count(),
            "Loaded targets configuration"
        );

        Ok(config)
    }

    /// Parses the configuration from a YAML string.
    ///
    /// An empty document yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not match the expected schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::TargetsConfig;
    ///
    /// let config = TargetsConfig::from_yaml_str("files:\n  - /tmp/state.json\n").unwrap();
    /// assert_eq!(config.target_count(), 1);
    /// assert!(config.folders.is_none());
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: Option<Self> = serde_yaml::from_str(content)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Returns every configured target, section by section (folders, regex
    /// folders, files, buckets) and in configuration order within a section.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        let folders = self.folders.iter().flatten().cloned().map(Target::Folder);
        let regex_folders = self
            .regex_folders
            .iter()
            .flatten()
            .cloned()
            .map(Target::RegexFolder);
        let files = self.files.iter().flatten().cloned().map(Target::File);
        let buckets = self.s3_buckets.iter().flatten().cloned().map(Target::Bucket);

        folders
            .chain(regex_folders)
            .chain(files)
            .chain(buckets)
            .collect()
    }

    /// Returns the total number of configured targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.folders.as_ref().map_or(0, Vec::len)
            + self.regex_folders.as_ref().map_or(0, Vec::len)
            + self.files.as_ref().map_or(0, Vec::len)
            + self.s3_buckets.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if no targets are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target_count() == 0
    }
}
