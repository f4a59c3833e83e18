//! Target data model.
//!
//! A target is one thing whose freshness is watched. Targets are plain
//! configuration values: they carry no identity beyond their fields and are
//! rebuilt from the configuration on every scrape cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a target, which fixes its gauge family and label names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A plain directory.
    Folder,
    /// A directory filtered by a file name pattern.
    RegexFolder,
    /// A single file.
    File,
    /// An S3 bucket.
    Bucket,
}

impl TargetKind {
    /// All kinds, in the order their configuration sections are scraped.
    pub const ALL: [TargetKind; 4] = [Self::Folder, Self::RegexFolder, Self::File, Self::Bucket];

    /// Name of the gauge family this kind is published under.
    #[must_use]
    pub fn metric_name(self) -> &'static str {
        match self {
            Self::Folder => "folder_last_file_creation_time_minutes",
            Self::RegexFolder => "folder_last_matched_file_creation_time_minutes",
            Self::File => "file_last_modified_time_minutes",
            Self::Bucket => "s3_last_file_creation_time_minutes",
        }
    }

    /// Help text of the gauge family.
    #[must_use]
    pub fn metric_help(self) -> &'static str {
        match self {
            Self::Folder => "Time since last file was created in folder",
            Self::RegexFolder => "Time since last matched file was created in folder",
            Self::File => "Time since file was last modified",
            Self::Bucket => "Time since last file was created in S3 bucket",
        }
    }

    /// Ordered label names of the gauge family.
    #[must_use]
    pub fn label_names(self) -> &'static [&'static str] {
        match self {
            Self::Folder => &["folder_path"],
            Self::RegexFolder => &["folder_path", "pattern"],
            Self::File => &["file_path"],
            Self::Bucket => &["bucket_name"],
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::RegexFolder => write!(f, "regex_folder"),
            Self::File => write!(f, "file"),
            Self::Bucket => write!(f, "bucket"),
        }
    }
}

/// A directory whose newest entry is tracked by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderTarget {
    /// Directory path, exactly as configured.
    pub path: String,
}

/// A directory whose newest matching entry is tracked by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexFolderTarget {
    /// Directory path, exactly as configured.
    pub path: String,
    /// Pattern matched against the start of each file name.
    pub pattern: String,
}

/// A single file tracked by modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTarget {
    /// File path, exactly as configured.
    pub path: String,
}

/// An S3 bucket whose newest object is tracked by last-modified time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTarget {
    /// Bucket name.
    pub name: String,
    /// Access key id used to list the bucket.
    pub aws_access_key_id: String,
    /// Secret access key used to list the bucket.
    pub aws_secret_access_key: String,
    /// Region override. Falls back to the ambient AWS configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Endpoint override for S3-compatible stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl BucketTarget {
    /// Creates a bucket target with a static credential pair.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        aws_access_key_id: impl Into<String>,
        aws_secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            aws_access_key_id: aws_access_key_id.into(),
            aws_secret_access_key: aws_secret_access_key.into(),
            region: None,
            endpoint_url: None,
        }
    }

    /// Returns true if either half of the credential pair is blank.
    #[must_use]
    pub fn has_blank_credentials(&self) -> bool {
        self.aws_access_key_id.trim().is_empty() || self.aws_secret_access_key.trim().is_empty()
    }
}

impl fmt::Debug for BucketTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketTarget")
            .field("name", &self.name)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Any target, as handed from the configuration to the probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// See [`FolderTarget`].
    Folder(FolderTarget),
    /// See [`RegexFolderTarget`].
    RegexFolder(RegexFolderTarget),
    /// See [`FileTarget`].
    File(FileTarget),
    /// See [`BucketTarget`].
    Bucket(BucketTarget),
}

impl Target {
    /// Returns the kind of this target.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Folder(_) => TargetKind::Folder,
            Self::RegexFolder(_) => TargetKind::RegexFolder,
            Self::File(_) => TargetKind::File,
            Self::Bucket(_) => TargetKind::Bucket,
        }
    }

    /// Returns the label values of this target, in the order of
    /// [`TargetKind::label_names`].
    #[must_use]
    pub fn label_values(&self) -> Vec<&str> {
        match self {
            Self::Folder(t) => vec![t.path.as_str()],
            Self::RegexFolder(t) => vec![t.path.as_str(), t.pattern.as_str()],
            Self::File(t) => vec![t.path.as_str()],
            Self::Bucket(t) => vec![t.name.as_str()],
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(t) => write!(f, "folder {}", t.path),
            Self::RegexFolder(t) => write!(f, "folder {} matching {}", t.path, t.pattern),
            Self::File(t) => write!(f, "file {}", t.path),
            Self::Bucket(t) => write!(f, "bucket {}", t.name),
        }
    }
}
