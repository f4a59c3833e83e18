//! Filesystem probes.
//!
//! Folder probes look at entry *creation* time while the file probe looks at
//! *modification* time. The asymmetry is deliberate: a folder is fresh when
//! something new lands in it, a file is fresh when it is rewritten.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use super::ProbeError;
use crate::models::{Absence, ProbeOutcome};

/// Minutes since the most recently created entry of the folder at `path`.
///
/// Returns `NoData(EmptyFolder)` for a folder without entries.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed (for instance because it
/// does not exist) or an entry's metadata cannot be read.
pub fn probe_folder(path: &str) -> Result<ProbeOutcome, ProbeError> {
    let latest = newest_created(Path::new(path), |_| true)?;
    Ok(ProbeOutcome::from_latest(latest, Absence::EmptyFolder))
}

/// Minutes since the most recently created entry of the folder at `path`
/// whose file name matches `pattern` at its start.
///
/// The match is anchored at the beginning of the file name only: pattern
/// `abc` accepts `abc.log` and `abcdef` but not `xabc.log`. Full paths are
/// never matched against.
///
/// Returns `NoData(NoMatch)` if nothing matches and `NoData(InvalidPattern)`
/// if the pattern does not compile.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed or an entry's metadata
/// cannot be read.
pub fn probe_regex_folder(path: &str, pattern: &str) -> Result<ProbeOutcome, ProbeError> {
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(folder = path, pattern, error = %err, "Pattern does not compile");
            return Ok(ProbeOutcome::no_data(Absence::InvalidPattern));
        }
    };

    let latest = newest_created(Path::new(path), |name| matches_at_start(&regex, name))?;
    Ok(ProbeOutcome::from_latest(latest, Absence::NoMatch))
}

/// Minutes since the file at `path` was last modified.
///
/// Returns `NoData(MissingFile)` if the path does not exist, cannot be
/// inspected, or is not a regular file.
///
/// # Errors
///
/// Returns an error if the platform cannot report a modification time.
pub fn probe_file(path: &str) -> Result<ProbeOutcome, ProbeError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Ok(ProbeOutcome::no_data(Absence::MissingFile)),
    };

    let modified = metadata.modified().map_err(|source| ProbeError::Metadata {
        path: path.to_string(),
        source,
    })?;

    Ok(ProbeOutcome::since(DateTime::<Utc>::from(modified), Utc::now()))
}

/// Whether `regex` matches a prefix of `name`.
///
/// The leftmost match starts at 0 whenever any match starting at 0 exists.
fn matches_at_start(regex: &Regex, name: &str) -> bool {
    regex.find(name).is_some_and(|m| m.start() == 0)
}

fn newest_created(
    dir: &Path,
    mut accept: impl FnMut(&str) -> bool,
) -> Result<Option<DateTime<Utc>>, ProbeError> {
    let list_error = |source| ProbeError::ListFolder {
        path: dir.display().to_string(),
        source,
    };

    let mut latest = None;
    for entry in fs::read_dir(dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        if !accept(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let entry_path = entry.path();
        let created = fs::metadata(&entry_path)
            .and_then(|metadata| creation_time(&metadata))
            .map_err(|source| ProbeError::Metadata {
                path: entry_path.display().to_string(),
                source,
            })?;
        latest = latest.max(Some(created));
    }

    Ok(latest)
}

/// Creation time as reported by the platform.
///
/// Filesystems without a birth time fall back to the inode change time on
/// unix and to the modification time elsewhere.
fn creation_time(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    match metadata.created() {
        Ok(created) => Ok(created.into()),
        Err(err) if err.kind() == io::ErrorKind::Unsupported => status_change_time(metadata),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn status_change_time(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(metadata.ctime(), nanos)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "ctime out of range"))
}

#[cfg(not(unix))]
fn status_change_time(metadata: &Metadata) -> io::Result<DateTime<Utc>> {
    metadata.modified().map(Into::into)
}
