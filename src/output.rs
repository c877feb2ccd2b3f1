use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::app::{ProgressEvent, ProgressSink};
use crate::error::FetchError;
use crate::metadata::MetadataRecord;

pub const DEFAULT_OUTPUT: &str = "public/pdb-summary.json";

pub struct JsonOutput;

impl JsonOutput {
    /// Creates the directory that will hold `path`. Run before any fetching so an
    /// unusable destination stops the run early.
    pub fn prepare(path: &Utf8Path) -> Result<(), FetchError> {
        let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
            return Ok(());
        };
        fs::create_dir_all(parent)
            .map_err(|err| FetchError::Filesystem(format!("create {parent}: {err}")))
    }

    /// Writes `records` as an indented JSON array, replacing any existing file.
    pub fn write_records(records: &[MetadataRecord], path: &Utf8Path) -> Result<(), FetchError> {
        Self::write_json(records, path)
    }

    fn write_json<T: Serialize + ?Sized>(value: &T, path: &Utf8Path) -> Result<(), FetchError> {
        Self::prepare(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|err| FetchError::Filesystem(format!("temp file in {dir}: {err}")))?;
        tmp.write_all(json.as_bytes())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        tmp.write_all(b"\n")
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        set_published_permissions(&tmp, path)?;
        tmp.persist(path)
            .map_err(|err| FetchError::Filesystem(format!("write {path}: {}", err.error)))?;
        Ok(())
    }

    pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

/// Temp files start out as 0600. The replacement keeps the mode of the file it
/// replaces, or gets 0644 when there is none.
#[cfg(unix)]
fn set_published_permissions(tmp: &NamedTempFile, path: &Utf8Path) -> Result<(), FetchError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => fs::Permissions::from_mode(0o644),
    };
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|err| FetchError::Filesystem(format!("chmod {path}: {err}")))
}

#[cfg(not(unix))]
fn set_published_permissions(_tmp: &NamedTempFile, _path: &Utf8Path) -> Result<(), FetchError> {
    Ok(())
}

/// Prints progress lines to stdout.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn event(&self, event: ProgressEvent) {
        println!("{}", event.message);
    }
}

/// Discards progress, for `--json` runs where stdout carries the result.
pub struct QuietProgress;

impl ProgressSink for QuietProgress {
    fn event(&self, _event: ProgressEvent) {}
}
