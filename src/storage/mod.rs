//! File store for link lists and result dumps.
//!
//! Nothing here is required by the scanner or the analyzers; front ends use it
//! to load links and save what they found.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Error types for file store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Creating or writing a file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The data could not be serialized.
    #[error("Failed to serialize data for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads a whole UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `text` to `path`, replacing any existing file.
pub fn write_text(path: &Path, text: &str) -> Result<(), StorageError> {
    fs::write(path, text).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `data` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|source| StorageError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}

/// Parses a line-oriented link list: one link per line, blank lines and
/// `#` comments skipped, surrounding whitespace trimmed.
pub fn parse_link_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads and parses a link list file.
pub fn read_link_list(path: &Path) -> Result<Vec<String>, StorageError> {
    read_text(path).map(|text| parse_link_list(&text))
}
