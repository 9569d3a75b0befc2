//! Bounded whole-file reads shared by every loader.
//!
//! Each read opens, drains and drops its file handle inside one call, so the
//! handle is released on every exit path.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures caused by the environment rather than by the input's content.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} is too large ({size} bytes, limit is {limit})", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("failed to parse tileset metadata from {}: {reason}", path.display())]
    BadTileset { path: PathBuf, reason: String },
}

/// Read all of `path`, refusing anything larger than `limit` bytes.
pub fn read_bounded(path: &Path, limit: u64) -> Result<Vec<u8>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let too_large = |size| LoadError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit,
    };

    let file = File::open(path).map_err(io_err)?;
    let size = file.metadata().map_err(io_err)?.len();
    if size > limit {
        return Err(too_large(size));
    }

    // the file may grow between stat and read, so cap the read as well
    let mut raw = Vec::with_capacity(size as usize);
    let mut reader = file.take(limit.saturating_add(1));
    reader.read_to_end(&mut raw).map_err(io_err)?;
    if raw.len() as u64 > limit {
        return Err(too_large(raw.len() as u64));
    }

    log::debug!("read {} bytes from {}", raw.len(), path.display());
    Ok(raw)
}

/// Like [`read_bounded`], but the contents must be UTF-8 text.
pub fn read_text(path: &Path, limit: u64) -> Result<String, LoadError> {
    let raw = read_bounded(path, limit)?;
    String::from_utf8(raw).map_err(|_| LoadError::NotUtf8 {
        path: path.to_path_buf(),
    })
}
