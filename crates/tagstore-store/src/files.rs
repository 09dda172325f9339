//! Per-key record files with crash-safe replacement.
//!
//! A write never touches the final path until a complete, flushed copy of the
//! new document exists next to it:
//!
//! ```text
//! <type dir>/<key>.dat.<random>_tmp   written, flushed, fsynced
//! <type dir>/<key>.dat                replaced by rename
//! ```
//!
//! A crash at any point leaves either the previous file or the new one at the
//! final path, plus at most one stray temporary file that enumeration ignores.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

use tagstore_tree::{Compound, TreeError};
use tracing::{debug, trace};

use crate::config::{ReplaceStrategy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::paths::{key_from_file_name, StorePaths, TEMP_SUFFIX};

/// Result of reading one record file.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The file exists and holds a well-formed tree.
    Found(Compound),
    /// No file at the path.
    NotFound,
    /// The file exists but its contents do not decode.
    Corrupt(TreeError),
    /// The file exists but could not be read.
    Unreadable(io::Error),
}

impl ReadOutcome {
    pub fn into_found(self) -> Option<Compound> {
        match self {
            Self::Found(compound) => Some(compound),
            _ => None,
        }
    }
}

/// File-level access for a record store.
#[derive(Clone, Debug)]
pub struct RecordFiles {
    paths: StorePaths,
    replace: ReplaceStrategy,
    sync_writes: bool,
    compression_level: i32,
}

impl RecordFiles {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            paths: StorePaths::new(config.base_dir.clone()),
            replace: config.replace,
            sync_writes: config.sync_writes,
            compression_level: config.compression_level,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Serialize a tree into file bytes. Performs no I/O.
    pub fn encode(&self, compound: &Compound) -> StoreResult<Vec<u8>> {
        Ok(tagstore_tree::to_bytes(compound, self.compression_level)?)
    }

    /// Encode `compound` and store it at `path`.
    pub fn write(&self, path: &Path, compound: &Compound) -> StoreResult<()> {
        let bytes = self.encode(compound)?;
        self.write_bytes(path, &bytes)
    }

    /// Store already-encoded file bytes at `path`.
    ///
    /// The temporary file is removed on every failure path. With
    /// [`ReplaceStrategy::DeleteThenRename`], a previous file that survives
    /// deletion aborts the write and stays in place.
    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let (dir, file_name) = split_path(path)?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{file_name}."))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        if self.sync_writes {
            tmp.as_file().sync_all()?;
        }
        trace!(tmp = %tmp.path().display(), len = bytes.len(), "temporary file written");

        if self.replace == ReplaceStrategy::DeleteThenRename {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "could not remove previous file");
                }
            }
            if path.exists() {
                return Err(StoreError::ReplaceFailed(path.to_path_buf()));
            }
        }

        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        if self.sync_writes {
            sync_dir(dir);
        }

        debug!(path = %path.display(), len = bytes.len(), "record file written");
        Ok(())
    }

    /// Read and decode the file at `path`.
    pub fn read(&self, path: &Path) -> ReadOutcome {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return ReadOutcome::NotFound,
            Err(e) => return ReadOutcome::Unreadable(e),
        };
        let mut reader = BufReader::new(file);
        match tagstore_tree::read_from(&mut reader) {
            Ok(compound) => {
                trace!(path = %path.display(), "record file read");
                ReadOutcome::Found(compound)
            }
            Err(TreeError::Io(e)) => ReadOutcome::Unreadable(e),
            Err(e) => ReadOutcome::Corrupt(e),
        }
    }

    /// Keys stored for `type_name`, sorted. A missing type directory has no
    /// keys.
    pub fn list_keys(&self, type_name: &str) -> StoreResult<Vec<String>> {
        let dir = self.paths.type_directory(type_name)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = key_from_file_name(name) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        debug!(dir = %dir.display(), count = keys.len(), "listed record keys");
        Ok(keys)
    }

    /// Remove the file at `path`. Returns `true` if a file was removed.
    pub fn remove(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "record file removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn split_path(path: &Path) -> StoreResult<(&Path, &str)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::InvalidKey {
            key: path.display().to_string(),
            reason: "path has no file name",
        })?;
    Ok((dir, file_name))
}

/// Best-effort fsync of a directory so a rename survives power loss.
fn sync_dir(dir: &Path) {
    if let Ok(d) = File::open(dir) {
        let _ = d.sync_all();
    }
}
