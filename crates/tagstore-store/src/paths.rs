//! Path resolution: `<base>/<TypeName>/<key>.dat`.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Extension of stored record files, including the dot.
pub const RECORD_EXTENSION: &str = ".dat";
/// Suffix of in-flight temporary files.
pub const TEMP_SUFFIX: &str = "_tmp";

/// Maps record types and keys to locations under a base directory.
///
/// Every file the store touches is named here. Type names and keys are
/// checked to be single path components, so nothing resolves outside the
/// base directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePaths {
    base: PathBuf,
}

impl StorePaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding every record of `type_name`.
    pub fn type_directory(&self, type_name: &str) -> StoreResult<PathBuf> {
        check_component(type_name).map_err(|reason| StoreError::InvalidTypeName {
            name: type_name.to_string(),
            reason,
        })?;
        Ok(self.base.join(type_name))
    }

    /// File holding the record of `type_name` with `key`.
    pub fn record_path(&self, type_name: &str, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        let dir = self.type_directory(type_name)?;
        Ok(dir.join(format!("{key}{RECORD_EXTENSION}")))
    }
}

/// Check that `key` can be stored as a file name.
pub fn validate_key(key: &str) -> StoreResult<()> {
    check_component(key).map_err(|reason| StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

/// The key stored in `file_name`, or `None` if it is not a record file.
///
/// Temporary files end in [`TEMP_SUFFIX`] and never match.
pub fn key_from_file_name(file_name: &str) -> Option<&str> {
    let key = file_name.strip_suffix(RECORD_EXTENSION)?;
    (!key.is_empty()).then_some(key)
}

fn check_component(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name == "." || name == ".." {
        return Err("must not be a relative directory name");
    }
    if name.contains(['/', '\\']) {
        return Err("must not contain a path separator");
    }
    if name.contains('\0') {
        return Err("must not contain NUL");
    }
    Ok(())
}
