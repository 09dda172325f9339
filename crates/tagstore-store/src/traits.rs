use tagstore_types::Record;

use crate::error::StoreResult;

/// Keyed persistence of typed records.
///
/// Implementations must satisfy these invariants:
/// - A record is addressed by its type name and the string form of its key
///   field. Saving a record with an existing key replaces the previous one.
/// - A reader never observes a partially written record.
/// - `Err` is returned only for configuration errors (unregistered type,
///   unusable key, field that cannot be encoded or decoded). Storage failures
///   are logged and surface as `false` or `None`.
pub trait RecordStore: Send + Sync {
    /// Persist `record` under its key. Returns `true` once the record is
    /// durably in place, `false` if storage failed.
    fn save(&self, type_name: &str, record: &Record) -> StoreResult<bool>;

    /// Load the record of `type_name` stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing usable is stored: no file, or a file that
    /// cannot be read or decoded.
    fn load(&self, type_name: &str, key: &str) -> StoreResult<Option<Record>>;

    /// Load every stored record of `type_name`. Keys whose files cannot be
    /// read are skipped.
    fn load_all(&self, type_name: &str) -> StoreResult<Vec<Record>>;

    /// Delete the record stored under `key`. Returns `true` only if a record
    /// existed and was removed.
    fn delete(&self, type_name: &str, key: &str) -> StoreResult<bool>;

    /// Check whether a record is stored under `key`.
    ///
    /// Default implementation calls `load()`. Backends may override with a
    /// cheaper check.
    fn exists(&self, type_name: &str, key: &str) -> StoreResult<bool> {
        Ok(self.load(type_name, key)?.is_some())
    }
}
