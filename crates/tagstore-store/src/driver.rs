use std::sync::Arc;

use tagstore_codec::{encode, RecordCodec};
use tagstore_types::{DescriptorRegistry, Record, TypeDescriptor, TypeRegistry};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::files::{ReadOutcome, RecordFiles};
use crate::traits::RecordStore;

/// File-backed [`RecordStore`]: one file per record under
/// `<base_dir>/<TypeName>/<key>.dat`.
///
/// Holds no mutable state, so a single instance can be shared across threads.
/// Saves of the same key from different threads do not corrupt each other,
/// but the last rename wins.
pub struct FileRecordStore {
    config: StoreConfig,
    files: RecordFiles,
    registry: Arc<dyn DescriptorRegistry>,
}

impl FileRecordStore {
    pub fn new(config: StoreConfig, registry: Arc<dyn DescriptorRegistry>) -> Self {
        let files = RecordFiles::new(&config);
        debug!(base = %config.base_dir.display(), replace = ?config.replace, "record store opened");
        Self {
            config,
            files,
            registry,
        }
    }

    /// Validate every descriptor in `registry`, then open a store over it.
    ///
    /// [`FileRecordStore::new`] accepts any [`DescriptorRegistry`] as is and
    /// leaves validation to the caller.
    pub fn open(config: StoreConfig, registry: TypeRegistry) -> StoreResult<Self> {
        registry.validate()?;
        Ok(Self::new(config, Arc::new(registry)))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn files(&self) -> &RecordFiles {
        &self.files
    }

    pub fn registry(&self) -> &dyn DescriptorRegistry {
        self.registry.as_ref()
    }

    fn codec(&self) -> RecordCodec<'_> {
        RecordCodec::new(self.registry.as_ref())
    }

    fn descriptor(&self, type_name: &str) -> StoreResult<&dyn TypeDescriptor> {
        self.registry
            .descriptor(type_name)
            .ok_or_else(|| StoreError::UnknownType(type_name.to_string()))
    }

    /// Read and decode the record at `key`, distinguishing every failure so
    /// callers decide what to log.
    fn read_record(&self, type_name: &str, key: &str) -> StoreResult<Option<Record>> {
        let path = self.files.paths().record_path(type_name, key)?;
        match self.files.read(&path) {
            ReadOutcome::Found(compound) => Ok(Some(self.codec().decode(type_name, &compound)?)),
            ReadOutcome::NotFound => Ok(None),
            ReadOutcome::Corrupt(e) => {
                warn!(path = %path.display(), error = %e, "stored record is corrupt; ignoring");
                Ok(None)
            }
            ReadOutcome::Unreadable(e) => {
                warn!(path = %path.display(), error = %e, "stored record could not be read");
                Ok(None)
            }
        }
    }
}

/// String form of the record's key, taken from the descriptor's key field
/// when it names one.
fn record_key(descriptor: &dyn TypeDescriptor, record: &Record) -> StoreResult<String> {
    let key = match descriptor.unique_key_field() {
        Some(field) => record.value(field).and_then(|v| v.as_key_string()),
        None => record.key_string(),
    };
    key.ok_or_else(|| StoreError::MissingKey {
        type_name: descriptor.type_name().to_string(),
    })
}

impl RecordStore for FileRecordStore {
    fn save(&self, type_name: &str, record: &Record) -> StoreResult<bool> {
        let descriptor = self.descriptor(type_name)?;
        let key = record_key(descriptor, record)?;
        let path = self.files.paths().record_path(type_name, &key)?;

        // Everything that can reject the record happens before the first
        // file system call.
        let compound = encode(record)?;
        let bytes = match self.files.encode(&compound) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(type_name, key = %key, error = %e, "record tree cannot be serialized");
                return Ok(false);
            }
        };

        match self.files.write_bytes(&path, &bytes) {
            Ok(()) => Ok(true),
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to save record");
                Ok(false)
            }
        }
    }

    fn load(&self, type_name: &str, key: &str) -> StoreResult<Option<Record>> {
        self.descriptor(type_name)?;
        self.read_record(type_name, key)
    }

    fn load_all(&self, type_name: &str) -> StoreResult<Vec<Record>> {
        self.descriptor(type_name)?;
        let keys = match self.files.list_keys(type_name) {
            Ok(keys) => keys,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(type_name, error = %e, "failed to list stored records");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.read_record(type_name, key) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!(type_name, key = %key, "skipping record that vanished or is unreadable");
                }
                Err(StoreError::InvalidKey { key, reason }) => {
                    warn!(type_name, key = %key, reason, "skipping file with unusable name");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(type_name, count = records.len(), "loaded all records");
        Ok(records)
    }

    fn delete(&self, type_name: &str, key: &str) -> StoreResult<bool> {
        self.descriptor(type_name)?;
        let path = self.files.paths().record_path(type_name, key)?;
        match self.files.remove(&path) {
            Ok(removed) => Ok(removed),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to delete record");
                Ok(false)
            }
        }
    }

    fn exists(&self, type_name: &str, key: &str) -> StoreResult<bool> {
        self.descriptor(type_name)?;
        Ok(self.files.paths().record_path(type_name, key)?.is_file())
    }
}

impl std::fmt::Debug for FileRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRecordStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::ReplaceStrategy;
    use tagstore_codec::CodecError;
    use tagstore_types::{FieldKind, FieldValue, RecordDescriptor, TypeError, Value};
    use tempfile::TempDir;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new()
                .with(
                    RecordDescriptor::new("PlayerInfo")
                        .key("username", FieldKind::String)
                        .field("money", FieldKind::Int)
                        .field("nickname", FieldKind::String)
                        .field("home", FieldKind::Record("Location".into()))
                        .field("kit_times", FieldKind::IntArray),
                )
                .with(
                    RecordDescriptor::new("Location")
                        .field("world", FieldKind::String)
                        .field("xyz", FieldKind::DoubleArray),
                )
                .with(
                    RecordDescriptor::new("Ban")
                        .key("id", FieldKind::Int)
                        .field("reason", FieldKind::String),
                ),
        )
    }

    fn store_with(dir: &TempDir, replace: ReplaceStrategy) -> FileRecordStore {
        let config = StoreConfig {
            replace,
            ..StoreConfig::new(dir.path())
        };
        FileRecordStore::new(config, registry())
    }

    fn store(dir: &TempDir) -> FileRecordStore {
        store_with(dir, ReplaceStrategy::Atomic)
    }

    fn player(name: &str, money: i32) -> Record {
        Record::new()
            .with_key("username", FieldKind::String, name)
            .with_field("money", FieldKind::Int, money)
            .with_field("nickname", FieldKind::String, format!("{name}!"))
            .with_field(
                "home",
                FieldKind::Record("Location".into()),
                Record::new()
                    .with_field("world", FieldKind::String, "overworld")
                    .with_field("xyz", FieldKind::DoubleArray, vec![1.0, 64.0, -3.5]),
            )
            .with_field("kit_times", FieldKind::IntArray, vec![money, 0])
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.save("PlayerInfo", &player("steve", 5)).unwrap());
        assert!(dir.path().join("PlayerInfo").join("steve.dat").is_file());

        let loaded = store.load("PlayerInfo", "steve").unwrap().unwrap();
        assert_eq!(loaded, player("steve", 5));
        assert_eq!(loaded.key_string().as_deref(), Some("steve"));
    }

    #[test]
    fn save_replaces_existing_record() {
        for replace in [ReplaceStrategy::Atomic, ReplaceStrategy::DeleteThenRename] {
            let dir = TempDir::new().unwrap();
            let store = store_with(&dir, replace);
            assert!(store.save("PlayerInfo", &player("steve", 1)).unwrap());
            assert!(store.save("PlayerInfo", &player("steve", 2)).unwrap());
            let loaded = store.load("PlayerInfo", "steve").unwrap().unwrap();
            assert_eq!(loaded.value("money"), Some(&Value::Int(2)));
        }
    }

    #[test]
    fn non_string_key_uses_its_string_form() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let ban = Record::new()
            .with_key("id", FieldKind::Int, 42)
            .with_field("reason", FieldKind::String, "griefing");
        assert!(store.save("Ban", &ban).unwrap());
        assert!(dir.path().join("Ban").join("42.dat").is_file());
        assert_eq!(store.load("Ban", "42").unwrap(), Some(ban));
    }

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert_eq!(store.load("PlayerInfo", "ghost").unwrap(), None);
        assert!(!store.exists("PlayerInfo", "ghost").unwrap());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let type_dir = dir.path().join("PlayerInfo");
        fs::create_dir_all(&type_dir).unwrap();
        fs::write(type_dir.join("broken.dat"), b"TAGS\0\0\0\x01garbage").unwrap();
        assert_eq!(store.load("PlayerInfo", "broken").unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.delete("PlayerInfo", "steve").unwrap());

        store.save("PlayerInfo", &player("steve", 1)).unwrap();
        assert!(store.exists("PlayerInfo", "steve").unwrap());
        assert!(store.delete("PlayerInfo", "steve").unwrap());
        assert!(!store.delete("PlayerInfo", "steve").unwrap());
        assert_eq!(store.load("PlayerInfo", "steve").unwrap(), None);
    }

    #[test]
    fn load_all_returns_every_stored_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for (name, money) in [("a", 1), ("b", 2), ("c", 3)] {
            assert!(store.save("PlayerInfo", &player(name, money)).unwrap());
        }
        let type_dir = dir.path().join("PlayerInfo");
        fs::write(type_dir.join("notes.txt"), b"not a record").unwrap();
        fs::write(type_dir.join("a.dat.q8Zr2x_tmp"), b"half written").unwrap();

        let all = store.load_all("PlayerInfo").unwrap();
        let names: Vec<_> = all.iter().filter_map(Record::key_string).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn load_all_skips_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save("PlayerInfo", &player("good", 1)).unwrap();
        fs::write(dir.path().join("PlayerInfo").join("bad.dat"), b"\x00\x01").unwrap();

        let all = store.load_all("PlayerInfo").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].key_string().as_deref(), Some("good"));
    }

    #[test]
    fn load_all_of_empty_type_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.load_all("PlayerInfo").unwrap().is_empty());
    }

    #[test]
    fn absent_field_loads_as_default() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut rec = player("steve", 9);
        rec.insert(FieldValue::null("nickname", FieldKind::String));
        store.save("PlayerInfo", &rec).unwrap();

        let loaded = store.load("PlayerInfo", "steve").unwrap().unwrap();
        assert_eq!(loaded.value("nickname"), Some(&Value::String(String::new())));
        assert_eq!(loaded.value("money"), Some(&Value::Int(9)));
    }

    #[test]
    fn unsupported_field_fails_before_any_io() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rec = player("steve", 1).with_field(
            "uuid",
            FieldKind::Unsupported("UUID".into()),
            "0000-0000",
        );
        let err = store.save("PlayerInfo", &rec).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Codec(CodecError::UnsupportedFieldType { .. })
        ));
        assert!(err.is_configuration());
        assert!(!dir.path().join("PlayerInfo").exists());
    }

    #[test]
    fn unregistered_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let err = store.save("Warp", &player("x", 1)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownType(ref t) if t == "Warp"));
        assert!(matches!(
            store.load_all("Warp"),
            Err(StoreError::UnknownType(_))
        ));
        assert!(!dir.path().join("Warp").exists());
    }

    #[test]
    fn missing_and_invalid_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut keyless = player("steve", 1);
        keyless.insert(FieldValue::null("username", FieldKind::String));
        assert!(matches!(
            store.save("PlayerInfo", &keyless),
            Err(StoreError::MissingKey { .. })
        ));

        assert!(matches!(
            store.save("PlayerInfo", &player("../escape", 1)),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.load("PlayerInfo", ""),
            Err(StoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn open_validates_descriptors() {
        let dir = TempDir::new().unwrap();
        let registry = TypeRegistry::new().with(
            RecordDescriptor::new("Kit")
                .key("items", FieldKind::StringArray)
                .field("cooldown", FieldKind::Int),
        );
        let err = FileRecordStore::open(StoreConfig::new(dir.path()), registry).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Type(TypeError::InvalidKeyKind { ref field, .. }) if field == "items"
        ));
        assert!(err.is_configuration());

        let store = FileRecordStore::open(StoreConfig::new(dir.path()), (*self::registry()).clone());
        assert!(store.is_ok());
    }

    #[test]
    fn long_string_fields_are_stored() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let motd = "x".repeat(70_000);
        let rec = player("steve", 1).with_field("nickname", FieldKind::String, motd.clone());
        assert!(store.save("PlayerInfo", &rec).unwrap());

        let loaded = store.load("PlayerInfo", "steve").unwrap().unwrap();
        assert_eq!(loaded.value("nickname"), Some(&Value::String(motd)));
    }

    #[test]
    fn unserializable_tree_reports_false() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rec = player("steve", 1).with_field("n".repeat(70_000), FieldKind::Int, 1);
        assert!(!store.save("PlayerInfo", &rec).unwrap());
        assert!(!dir.path().join("PlayerInfo").exists());
    }

    #[test]
    fn io_failure_reports_false() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        // A plain file where the type directory should be.
        fs::write(dir.path().join("PlayerInfo"), b"in the way").unwrap();
        assert!(!store.save("PlayerInfo", &player("steve", 1)).unwrap());
    }

    #[test]
    fn concurrent_loads_see_whole_records() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let old = player("steve", 1);
        let new = player("steve", 2);
        store.save("PlayerInfo", &old).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..100 {
                    let rec = if i % 2 == 0 { &new } else { &old };
                    assert!(store.save("PlayerInfo", rec).unwrap());
                }
            });
            s.spawn(|| {
                for _ in 0..200 {
                    let loaded = store.load("PlayerInfo", "steve").unwrap().unwrap();
                    assert!(loaded == old || loaded == new);
                }
            });
        });
    }

    #[test]
    fn distinct_keys_in_parallel() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::thread::scope(|s| {
            for t in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..10 {
                        let name = format!("p{t}_{i}");
                        assert!(store.save("PlayerInfo", &player(&name, i)).unwrap());
                    }
                });
            }
        });
        assert_eq!(store.load_all("PlayerInfo").unwrap().len(), 40);
    }
}
