//! File-backed storage for tagstore records.
//!
//! Each record lives in its own file, `<base_dir>/<TypeName>/<key>.dat`,
//! holding the record's tag tree. Writes go to a temporary sibling first and
//! replace the final file by rename, so readers only ever see a complete
//! record.
//!
//! # Example
//!
//! ```no_run
//! use tagstore_store::{FileRecordStore, RecordStore, StoreConfig};
//! use tagstore_types::{FieldKind, Record, RecordDescriptor, TypeRegistry};
//!
//! let registry = TypeRegistry::new().with(
//!     RecordDescriptor::new("Warp")
//!         .key("name", FieldKind::String)
//!         .field("xyz", FieldKind::DoubleArray),
//! );
//! let store = FileRecordStore::open(StoreConfig::new("data"), registry)?;
//!
//! let warp = Record::new()
//!     .with_key("name", FieldKind::String, "spawn")
//!     .with_field("xyz", FieldKind::DoubleArray, vec![0.5, 64.0, 0.5]);
//! assert!(store.save("Warp", &warp)?);
//! assert_eq!(store.load("Warp", "spawn")?, Some(warp));
//! # Ok::<(), tagstore_store::StoreError>(())
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod files;
pub mod paths;
pub mod traits;

pub use config::{DataDirSettings, ReplaceStrategy, StoreConfig};
pub use driver::FileRecordStore;
pub use error::{StoreError, StoreResult};
pub use files::{ReadOutcome, RecordFiles};
pub use paths::{key_from_file_name, validate_key, StorePaths, RECORD_EXTENSION, TEMP_SUFFIX};
pub use traits::RecordStore;
