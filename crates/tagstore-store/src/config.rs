use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tagstore_tree::DEFAULT_COMPRESSION_LEVEL;

use crate::error::{StoreError, StoreResult};

/// How a new file replaces an existing one at the final path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceStrategy {
    /// Rename the temporary file over the existing one in a single step.
    #[default]
    Atomic,
    /// Delete the existing file, verify it is gone, then rename. Between the
    /// two steps the final path does not exist.
    DeleteThenRename,
}

/// Configuration for a file-backed record store.
///
/// ```toml
/// base_dir = "saves/world/FEData/NBT"
/// replace = "atomic"
/// sync_writes = true
/// compression_level = 3
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory; each record type gets a subdirectory.
    pub base_dir: PathBuf,
    pub replace: ReplaceStrategy,
    /// `fsync` temporary files before they replace the previous file.
    pub sync_writes: bool,
    /// zstd compression level.
    pub compression_level: i32,
    /// When present, `base_dir` is derived from these settings on load.
    pub data_dir: Option<DataDirSettings>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            replace: ReplaceStrategy::default(),
            sync_writes: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            data_dir: None,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let mut config: Self = toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))?;
        if let Some(settings) = &config.data_dir {
            config.base_dir = settings.base_dir();
        }
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}

/// Derives the store root from a world name and data directory.
///
/// With `use_data_dir` the store lives under the shared data directory,
/// otherwise next to the world save: `.` on a dedicated server, `./saves` on
/// a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDirSettings {
    pub use_data_dir: bool,
    pub world_name: String,
    pub data_dir: PathBuf,
    pub dedicated_server: bool,
}

impl Default for DataDirSettings {
    fn default() -> Self {
        Self {
            use_data_dir: false,
            world_name: "world".into(),
            data_dir: PathBuf::from("tagstore"),
            dedicated_server: true,
        }
    }
}

impl DataDirSettings {
    pub fn base_dir(&self) -> PathBuf {
        if self.use_data_dir {
            self.data_dir
                .join("saves")
                .join("NBT")
                .join(&self.world_name)
        } else {
            let parent = if self.dedicated_server {
                PathBuf::from(".")
            } else {
                PathBuf::from("./saves")
            };
            parent.join(&self.world_name).join("FEData").join("NBT")
        }
    }
}
