use std::path::PathBuf;

/// Storage key holding the serialized character collection.
pub const DEFAULT_STORAGE_KEY: &str = "dragonbane_characters";

const DATA_DIR_ENV: &str = "DRAGONBANE_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".dragonbane";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStoreConfig {
    /// Directory scoping the key-value store (one origin).
    pub data_dir: PathBuf,
    pub storage_key: String,
}

impl LocalStoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Reads `DRAGONBANE_DATA_DIR`, defaulting to `./.dragonbane`.
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        Self::new(data_dir)
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }
}
