use std::path::PathBuf;

use dragonbane_firestore::FirestoreConfig;
use dragonbane_storage_local::LocalStoreConfig;

/// Everything the composition root needs to wire the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` leaves the remote backend unconfigured.
    pub firestore: Option<FirestoreConfig>,
    pub local: LocalStoreConfig,
}

impl AppConfig {
    /// Reads `FIREBASE_*`, `FIRESTORE_*` and `DRAGONBANE_DATA_DIR`.
    pub fn from_env() -> Self {
        Self {
            firestore: FirestoreConfig::from_env(),
            local: LocalStoreConfig::from_env(),
        }
    }

    pub fn local_only(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            firestore: None,
            local: LocalStoreConfig::new(data_dir),
        }
    }

    pub fn with_firestore(mut self, firestore: FirestoreConfig) -> Self {
        self.firestore = Some(firestore);
        self
    }
}
