//! Local key-value persistence for character records.
//!
//! All records for all owners live in one JSON array under a single storage
//! key, inside one origin-scoped key-value store.

pub mod characters;
pub mod config;
pub mod errors;
pub mod kv;

pub use characters::LocalCharacterRepository;
pub use config::{LocalStoreConfig, DEFAULT_STORAGE_KEY};
pub use errors::{LocalStoreError, Result};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
