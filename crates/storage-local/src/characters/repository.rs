use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;

use dragonbane_core::characters::{
    CharacterPatch, CharacterRecord, CharacterStoreTrait, NewCharacter,
};
use dragonbane_core::Result;

use crate::config::LocalStoreConfig;
use crate::errors::LocalStoreError;
use crate::kv::{FileKeyValueStore, KeyValueStore};

/// Character store backed by one JSON array under one storage key.
///
/// Every operation deserializes the whole collection; writes serialize it back.
/// A missing, unreadable or unparseable collection reads as empty.
pub struct LocalCharacterRepository {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    last_id: AtomicI64,
}

impl LocalCharacterRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            last_id: AtomicI64::new(0),
        }
    }

    /// Opens the file-backed store described by `config`.
    pub fn open(config: &LocalStoreConfig) -> std::result::Result<Self, LocalStoreError> {
        let store = FileKeyValueStore::open(&config.data_dir)?;
        Ok(Self::new(Arc::new(store), config.storage_key.clone()))
    }

    fn load_records(&self) -> Vec<CharacterRecord> {
        let raw = match self.store.get_item(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "[LocalStore] Failed to read '{}', treating as empty: {}",
                    self.storage_key, err
                );
                return Vec::new();
            }
        };

        let elements = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(elements) => elements,
            Err(err) => {
                warn!(
                    "[LocalStore] Corrupt collection under '{}', treating as empty: {}",
                    self.storage_key, err
                );
                return Vec::new();
            }
        };

        elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| {
                match serde_json::from_value::<CharacterRecord>(element) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(
                            "[LocalStore] Skipping unreadable record #{} under '{}': {}",
                            index, self.storage_key, err
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn save_records(&self, records: &[CharacterRecord]) -> Result<()> {
        let serialized = serde_json::to_string(records).map_err(LocalStoreError::from)?;
        self.store
            .set_item(&self.storage_key, &serialized)
            .map_err(Into::into)
    }

    /// Millisecond timestamp, bumped past the last id minted in this process
    /// and past every numeric id already stored.
    ///
    /// When a stored id leaves no room above it, the first timestamp not
    /// already taken is used instead.
    fn mint_id(&self, records: &[CharacterRecord]) -> String {
        let stored: HashSet<i64> = records
            .iter()
            .filter_map(|record| record.id.parse::<i64>().ok())
            .collect();
        let stored_max = stored.iter().copied().max().unwrap_or(0);
        let now = Utc::now().timestamp_millis();

        let mut last = self.last_id.load(Ordering::SeqCst);
        loop {
            let next = match last.max(stored_max).checked_add(1) {
                Some(floor) => now.max(floor),
                None => {
                    warn!(
                        "[LocalStore] Stored id {} cannot be exceeded, minting from the clock",
                        stored_max
                    );
                    (now..=i64::MAX)
                        .find(|candidate| !stored.contains(candidate))
                        .unwrap_or(now)
                }
            };
            match self
                .last_id
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next.to_string(),
                Err(actual) => last = actual,
            }
        }
    }
}

#[async_trait]
impl CharacterStoreTrait for LocalCharacterRepository {
    async fn create(&self, new_character: &NewCharacter) -> Result<String> {
        let mut records = self.load_records();
        let id = self.mint_id(&records);
        records.push(new_character.clone().into_record(id.clone()));
        self.save_records(&records)?;
        debug!("[LocalStore] Created character {}", id);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CharacterRecord>> {
        Ok(self
            .load_records()
            .into_iter()
            .filter(|record| record.owner_id == owner_id)
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<CharacterRecord>> {
        Ok(self.load_records().into_iter().find(|record| record.id == id))
    }

    async fn update(&self, id: &str, patch: &CharacterPatch) -> Result<()> {
        let mut records = self.load_records();
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            debug!("[LocalStore] Update skipped, character {} not found", id);
            return Ok(());
        };
        record.apply_patch(patch);
        self.save_records(&records)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.load_records();
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(());
        }
        self.save_records(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use dragonbane_core::characters::Payload;
    use dragonbane_core::{Error, LocalError};
    use serde_json::json;
    use tempfile::tempdir;

    const KEY: &str = "dragonbane_characters";

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn new_character(owner: &str, value: Value) -> NewCharacter {
        NewCharacter::new(owner, payload(value)).unwrap()
    }

    fn memory_repo() -> (LocalCharacterRepository, Arc<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let repo = LocalCharacterRepository::new(store.clone(), KEY);
        (repo, store)
    }

    #[tokio::test]
    async fn create_then_get_returns_payload_plus_id() {
        let (repo, _store) = memory_repo();
        let input = json!({
            "name": "Thorn",
            "attributes": {"for": 12, "agi": 9},
            "inventory": ["rope", "torch"]
        });

        let id = repo.create(&new_character("u1", input.clone())).await.unwrap();
        let record = repo.get(&id).await.unwrap().expect("record");

        let mut expected = input.as_object().cloned().unwrap();
        expected.insert("id".to_string(), json!(id));
        expected.insert("ownerId".to_string(), json!("u1"));
        assert_eq!(serde_json::to_value(&record).unwrap(), Value::Object(expected));
    }

    #[tokio::test]
    async fn collection_is_one_json_array_under_the_storage_key() {
        let (repo, store) = memory_repo();
        let id = repo
            .create(&new_character("u1", json!({"name": "Thorn"})))
            .await
            .unwrap();

        let raw = store.get_item(KEY).unwrap().expect("stored");
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, json!([{"id": id, "ownerId": "u1", "name": "Thorn"}]));
    }

    #[tokio::test]
    async fn ids_are_unique_within_a_burst() {
        let (repo, _store) = memory_repo();
        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(
                repo.create(&new_character("u1", json!({"n": i})))
                    .await
                    .unwrap(),
            );
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
        assert!(ids.iter().all(|id| id.parse::<i64>().is_ok()));
    }

    #[tokio::test]
    async fn new_ids_exceed_previously_stored_ids() {
        let (repo, store) = memory_repo();
        let future_id = Utc::now().timestamp_millis() + 60_000;
        store
            .set_item(
                KEY,
                &json!([{"id": future_id.to_string(), "ownerId": "u1"}]).to_string(),
            )
            .unwrap();

        let id = repo.create(&new_character("u1", json!({}))).await.unwrap();
        assert!(id.parse::<i64>().unwrap() > future_id);
    }

    #[tokio::test]
    async fn stored_id_at_the_numeric_limit_does_not_break_minting() {
        let (repo, store) = memory_repo();
        store
            .set_item(
                KEY,
                &json!([{"id": i64::MAX.to_string(), "ownerId": "u1"}]).to_string(),
            )
            .unwrap();

        let first = repo.create(&new_character("u1", json!({"n": 1}))).await.unwrap();
        let second = repo.create(&new_character("u1", json!({"n": 2}))).await.unwrap();

        let ids: Vec<String> = repo
            .list_by_owner("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(first, second);
        assert!(first.parse::<i64>().unwrap() > 0);
        assert!(second.parse::<i64>().unwrap() > 0);
        assert!(ids.contains(&i64::MAX.to_string()));
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let (repo, _store) = memory_repo();
        repo.create(&new_character("a", json!({"name": "A1"}))).await.unwrap();
        repo.create(&new_character("b", json!({"name": "B1"}))).await.unwrap();
        repo.create(&new_character("a", json!({"name": "A2"}))).await.unwrap();

        let mut names: Vec<String> = repo
            .list_by_owner("a")
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.field("name").unwrap().as_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["A1", "A2"]);
        assert!(repo.list_by_owner("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_is_a_shallow_merge() {
        let (repo, _store) = memory_repo();
        let id = repo
            .create(&new_character(
                "u1",
                json!({"name": "Thorn", "vitals": {"health": {"current": 5, "max": 10}}}),
            ))
            .await
            .unwrap();

        let patch = CharacterPatch::new(payload(json!({"vitals": {"health": {"current": 3}}})));
        repo.update(&id, &patch).await.unwrap();

        let record = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(record.field("name"), Some(&json!("Thorn")));
        assert_eq!(record.field("vitals"), Some(&json!({"health": {"current": 3}})));
    }

    #[tokio::test]
    async fn update_cannot_overwrite_identity() {
        let (repo, _store) = memory_repo();
        let id = repo.create(&new_character("u1", json!({}))).await.unwrap();

        let patch = CharacterPatch::new(payload(json!({"id": "x", "ownerId": "u2", "age": "40"})));
        repo.update(&id, &patch).await.unwrap();

        let record = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.owner_id, "u1");
        assert_eq!(record.field("age"), Some(&json!("40")));
    }

    #[tokio::test]
    async fn missing_ids_are_not_errors() {
        let (repo, store) = memory_repo();
        assert_eq!(repo.get("nonexistent-id").await.unwrap(), None);

        repo.update("nonexistent-id", &CharacterPatch::new(payload(json!({"a": 1}))))
            .await
            .unwrap();
        repo.delete("nonexistent-id").await.unwrap();
        assert_eq!(store.get_item(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (repo, _store) = memory_repo();
        let id = repo.create(&new_character("u1", json!({}))).await.unwrap();
        let keep = repo.create(&new_character("u1", json!({}))).await.unwrap();

        repo.delete(&id).await.unwrap();
        assert_eq!(repo.get(&id).await.unwrap(), None);
        repo.delete(&id).await.unwrap();
        assert!(repo.get(&keep).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_collection_reads_as_empty() {
        let (repo, store) = memory_repo();
        store.set_item(KEY, "{not json").unwrap();

        assert!(repo.list_by_owner("u1").await.unwrap().is_empty());
        assert_eq!(repo.get("1").await.unwrap(), None);
        repo.delete("1").await.unwrap();
        assert_eq!(store.get_item(KEY).unwrap().as_deref(), Some("{not json"));

        let id = repo.create(&new_character("u1", json!({}))).await.unwrap();
        assert!(repo.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unreadable_records_are_skipped_not_the_whole_collection() {
        let (repo, store) = memory_repo();
        store
            .set_item(
                KEY,
                &json!([
                    {"id": "1", "ownerId": "u1", "name": "Kept"},
                    {"id": "2", "name": "No owner"},
                    "not a record",
                    {"id": "3", "ownerId": "u1", "name": "Also kept"}
                ])
                .to_string(),
            )
            .unwrap();

        assert_eq!(repo.list_by_owner("u1").await.unwrap().len(), 2);

        let id = repo.create(&new_character("u1", json!({}))).await.unwrap();
        assert!(repo.get("1").await.unwrap().is_some());
        assert!(repo.get("3").await.unwrap().is_some());
        assert!(repo.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn quota_exceeded_on_write_propagates() {
        let store = Arc::new(MemoryKeyValueStore::with_quota(64));
        let repo = LocalCharacterRepository::new(store, KEY);

        let err = repo
            .create(&new_character("u1", json!({"notes": "x".repeat(128)})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Local(LocalError::QuotaExceeded { .. })));
        assert!(repo.list_by_owner("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_backed_records_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        let config = LocalStoreConfig::new(dir.path().join("origin"));

        let id = {
            let repo = LocalCharacterRepository::open(&config).unwrap();
            repo.create(&new_character("u1", json!({"name": "Thorn"})))
                .await
                .unwrap()
        };

        let reopened = LocalCharacterRepository::open(&config).unwrap();
        let record = reopened.get(&id).await.unwrap().expect("persisted");
        assert_eq!(record.field("name"), Some(&json!("Thorn")));
    }
}
