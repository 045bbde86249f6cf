use async_trait::async_trait;
use log::debug;

use dragonbane_core::characters::{
    CharacterPatch, CharacterRecord, CharacterStoreTrait, NewCharacter, RemoteCharacterStoreTrait,
    OWNER_ID_FIELD,
};
use dragonbane_core::Result;

use crate::client::{CollectionRef, FirestoreClient};
use crate::error::FirestoreError;
use crate::types::Document;
use crate::value::{decode_fields, encode_fields, FirestoreValue};

pub const CHARACTERS_COLLECTION: &str = "characters";

/// Character store backed by the `characters` collection.
///
/// Built even without a client (missing or unusable connection parameters);
/// in that case `is_available` reports false and every operation fails with
/// `NotConfigured`.
pub struct FirestoreCharacterRepository {
    client: Option<FirestoreClient>,
    collection: Option<CollectionRef>,
}

impl FirestoreCharacterRepository {
    pub fn new(client: Option<FirestoreClient>) -> Self {
        Self {
            client,
            collection: CollectionRef::new(CHARACTERS_COLLECTION).ok(),
        }
    }

    fn handles(&self) -> std::result::Result<(&FirestoreClient, &CollectionRef), FirestoreError> {
        match (&self.client, &self.collection) {
            (Some(client), Some(collection)) => Ok((client, collection)),
            _ => Err(FirestoreError::NotConfigured),
        }
    }
}

/// Flattens a stored document into a record. Documents without an id or a
/// string `ownerId` are rejected.
fn record_from_document(document: Document) -> std::result::Result<CharacterRecord, FirestoreError> {
    let id = document
        .id()
        .map(str::to_string)
        .ok_or_else(|| FirestoreError::invalid_document("document has no name"))?;

    let mut payload = decode_fields(document.fields);
    let owner_id = match payload.remove(OWNER_ID_FIELD) {
        Some(serde_json::Value::String(owner_id)) => owner_id,
        _ => {
            return Err(FirestoreError::invalid_document(format!(
                "document {} has no {}",
                id, OWNER_ID_FIELD
            )))
        }
    };

    Ok(CharacterRecord::new(id, owner_id, payload))
}

#[async_trait]
impl CharacterStoreTrait for FirestoreCharacterRepository {
    async fn create(&self, new_character: &NewCharacter) -> Result<String> {
        let (client, collection) = self.handles()?;
        let document = client
            .create_document(collection, encode_fields(&new_character.to_document()))
            .await?;
        let id = document
            .id()
            .map(str::to_string)
            .ok_or_else(|| FirestoreError::invalid_document("created document has no name"))?;
        debug!("[Characters] Created remote character {}", id);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CharacterRecord>> {
        let (client, collection) = self.handles()?;
        let documents = client
            .query_equal(collection, OWNER_ID_FIELD, FirestoreValue::string(owner_id))
            .await?;
        let records = documents
            .into_iter()
            .map(record_from_document)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<CharacterRecord>> {
        let (client, collection) = self.handles()?;
        if id.is_empty() {
            return Ok(None);
        }
        match client.get_document(collection, id).await? {
            Some(document) => Ok(Some(record_from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: &str, patch: &CharacterPatch) -> Result<()> {
        let (client, collection) = self.handles()?;
        if id.is_empty() || patch.is_empty() {
            return Ok(());
        }
        let found = client
            .update_fields(collection, id, encode_fields(patch.fields()))
            .await?;
        if !found {
            debug!("[Characters] Remote update skipped, {} not found", id);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let (client, collection) = self.handles()?;
        if id.is_empty() {
            return Ok(());
        }
        client.delete_document(collection, id).await?;
        Ok(())
    }
}

impl RemoteCharacterStoreTrait for FirestoreCharacterRepository {
    fn is_available(&self) -> bool {
        self.client.is_some() && self.collection.is_some()
    }
}
