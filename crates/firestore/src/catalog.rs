//! Remote homes of the spell and heroic-ability reference catalogs.
//!
//! Abilities live one document per ability in `abilities`, keyed by name.
//! Spells live in a single `spells/all_spells` document whose `ecoles` field
//! holds every school.

use async_trait::async_trait;
use log::warn;
use serde_json::{Map, Value};

use dragonbane_core::catalog::{CatalogSourceTrait, HeroicAbility, SpellSchool};
use dragonbane_core::Result;

use crate::client::{CollectionRef, FirestoreClient};
use crate::error::FirestoreError;
use crate::types::Document;
use crate::value::{decode_fields, encode_fields};

pub const ABILITIES_COLLECTION: &str = "abilities";
pub const SPELLS_COLLECTION: &str = "spells";
pub const SPELLS_DOCUMENT_ID: &str = "all_spells";
const SCHOOLS_FIELD: &str = "ecoles";

fn to_fields<T: serde::Serialize>(value: &T) -> std::result::Result<Map<String, Value>, FirestoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(FirestoreError::invalid_request(format!(
            "catalog entry must serialize to an object, got {}",
            other
        ))),
    }
}

/// Document ids cannot contain `/`.
fn ability_document_id(ability: &HeroicAbility) -> String {
    ability.capacite.trim().replace('/', "-")
}

pub struct AbilityCatalogSource {
    client: Option<FirestoreClient>,
    collection: Option<CollectionRef>,
}

impl AbilityCatalogSource {
    pub fn new(client: Option<FirestoreClient>) -> Self {
        Self {
            client,
            collection: CollectionRef::new(ABILITIES_COLLECTION).ok(),
        }
    }

    fn handles(&self) -> std::result::Result<(&FirestoreClient, &CollectionRef), FirestoreError> {
        match (&self.client, &self.collection) {
            (Some(client), Some(collection)) => Ok((client, collection)),
            _ => Err(FirestoreError::NotConfigured),
        }
    }
}

fn ability_from_document(document: Document) -> Option<HeroicAbility> {
    let name = document.name.clone();
    match serde_json::from_value(Value::Object(decode_fields(document.fields))) {
        Ok(ability) => Some(ability),
        Err(err) => {
            warn!("[Catalog] Skipping unreadable ability {}: {}", name, err);
            None
        }
    }
}

#[async_trait]
impl CatalogSourceTrait<HeroicAbility> for AbilityCatalogSource {
    fn is_configured(&self) -> bool {
        self.client.is_some() && self.collection.is_some()
    }

    async fn fetch_all(&self) -> Result<Vec<HeroicAbility>> {
        let (client, collection) = self.handles()?;
        let documents = client.list_documents(collection).await?;
        Ok(documents.into_iter().filter_map(ability_from_document).collect())
    }

    async fn seed(&self, entries: &[HeroicAbility]) -> Result<()> {
        let (client, collection) = self.handles()?;
        for ability in entries {
            let fields = encode_fields(&to_fields(ability)?);
            client
                .set_document(collection, &ability_document_id(ability), fields)
                .await?;
        }
        Ok(())
    }
}

pub struct SpellCatalogSource {
    client: Option<FirestoreClient>,
    collection: Option<CollectionRef>,
}

impl SpellCatalogSource {
    pub fn new(client: Option<FirestoreClient>) -> Self {
        Self {
            client,
            collection: CollectionRef::new(SPELLS_COLLECTION).ok(),
        }
    }

    fn handles(&self) -> std::result::Result<(&FirestoreClient, &CollectionRef), FirestoreError> {
        match (&self.client, &self.collection) {
            (Some(client), Some(collection)) => Ok((client, collection)),
            _ => Err(FirestoreError::NotConfigured),
        }
    }
}

#[async_trait]
impl CatalogSourceTrait<SpellSchool> for SpellCatalogSource {
    fn is_configured(&self) -> bool {
        self.client.is_some() && self.collection.is_some()
    }

    /// A missing document or a missing `ecoles` field reads as empty.
    async fn fetch_all(&self) -> Result<Vec<SpellSchool>> {
        let (client, collection) = self.handles()?;
        let Some(document) = client.get_document(collection, SPELLS_DOCUMENT_ID).await? else {
            return Ok(Vec::new());
        };

        let mut fields = decode_fields(document.fields);
        match fields.remove(SCHOOLS_FIELD) {
            Some(schools) => Ok(serde_json::from_value(schools)?),
            None => Ok(Vec::new()),
        }
    }

    async fn seed(&self, entries: &[SpellSchool]) -> Result<()> {
        let (client, collection) = self.handles()?;
        let mut document = Map::new();
        document.insert(SCHOOLS_FIELD.to_string(), serde_json::to_value(entries)?);
        client
            .set_document(collection, SPELLS_DOCUMENT_ID, encode_fields(&document))
            .await?;
        Ok(())
    }
}
