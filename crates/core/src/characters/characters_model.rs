use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Field holding the record identifier in every persisted layout.
pub const ID_FIELD: &str = "id";
/// Field holding the owning identity; the only list filter.
pub const OWNER_ID_FIELD: &str = "ownerId";

/// Arbitrary top-level character fields (attributes, skills, inventory, ...).
pub type Payload = Map<String, Value>;

fn strip_reserved(mut payload: Payload) -> Payload {
    for key in [ID_FIELD, OWNER_ID_FIELD] {
        if payload.remove(key).is_some() {
            debug!("[Characters] Ignoring immutable field '{}' in payload", key);
        }
    }
    payload
}

/// One persisted character: identity fields plus an opaque payload.
///
/// Serializes flat, with `id` and `ownerId` next to the payload fields, which
/// is the layout both backends store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: String,
    pub owner_id: String,
    #[serde(flatten)]
    payload: Payload,
}

impl CharacterRecord {
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            payload: strip_reserved(payload),
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Shallow merge: each top-level key in the patch replaces the stored
    /// value wholesale. Nested objects are not merged.
    pub fn apply_patch(&mut self, patch: &CharacterPatch) {
        for (key, value) in patch.fields() {
            self.payload.insert(key.clone(), value.clone());
        }
    }
}

/// A character about to be created; the backend assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharacter {
    owner_id: String,
    payload: Payload,
}

impl NewCharacter {
    pub fn new(owner_id: impl Into<String>, payload: Payload) -> Result<Self> {
        let owner_id = owner_id.into();
        if owner_id.trim().is_empty() {
            return Err(Error::invalid_input("owner id must not be empty"));
        }
        Ok(Self {
            owner_id,
            payload: strip_reserved(payload),
        })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_record(self, id: impl Into<String>) -> CharacterRecord {
        CharacterRecord {
            id: id.into(),
            owner_id: self.owner_id,
            payload: self.payload,
        }
    }

    /// Flat document body: payload fields plus `ownerId`, without `id`.
    pub fn to_document(&self) -> Payload {
        let mut document = self.payload.clone();
        document.insert(
            OWNER_ID_FIELD.to_string(),
            Value::String(self.owner_id.clone()),
        );
        document
    }
}

/// A partial update. Only the keys present are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterPatch {
    fields: Payload,
}

impl CharacterPatch {
    pub fn new(fields: Payload) -> Self {
        Self {
            fields: strip_reserved(fields),
        }
    }

    /// Builds a patch from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(Error::invalid_input(format!(
                "update payload must be an object, got {}",
                other
            ))),
        }
    }

    pub fn fields(&self) -> &Payload {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
