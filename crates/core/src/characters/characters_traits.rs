use async_trait::async_trait;

use super::characters_model::{CharacterPatch, CharacterRecord, NewCharacter, Payload};
use crate::errors::Result;

/// Contract implemented by each storage backend.
///
/// Absence is never an error: `get` returns `Ok(None)`, and `update` and
/// `delete` on a missing id succeed without effect.
#[async_trait]
pub trait CharacterStoreTrait: Send + Sync {
    /// Persists a new record and returns the backend-assigned id.
    async fn create(&self, new_character: &NewCharacter) -> Result<String>;

    /// All records whose `ownerId` equals `owner_id`, in no particular order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CharacterRecord>>;

    async fn get(&self, id: &str) -> Result<Option<CharacterRecord>>;

    /// Shallow-merges `patch` onto the stored record.
    async fn update(&self, id: &str, patch: &CharacterPatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// A backend that may not have been configured for this process.
pub trait RemoteCharacterStoreTrait: CharacterStoreTrait {
    /// Capability check: true iff the client and collection handles were
    /// built at startup. Performs no I/O and says nothing about liveness.
    fn is_available(&self) -> bool;
}

/// The backend-agnostic interface used by page-level callers.
#[async_trait]
pub trait CharacterServiceTrait: Send + Sync {
    async fn create(&self, owner_id: &str, payload: Payload) -> Result<String>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CharacterRecord>>;

    async fn get(&self, id: &str) -> Result<Option<CharacterRecord>>;

    async fn update(&self, id: &str, partial: Payload) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}
