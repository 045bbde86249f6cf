use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::characters_model::{CharacterPatch, CharacterRecord, NewCharacter, Payload};
use super::characters_traits::{
    CharacterServiceTrait, CharacterStoreTrait, RemoteCharacterStoreTrait,
};
use crate::errors::{Error, Result};
use crate::events::{FallbackEvent, FallbackEventSink, NoOpFallbackEventSink, StoreOperation};

/// Availability probe over an injected remote handle.
///
/// `None` means the handle was never constructed (e.g. missing credentials).
pub fn is_remote_available(remote: Option<&dyn RemoteCharacterStoreTrait>) -> bool {
    remote.is_some_and(|store| store.is_available())
}

/// Resilient repository facade.
///
/// Each operation goes to the remote store when the probe allows it; any
/// remote error is logged, reported to the event sink, and the identical
/// operation is replayed against the local store. Local errors propagate
/// unchanged. Results from the two backends are never merged, and a
/// successful remote write is not mirrored locally.
pub struct CharacterService {
    remote: Option<Arc<dyn RemoteCharacterStoreTrait>>,
    local: Arc<dyn CharacterStoreTrait>,
    event_sink: Arc<dyn FallbackEventSink>,
}

impl CharacterService {
    pub fn new(
        remote: Option<Arc<dyn RemoteCharacterStoreTrait>>,
        local: Arc<dyn CharacterStoreTrait>,
    ) -> Self {
        Self {
            remote,
            local,
            event_sink: Arc::new(NoOpFallbackEventSink),
        }
    }

    /// Facade that never attempts the remote backend.
    pub fn local_only(local: Arc<dyn CharacterStoreTrait>) -> Self {
        Self::new(None, local)
    }

    /// Sets the sink receiving a `FallbackEvent` per absorbed remote failure.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn FallbackEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn is_remote_available(&self) -> bool {
        is_remote_available(self.remote.as_deref())
    }

    fn remote(&self) -> Option<&dyn RemoteCharacterStoreTrait> {
        self.remote.as_deref().filter(|store| store.is_available())
    }

    fn record_fallback(&self, operation: StoreOperation, error: &Error) {
        warn!(
            "[Characters] Remote {} failed, falling back to local store: {}",
            operation, error
        );
        self.event_sink.emit(FallbackEvent {
            operation,
            error: error.to_string(),
        });
    }
}

#[async_trait]
impl CharacterServiceTrait for CharacterService {
    async fn create(&self, owner_id: &str, payload: Payload) -> Result<String> {
        let new_character = NewCharacter::new(owner_id, payload)?;
        if let Some(remote) = self.remote() {
            match remote.create(&new_character).await {
                Ok(id) => return Ok(id),
                Err(err) => self.record_fallback(StoreOperation::Create, &err),
            }
        } else {
            debug!("[Characters] Remote unavailable, creating in local store");
        }
        self.local.create(&new_character).await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CharacterRecord>> {
        if let Some(remote) = self.remote() {
            match remote.list_by_owner(owner_id).await {
                Ok(records) => return Ok(records),
                Err(err) => self.record_fallback(StoreOperation::ListByOwner, &err),
            }
        }
        self.local.list_by_owner(owner_id).await
    }

    async fn get(&self, id: &str) -> Result<Option<CharacterRecord>> {
        if let Some(remote) = self.remote() {
            match remote.get(id).await {
                Ok(record) => return Ok(record),
                Err(err) => self.record_fallback(StoreOperation::Get, &err),
            }
        }
        self.local.get(id).await
    }

    async fn update(&self, id: &str, partial: Payload) -> Result<()> {
        let patch = CharacterPatch::new(partial);
        if let Some(remote) = self.remote() {
            match remote.update(id, &patch).await {
                Ok(()) => return Ok(()),
                Err(err) => self.record_fallback(StoreOperation::Update, &err),
            }
        }
        self.local.update(id, &patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if let Some(remote) = self.remote() {
            match remote.delete(id).await {
                Ok(()) => return Ok(()),
                Err(err) => self.record_fallback(StoreOperation::Delete, &err),
            }
        }
        self.local.delete(id).await
    }
}
