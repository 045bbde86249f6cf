//! Diagnostics emitted when the facade absorbs a remote failure.

use std::fmt;

/// The five repository operations, named for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Create,
    ListByOwner,
    Get,
    Update,
    Delete,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::ListByOwner => "list_by_owner",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote failure that was absorbed by retrying against the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEvent {
    pub operation: StoreOperation,
    pub error: String,
}

/// Receives fallback diagnostics. Implementations must not block.
pub trait FallbackEventSink: Send + Sync {
    fn emit(&self, event: FallbackEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpFallbackEventSink;

impl FallbackEventSink for NoOpFallbackEventSink {
    fn emit(&self, _event: FallbackEvent) {}
}
