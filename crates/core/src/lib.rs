//! Core domain for the Dragonbane character sheet manager.
//!
//! Defines the character record model, the store contracts every backend
//! implements, and the resilient facade that routes calls between the remote
//! document database and the local key-value store.

pub mod catalog;
pub mod characters;
pub mod errors;
pub mod events;

pub use errors::{Error, LocalError, RemoteError, Result};
