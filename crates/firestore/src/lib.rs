//! Remote backend for Dragonbane character sheets.
//!
//! Talks to a Firestore-compatible document database over its REST API and
//! implements the character store and catalog source contracts on top of it.

pub mod catalog;
pub mod characters;
pub mod client;
pub mod config;
pub mod error;
pub mod types;
pub mod value;

#[cfg(test)]
mod test_support;

pub use catalog::{AbilityCatalogSource, SpellCatalogSource};
pub use characters::{FirestoreCharacterRepository, CHARACTERS_COLLECTION};
pub use client::{CollectionRef, FirestoreClient};
pub use config::FirestoreConfig;
pub use error::{FirestoreError, Result};
