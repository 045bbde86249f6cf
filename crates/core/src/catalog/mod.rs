//! Spell and heroic-ability reference catalogs.

mod catalog_model;
mod catalog_service;

pub use catalog_model::{HeroicAbility, NumberOrText, Spell, SpellSchool};
pub use catalog_service::{AbilityCatalog, CatalogService, CatalogSourceTrait, SpellCatalog};
