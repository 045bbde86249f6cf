use std::sync::Arc;

use log::{info, warn};

use dragonbane_core::catalog::{
    AbilityCatalog, CatalogSourceTrait, HeroicAbility, SpellCatalog, SpellSchool,
};
use dragonbane_core::characters::{
    is_remote_available, CharacterService, CharacterServiceTrait, CharacterStoreTrait,
    RemoteCharacterStoreTrait,
};
use dragonbane_core::events::{FallbackEventSink, NoOpFallbackEventSink};
use dragonbane_core::Result;
use dragonbane_firestore::{
    AbilityCatalogSource, FirestoreCharacterRepository, FirestoreClient, SpellCatalogSource,
};
use dragonbane_storage_local::LocalCharacterRepository;

use crate::config::AppConfig;

/// Bundled reference data served when the remote catalogs are unavailable
/// and used to seed them when empty.
#[derive(Debug, Clone, Default)]
pub struct BundledCatalogs {
    pub spells: Vec<SpellSchool>,
    pub abilities: Vec<HeroicAbility>,
}

pub struct ServiceContext {
    character_service: Arc<dyn CharacterServiceTrait>,
    spell_catalog: Arc<SpellCatalog>,
    ability_catalog: Arc<AbilityCatalog>,
    remote_available: bool,
}

impl ServiceContext {
    pub fn new(config: &AppConfig, bundled: BundledCatalogs) -> Result<Self> {
        Self::with_event_sink(config, bundled, Arc::new(NoOpFallbackEventSink))
    }

    /// Builds every service. Only the local store can fail to open; a remote
    /// client that cannot be built is logged, and the remote repository and
    /// catalog sources are then wired without one and probe as unavailable.
    pub fn with_event_sink(
        config: &AppConfig,
        bundled: BundledCatalogs,
        event_sink: Arc<dyn FallbackEventSink>,
    ) -> Result<Self> {
        let client = config
            .firestore
            .as_ref()
            .and_then(|firestore| match FirestoreClient::new(firestore) {
                Ok(client) => Some(client),
                Err(err) => {
                    warn!("Firestore client could not be built, running local-only: {}", err);
                    None
                }
            });

        let remote: Arc<dyn RemoteCharacterStoreTrait> =
            Arc::new(FirestoreCharacterRepository::new(client.clone()));
        let remote_available = is_remote_available(Some(remote.as_ref()));
        if remote_available {
            info!("Character storage: remote with local fallback");
        } else {
            info!(
                "Character storage: local only ({})",
                config.local.data_dir.display()
            );
        }

        let local: Arc<dyn CharacterStoreTrait> =
            Arc::new(LocalCharacterRepository::open(&config.local)?);
        let character_service =
            CharacterService::new(Some(remote), local).with_event_sink(event_sink);

        let spell_source: Arc<dyn CatalogSourceTrait<SpellSchool>> =
            Arc::new(SpellCatalogSource::new(client.clone()));
        let ability_source: Arc<dyn CatalogSourceTrait<HeroicAbility>> =
            Arc::new(AbilityCatalogSource::new(client));

        Ok(Self {
            character_service: Arc::new(character_service),
            spell_catalog: Arc::new(SpellCatalog::new(
                "spells",
                Some(spell_source),
                bundled.spells,
            )),
            ability_catalog: Arc::new(AbilityCatalog::new(
                "abilities",
                Some(ability_source),
                bundled.abilities,
            )),
            remote_available,
        })
    }

    pub fn character_service(&self) -> Arc<dyn CharacterServiceTrait> {
        Arc::clone(&self.character_service)
    }

    pub fn spell_catalog(&self) -> Arc<SpellCatalog> {
        Arc::clone(&self.spell_catalog)
    }

    pub fn ability_catalog(&self) -> Arc<AbilityCatalog> {
        Arc::clone(&self.ability_catalog)
    }

    /// Probe result at construction time.
    pub fn is_remote_available(&self) -> bool {
        self.remote_available
    }
}
