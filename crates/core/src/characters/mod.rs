//! Character records and the resilient repository facade.

mod characters_model;
mod characters_service;
mod characters_template;
mod characters_traits;

pub use characters_model::{
    CharacterPatch, CharacterRecord, NewCharacter, Payload, ID_FIELD, OWNER_ID_FIELD,
};
pub use characters_service::{is_remote_available, CharacterService};
pub use characters_template::{
    blank_character, blank_character_payload, CORE_SKILLS, WEAPON_SKILLS,
};
pub use characters_traits::{
    CharacterServiceTrait, CharacterStoreTrait, RemoteCharacterStoreTrait,
};
