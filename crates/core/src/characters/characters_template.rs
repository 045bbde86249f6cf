//! Default sheet used when a player starts a new character.

use serde_json::{json, Map, Value};

use super::characters_model::{NewCharacter, Payload};
use crate::errors::Result;

/// Core skills and the attribute each one derives from.
pub const CORE_SKILLS: [(&str, &str); 20] = [
    ("Acrobatie", "agi"),
    ("Artisanat", "for"),
    ("Bluff", "cha"),
    ("Chasse et pêche", "agi"),
    ("Con. des bêtes", "int"),
    ("Dextérité", "agi"),
    ("Discrétion", "agi"),
    ("Équitation", "agi"),
    ("Esquive", "agi"),
    ("Intuition", "int"),
    ("Langues", "int"),
    ("Marchandage", "cha"),
    ("Mythes et légendes", "int"),
    ("Natation", "agi"),
    ("Navigation", "int"),
    ("Perception", "int"),
    ("Persuasion", "cha"),
    ("Représentation", "cha"),
    ("Soins", "int"),
    ("Survie", "int"),
];

/// Weapon skills and their base attribute.
pub const WEAPON_SKILLS: [(&str, &str); 10] = [
    ("Arbalètes", "agi"),
    ("Arcs", "agi"),
    ("Bagarre", "for"),
    ("Bâtons", "agi"),
    ("Couteaux", "agi"),
    ("Épées", "for"),
    ("Frondes", "agi"),
    ("Haches", "for"),
    ("Lances", "for"),
    ("Marteaux", "for"),
];

const ABILITY_SLOTS: usize = 5;
const SECONDARY_SKILL_SLOTS: usize = 2;
const INVENTORY_SLOTS: usize = 10;
const WEAPON_ROWS: usize = 2;
const STARTING_ATTRIBUTE: u32 = 10;
const STARTING_POOL: u32 = 18;

fn unchecked(skills: &[(&str, &str)]) -> Value {
    let map: Map<String, Value> = skills
        .iter()
        .map(|(name, _)| (name.to_string(), Value::Bool(false)))
        .collect();
    Value::Object(map)
}

fn blank_slots(count: usize) -> Value {
    Value::Array(vec![Value::String(String::new()); count])
}

fn blank_weapon() -> Value {
    json!({
        "name": "",
        "grip": "",
        "range": "",
        "damage": "",
        "durability": "",
        "traits": ""
    })
}

/// Payload of an empty character sheet.
pub fn blank_character_payload() -> Payload {
    let sheet = json!({
        "name": "",
        "player": "",
        "family": "",
        "age": "",
        "profession": "",
        "weakness": "",
        "appearance": "",
        "attributes": {
            "for": STARTING_ATTRIBUTE,
            "con": STARTING_ATTRIBUTE,
            "agi": STARTING_ATTRIBUTE,
            "int": STARTING_ATTRIBUTE,
            "vol": STARTING_ATTRIBUTE,
            "cha": STARTING_ATTRIBUTE
        },
        "conditions": {
            "exhausted": false,
            "sick": false,
            "stunned": false,
            "furious": false,
            "scared": false,
            "discouraged": false
        },
        "damageBonus": { "for": "", "agi": "" },
        "movement": "",
        "encumbranceLimit": "",
        "abilities": blank_slots(ABILITY_SLOTS),
        "skills": unchecked(&CORE_SKILLS),
        "weaponSkills": unchecked(&WEAPON_SKILLS),
        "secondarySkills": blank_slots(SECONDARY_SKILL_SLOTS),
        "inventory": blank_slots(INVENTORY_SLOTS),
        "souvenir": "",
        "tinyItems": "",
        "money": { "or": 0, "argent": 0, "cuivre": 0 },
        "armor": { "name": "", "bane": ["ACROBATIE", "DISCRÉTION", "ESQUIVE"] },
        "helmet": { "name": "", "bane": ["ATTAQUES À DISTANCE", "INTUITION"] },
        "weapons": vec![blank_weapon(); WEAPON_ROWS],
        "vitals": {
            "willpower": { "current": STARTING_POOL, "max": STARTING_POOL },
            "health": { "current": STARTING_POOL, "max": STARTING_POOL }
        },
        "deathRolls": { "successes": 0, "failures": 0 },
        "rest": { "round": false, "period": false }
    });

    match sheet {
        Value::Object(payload) => payload,
        _ => Payload::new(),
    }
}

/// A new, empty character owned by `owner_id`.
pub fn blank_character(owner_id: &str) -> Result<NewCharacter> {
    NewCharacter::new(owner_id, blank_character_payload())
}
