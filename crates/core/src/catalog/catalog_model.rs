use serde::{Deserialize, Serialize};

/// Value that the reference data stores either as text or as a number
/// (e.g. a spell rank of `2` or `"Tour de magie"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl Default for NumberOrText {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Heroic ability from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroicAbility {
    pub capacite: String,
    #[serde(default)]
    pub prerequis: String,
    #[serde(default)]
    pub pv: NumberOrText,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub nom: String,
    #[serde(default)]
    pub ecole: String,
    #[serde(default)]
    pub rang: NumberOrText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_prealable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temps_incantation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duree: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A school of magic and the spells it teaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellSchool {
    pub nom: String,
    #[serde(default)]
    pub sorts: Vec<Spell>,
}
