//! Core types for the Hallownest guessing game
//!
//! Every character is described by the same five attributes, each holding
//! one of four symbolic answers. The stored JSON uses the Spanish labels
//! the game has always shipped with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the fixed attributes a question asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    /// The character's weapon is a stinger/nail
    #[serde(rename = "arma_aguijon")]
    WeaponIsStinger,
    /// The character's weapon is part of the infection
    #[serde(rename = "arma_infeccion")]
    WeaponIsInfection,
    #[serde(rename = "rol_jefe")]
    IsBoss,
    #[serde(rename = "es_enemigo")]
    IsEnemy,
    #[serde(rename = "aparece_multiples")]
    AppearsMultipleTimes,
}

impl AttributeKey {
    /// All keys, in question order
    pub const ALL: [AttributeKey; 5] = [
        AttributeKey::WeaponIsStinger,
        AttributeKey::WeaponIsInfection,
        AttributeKey::IsBoss,
        AttributeKey::IsEnemy,
        AttributeKey::AppearsMultipleTimes,
    ];

    /// Identifier used in the persisted JSON
    pub fn id(&self) -> &'static str {
        match self {
            AttributeKey::WeaponIsStinger => "arma_aguijon",
            AttributeKey::WeaponIsInfection => "arma_infeccion",
            AttributeKey::IsBoss => "rol_jefe",
            AttributeKey::IsEnemy => "es_enemigo",
            AttributeKey::AppearsMultipleTimes => "aparece_multiples",
        }
    }

    /// Short column header for tables
    pub fn short(&self) -> &'static str {
        match self {
            AttributeKey::WeaponIsStinger => "aguijon",
            AttributeKey::WeaponIsInfection => "infeccion",
            AttributeKey::IsBoss => "jefe",
            AttributeKey::IsEnemy => "enemigo",
            AttributeKey::AppearsMultipleTimes => "multiples",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A symbolic answer, both for user input and stored attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerValue {
    #[serde(rename = "Si")]
    Yes,
    #[serde(rename = "No")]
    No,
    #[serde(rename = "No lo se")]
    Unsure,
    #[serde(rename = "Probablemente")]
    Probably,
}

impl AnswerValue {
    /// All values, in menu order
    pub const ALL: [AnswerValue; 4] = [
        AnswerValue::Yes,
        AnswerValue::No,
        AnswerValue::Unsure,
        AnswerValue::Probably,
    ];

    /// Yes and No are definite; Unsure and Probably are hedges
    pub fn is_definite(&self) -> bool {
        matches!(self, AnswerValue::Yes | AnswerValue::No)
    }

    pub fn is_hedge(&self) -> bool {
        !self.is_definite()
    }

    /// Label shown to players and written to disk
    pub fn label(&self) -> &'static str {
        match self {
            AnswerValue::Yes => "Si",
            AnswerValue::No => "No",
            AnswerValue::Unsure => "No lo se",
            AnswerValue::Probably => "Probablemente",
        }
    }

    /// Parse a free-text answer. Case-insensitive, accents optional.
    pub fn parse_token(input: &str) -> Option<AnswerValue> {
        let normalized = input
            .trim()
            .to_lowercase()
            .replace('í', "i")
            .replace('é', "e");
        let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        match collapsed.as_str() {
            "si" | "s" | "yes" | "y" => Some(AnswerValue::Yes),
            "no" | "n" => Some(AnswerValue::No),
            "no lo se" | "nose" | "no se" | "?" | "unsure" => Some(AnswerValue::Unsure),
            "probablemente" | "prob" | "p" | "probably" => Some(AnswerValue::Probably),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attribute profile of one known character
///
/// Profiles loaded from disk may be partial. Absent keys read as
/// [`AnswerValue::Unsure`] without being written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterProfile(BTreeMap<AttributeKey, AnswerValue>);

impl CharacterProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a full profile from values given in question order
    pub fn from_values(values: [AnswerValue; 5]) -> Self {
        Self(AttributeKey::ALL.into_iter().zip(values).collect())
    }

    /// Stored value, defaulting to `Unsure` for absent keys
    pub fn get(&self, key: AttributeKey) -> AnswerValue {
        self.0.get(&key).copied().unwrap_or(AnswerValue::Unsure)
    }

    pub fn set(&mut self, key: AttributeKey, value: AnswerValue) {
        self.0.insert(key, value);
    }

    pub fn is_complete(&self) -> bool {
        AttributeKey::ALL.iter().all(|k| self.0.contains_key(k))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Answers collected during a single round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerVector(BTreeMap<AttributeKey, AnswerValue>);

impl AnswerVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: [AnswerValue; 5]) -> Self {
        Self(AttributeKey::ALL.into_iter().zip(values).collect())
    }

    pub fn record(&mut self, key: AttributeKey, value: AnswerValue) {
        self.0.insert(key, value);
    }

    /// Number of attributes answered so far
    pub fn answered(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, AnswerValue)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Reuse the answers verbatim as a character profile
    pub fn to_profile(&self) -> CharacterProfile {
        CharacterProfile(self.0.clone())
    }
}

/// Mapping from unique character name to profile, iterated in name order
pub type KnowledgeBase = BTreeMap<String, CharacterProfile>;

/// A question bound to the attribute it fills
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub key: AttributeKey,
    pub text: String,
}

impl Question {
    pub fn new(key: AttributeKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }
}
