//! Game configuration
//!
//! Questions, seed characters and matching policy are immutable values
//! handed to the store and engine at construction time.

use crate::types::{AttributeKey, CharacterProfile, KnowledgeBase, Question};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// File name of the persisted knowledge base
pub const DATA_FILE_NAME: &str = "hollow_knight_data.json";

/// Environment variable overriding the knowledge base location
pub const DATA_PATH_ENV: &str = "HALLOWNEST_DATA";

/// How the engine narrows candidates down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Drop contradicting candidates after every definite answer
    #[default]
    Eliminate,
    /// Score every candidate once all answers are in
    ScoreAll,
}

impl MatchPolicy {
    /// Threshold used when none is configured explicitly
    pub fn default_threshold(&self) -> f64 {
        match self {
            MatchPolicy::Eliminate => 0.5,
            MatchPolicy::ScoreAll => 0.8,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "eliminate" | "elimination" => Ok(MatchPolicy::Eliminate),
            "score" | "score-all" => Ok(MatchPolicy::ScoreAll),
            other => bail!("Unknown policy '{}': expected 'eliminate' or 'score'", other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MatchPolicy::Eliminate => "eliminate",
            MatchPolicy::ScoreAll => "score",
        }
    }
}

/// How the console reads answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Free-text tokens ("Si", "no lo se", ...)
    #[default]
    Text,
    /// Numbered menu choices
    Menu,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub data_path: PathBuf,
    pub questions: Vec<Question>,
    pub seed: KnowledgeBase,
    pub policy: MatchPolicy,
    /// Minimum similarity for a scored guess to be shown
    pub confidence_threshold: f64,
    /// Cosmetic pause before a guess is revealed
    pub reveal_delay: Duration,
    pub input_mode: InputMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        let policy = MatchPolicy::default();
        Self {
            data_path: default_data_path(),
            questions: default_questions(),
            seed: seed_knowledge_base(),
            policy,
            confidence_threshold: policy.default_threshold(),
            reveal_delay: Duration::ZERO,
            input_mode: InputMode::default(),
        }
    }
}

impl GameConfig {
    /// Switch policy, resetting the threshold to that policy's default
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self.confidence_threshold = policy.default_threshold();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("Confidence threshold must be within 0..=1, got {}", threshold);
        }
        self.confidence_threshold = threshold;
        Ok(self)
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}

/// Default knowledge base location
///
/// `HALLOWNEST_DATA` wins; otherwise the platform data dir
/// (XDG on Linux, ~/Library/Application Support on macOS).
pub fn default_data_path() -> PathBuf {
    if let Some(path) = std::env::var_os(DATA_PATH_ENV) {
        return PathBuf::from(path);
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hallownest-guess")
        .join(DATA_FILE_NAME)
}

pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            AttributeKey::WeaponIsStinger,
            "¿El arma que utiliza es un aguijón?",
        ),
        Question::new(
            AttributeKey::WeaponIsInfection,
            "¿El arma que utiliza es parte de la infección?",
        ),
        Question::new(AttributeKey::IsBoss, "¿El rol del personaje es de Jefe?"),
        Question::new(AttributeKey::IsEnemy, "¿Tu personaje es un enemigo?"),
        Question::new(
            AttributeKey::AppearsMultipleTimes,
            "¿Tu personaje aparece múltiples veces en el juego?",
        ),
    ]
}

/// Characters known before anything is learned
pub fn seed_knowledge_base() -> KnowledgeBase {
    use crate::types::AnswerValue::{No, Yes};

    [
        ("Hornet", [Yes, No, Yes, No, Yes]),
        ("Señores Mantis", [Yes, No, Yes, Yes, No]),
        ("Zote", [Yes, No, Yes, Yes, Yes]),
        ("Último Ciervo", [No, No, No, No, Yes]),
        ("Rey Pálido", [No, No, No, No, No]),
    ]
    .into_iter()
    .map(|(name, values)| (name.to_string(), CharacterProfile::from_values(values)))
    .collect()
}
