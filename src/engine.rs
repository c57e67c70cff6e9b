//! Match engine
//!
//! Two policies narrow the knowledge base down to a guess:
//!
//! - **Eliminate**: every definite answer removes candidates whose stored
//!   value is definite and different. Whatever survives the last question
//!   is either deduced (one left), scored (several left) or unknown (none).
//! - **ScoreAll**: nothing is removed; once every question is answered,
//!   each character gets a similarity score and the best one is offered if
//!   it clears the confidence threshold.
//!
//! Similarity counts an exact attribute match as 1 and a hedged answer
//! (Unsure/Probably) that does not match exactly as 0.5, divided by the
//! number of answered attributes.

use crate::config::{GameConfig, MatchPolicy};
use crate::types::{AnswerValue, AnswerVector, AttributeKey, CharacterProfile, KnowledgeBase};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

/// Credit given to a hedged answer that does not match exactly
pub const HEDGE_CREDIT: f64 = 0.5;

/// A candidate with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub name: String,
    pub score: f64,
}

/// What the engine concluded at the end of a round
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Exactly one candidate survived elimination
    Deduced { name: String },
    /// Best scored candidate, at or above the confidence threshold
    Guess { name: String, score: f64 },
    /// No confident candidate; best options first (possibly empty)
    Unknown { ranking: Vec<ScoredCandidate> },
}

impl Verdict {
    /// Name to confirm with the player, if any
    pub fn candidate(&self) -> Option<&str> {
        match self {
            Verdict::Deduced { name } | Verdict::Guess { name, .. } => Some(name),
            Verdict::Unknown { .. } => None,
        }
    }
}

/// Result of recording one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerEffect {
    /// Candidates removed by this answer, in name order
    Eliminated(Vec<String>),
    /// This answer emptied the candidate set for the first time
    Exhausted(Vec<String>),
    /// Nothing removed
    Kept,
}

/// Similarity between the collected answers and one stored profile
pub fn similarity(answers: &AnswerVector, profile: &CharacterProfile) -> f64 {
    let answered = answers.answered();
    if answered == 0 {
        return 0.0;
    }

    let matches: f64 = answers
        .iter()
        .map(|(key, answer)| {
            if profile.get(key) == answer {
                1.0
            } else if answer.is_hedge() {
                HEDGE_CREDIT
            } else {
                0.0
            }
        })
        .sum();

    matches / answered as f64
}

/// Score the named candidates, best first
///
/// Ties keep name order, so the first-encountered character wins.
pub fn rank<'a>(
    answers: &AnswerVector,
    base: &KnowledgeBase,
    names: impl IntoIterator<Item = &'a String>,
) -> Vec<ScoredCandidate> {
    let mut ranking: Vec<ScoredCandidate> = names
        .into_iter()
        .filter_map(|name| {
            base.get(name).map(|profile| ScoredCandidate {
                name: name.clone(),
                score: similarity(answers, profile),
            })
        })
        .collect();

    // Stable sort keeps name order among equal scores
    ranking.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranking
}

/// True if a stored value rules the candidate out for a definite answer
fn contradicts(stored: AnswerValue, answer: AnswerValue) -> bool {
    answer.is_definite() && stored.is_definite() && stored != answer
}

/// Stateless matcher configured with a policy and threshold
#[derive(Debug, Clone)]
pub struct MatchEngine {
    policy: MatchPolicy,
    threshold: f64,
}

impl MatchEngine {
    pub fn new(policy: MatchPolicy, threshold: f64) -> Self {
        Self { policy, threshold }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.policy, config.confidence_threshold)
    }

    /// Begin a round against the current knowledge base
    pub fn start<'a>(&self, base: &'a KnowledgeBase, total_questions: usize) -> Session<'a> {
        Session {
            policy: self.policy,
            threshold: self.threshold,
            base,
            candidates: base.keys().cloned().collect(),
            eliminated: BTreeSet::new(),
            answers: AnswerVector::new(),
            total_questions,
            failed: false,
        }
    }
}

/// State of one round: collected answers and surviving candidates
#[derive(Debug)]
pub struct Session<'a> {
    policy: MatchPolicy,
    threshold: f64,
    base: &'a KnowledgeBase,
    candidates: BTreeSet<String>,
    eliminated: BTreeSet<String>,
    answers: AnswerVector,
    total_questions: usize,
    failed: bool,
}

impl<'a> Session<'a> {
    /// Record an answer and apply elimination when the policy calls for it
    pub fn record(&mut self, key: AttributeKey, answer: AnswerValue) -> AnswerEffect {
        self.answers.record(key, answer);

        if self.policy != MatchPolicy::Eliminate || !answer.is_definite() || self.failed {
            return AnswerEffect::Kept;
        }

        let base = self.base;
        let removed: Vec<String> = self
            .candidates
            .iter()
            .filter(|name| {
                base.get(*name)
                    .map(|profile| contradicts(profile.get(key), answer))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        for name in &removed {
            self.candidates.remove(name);
            self.eliminated.insert(name.clone());
        }

        if !removed.is_empty() {
            debug!(
                "{} = {} eliminated {:?}, {} left",
                key,
                answer,
                removed,
                self.candidates.len()
            );
        }

        if self.candidates.is_empty() {
            self.failed = true;
            return AnswerEffect::Exhausted(removed);
        }

        if removed.is_empty() {
            AnswerEffect::Kept
        } else {
            AnswerEffect::Eliminated(removed)
        }
    }

    /// Surviving candidates, in name order
    pub fn candidates(&self) -> impl Iterator<Item = &String> {
        self.candidates.iter()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_eliminated(&self, name: &str) -> bool {
        self.eliminated.contains(name)
    }

    /// Elimination emptied the candidate set at some point
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn answers(&self) -> &AnswerVector {
        &self.answers
    }

    /// Every question has been answered
    pub fn is_complete(&self) -> bool {
        self.answers.answered() >= self.total_questions
    }

    /// Decide once all questions are answered
    pub fn conclude(&self) -> Verdict {
        match self.policy {
            MatchPolicy::ScoreAll => self.score(self.base.keys()),
            MatchPolicy::Eliminate => {
                if self.failed || self.candidates.is_empty() {
                    return Verdict::Unknown {
                        ranking: rank(&self.answers, self.base, self.base.keys()),
                    };
                }
                if self.candidates.len() == 1 {
                    if let Some(name) = self.candidates.iter().next() {
                        return Verdict::Deduced { name: name.clone() };
                    }
                }
                self.score(self.candidates.iter())
            }
        }
    }

    fn score<'b>(&self, names: impl IntoIterator<Item = &'b String>) -> Verdict {
        let ranking = rank(&self.answers, self.base, names);

        match ranking.first() {
            Some(best) if best.score >= self.threshold => Verdict::Guess {
                name: best.name.clone(),
                score: best.score,
            },
            _ => Verdict::Unknown { ranking },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::seed_knowledge_base;
    use crate::types::AnswerValue::*;

    fn play(engine: &MatchEngine, base: &KnowledgeBase, values: [AnswerValue; 5]) -> Verdict {
        let mut session = engine.start(base, AttributeKey::ALL.len());
        for (key, value) in AttributeKey::ALL.into_iter().zip(values) {
            session.record(key, value);
        }
        assert!(session.is_complete());
        session.conclude()
    }

    #[test]
    fn test_identical_answers_score_one() {
        let seed = seed_knowledge_base();
        for profile in seed.values() {
            let values: Vec<AnswerValue> =
                AttributeKey::ALL.iter().map(|k| profile.get(*k)).collect();
            let mut answers = AnswerVector::new();
            for (key, value) in AttributeKey::ALL.into_iter().zip(values) {
                answers.record(key, value);
            }
            assert_eq!(similarity(&answers, profile), 1.0);
        }
    }

    #[test]
    fn test_hedge_counts_half_when_not_equal() {
        let profile = CharacterProfile::from_values([Yes, No, Yes, No, Yes]);

        for hedge in [Unsure, Probably] {
            let mut answers = AnswerVector::new();
            answers.record(AttributeKey::IsBoss, hedge);
            assert_eq!(similarity(&answers, &profile), 0.5);
        }

        let answers = AnswerVector::from_values([Unsure, Probably, Unsure, Probably, Unsure]);
        assert_eq!(similarity(&answers, &profile), 0.5);
    }

    #[test]
    fn test_mismatch_scores_zero_and_missing_reads_unsure() {
        let profile = CharacterProfile::from_values([Yes, Yes, Yes, Yes, Yes]);
        let answers = AnswerVector::from_values([No, No, No, No, No]);
        assert_eq!(similarity(&answers, &profile), 0.0);

        // Missing key compares as Unsure: exact match for an Unsure answer
        let mut partial = CharacterProfile::new();
        partial.set(AttributeKey::IsBoss, Yes);
        let mut answers = AnswerVector::new();
        answers.record(AttributeKey::IsBoss, Yes);
        answers.record(AttributeKey::IsEnemy, Unsure);
        assert_eq!(similarity(&answers, &partial), 1.0);
        assert_eq!(partial.len(), 1);
    }

    #[test]
    fn test_empty_answers_score_zero() {
        let profile = CharacterProfile::from_values([Yes, No, Yes, No, Yes]);
        assert_eq!(similarity(&AnswerVector::new(), &profile), 0.0);
    }

    #[test]
    fn test_hornet_scenario_score_all() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::ScoreAll, 0.8);

        let answers = AnswerVector::from_values([Yes, No, Yes, No, Yes]);
        assert_eq!(similarity(&answers, &seed["Hornet"]), 1.0);

        let verdict = play(&engine, &seed, [Yes, No, Yes, No, Yes]);
        assert_eq!(
            verdict,
            Verdict::Guess {
                name: "Hornet".to_string(),
                score: 1.0
            }
        );
    }

    #[test]
    fn test_hornet_scenario_elimination_deduces() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);

        let verdict = play(&engine, &seed, [Yes, No, Yes, No, Yes]);
        assert_eq!(
            verdict,
            Verdict::Deduced {
                name: "Hornet".to_string()
            }
        );
    }

    #[test]
    fn test_score_all_below_threshold_is_unknown() {
        let mut seed = seed_knowledge_base();
        seed.remove("Rey Pálido");
        let engine = MatchEngine::new(MatchPolicy::ScoreAll, 0.9);

        match play(&engine, &seed, [No, No, No, No, No]) {
            Verdict::Unknown { ranking } => {
                assert_eq!(ranking.len(), 4);
                assert_eq!(ranking[0].name, "Último Ciervo");
                assert_eq!(ranking[0].score, 0.8);
                assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
            }
            other => panic!("expected Unknown, got {:?}", other),
        }

        // Exactly at the threshold is confident enough
        let lenient = MatchEngine::new(MatchPolicy::ScoreAll, 0.8);
        assert_eq!(
            play(&lenient, &seed, [No, No, No, No, No]).candidate(),
            Some("Último Ciervo")
        );
    }

    #[test]
    fn test_tie_break_first_name_wins() {
        let mut base = KnowledgeBase::new();
        base.insert("Zote".to_string(), CharacterProfile::from_values([Yes; 5]));
        base.insert("Hornet".to_string(), CharacterProfile::from_values([Yes; 5]));
        let engine = MatchEngine::new(MatchPolicy::ScoreAll, 0.5);

        assert_eq!(
            play(&engine, &base, [Yes; 5]).candidate(),
            Some("Hornet")
        );
    }

    #[test]
    fn test_elimination_removes_only_definite_contradictions() {
        let mut base = KnowledgeBase::new();
        base.insert("Definite".to_string(), CharacterProfile::from_values([Yes; 5]));
        base.insert(
            "Hedged".to_string(),
            CharacterProfile::from_values([Probably, Unsure, Yes, Yes, Yes]),
        );
        base.insert("Partial".to_string(), CharacterProfile::new());

        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);
        let mut session = engine.start(&base, 5);

        let effect = session.record(AttributeKey::WeaponIsStinger, No);
        assert_eq!(effect, AnswerEffect::Eliminated(vec!["Definite".to_string()]));
        assert_eq!(session.candidate_count(), 2);

        // Hedged answers never eliminate
        assert_eq!(session.record(AttributeKey::WeaponIsInfection, Unsure), AnswerEffect::Kept);
        assert_eq!(session.record(AttributeKey::IsBoss, Probably), AnswerEffect::Kept);
        assert_eq!(session.candidate_count(), 2);
    }

    #[test]
    fn test_eliminated_never_reappears() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);
        let mut session = engine.start(&seed, 5);

        session.record(AttributeKey::WeaponIsStinger, No);
        assert!(session.is_eliminated("Hornet"));

        // Later answers that Hornet would match do not bring it back
        session.record(AttributeKey::WeaponIsInfection, No);
        session.record(AttributeKey::IsBoss, Yes);
        session.record(AttributeKey::IsEnemy, No);
        session.record(AttributeKey::AppearsMultipleTimes, Yes);

        assert!(session.candidates().all(|n| n != "Hornet"));
        assert_ne!(session.conclude().candidate(), Some("Hornet"));
    }

    #[test]
    fn test_single_survivor_does_not_end_session_early() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);
        let mut session = engine.start(&seed, 5);

        session.record(AttributeKey::WeaponIsStinger, Yes);
        session.record(AttributeKey::WeaponIsInfection, No);
        session.record(AttributeKey::IsBoss, Yes);
        session.record(AttributeKey::IsEnemy, No);

        assert_eq!(session.candidate_count(), 1);
        assert!(!session.is_complete());

        session.record(AttributeKey::AppearsMultipleTimes, Yes);
        assert!(session.is_complete());
        assert_eq!(
            session.conclude(),
            Verdict::Deduced {
                name: "Hornet".to_string()
            }
        );
    }

    #[test]
    fn test_exhaustion_is_reported_once_and_routes_to_unknown() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);
        let mut session = engine.start(&seed, 5);

        assert!(matches!(
            session.record(AttributeKey::WeaponIsInfection, Yes),
            AnswerEffect::Exhausted(_)
        ));
        assert!(session.failed());

        // Remaining answers are still collected
        assert_eq!(session.record(AttributeKey::WeaponIsStinger, Yes), AnswerEffect::Kept);
        session.record(AttributeKey::IsBoss, Yes);
        session.record(AttributeKey::IsEnemy, No);
        session.record(AttributeKey::AppearsMultipleTimes, Yes);

        assert_eq!(session.answers().answered(), 5);
        assert!(matches!(session.conclude(), Verdict::Unknown { .. }));
    }

    #[test]
    fn test_multiple_survivors_fall_back_to_scoring() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.5);

        // Zote and Hornet differ only on es_enemigo, which stays hedged
        let verdict = play(&engine, &seed, [Yes, No, Yes, Probably, Yes]);
        match verdict {
            Verdict::Guess { name, score } => {
                assert_eq!(name, "Hornet");
                assert_eq!(score, 0.9);
            }
            other => panic!("expected Guess, got {:?}", other),
        }
    }

    #[test]
    fn test_survivor_scoring_respects_threshold() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::Eliminate, 0.95);

        let verdict = play(&engine, &seed, [Yes, No, Yes, Probably, Yes]);
        assert!(matches!(verdict, Verdict::Unknown { .. }));
    }

    #[test]
    fn test_empty_base_is_unknown() {
        let base = KnowledgeBase::new();
        for policy in [MatchPolicy::Eliminate, MatchPolicy::ScoreAll] {
            let engine = MatchEngine::new(policy, 0.5);
            assert_eq!(
                play(&engine, &base, [Yes; 5]),
                Verdict::Unknown { ranking: vec![] }
            );
        }
    }

    #[test]
    fn test_score_all_never_eliminates() {
        let seed = seed_knowledge_base();
        let engine = MatchEngine::new(MatchPolicy::ScoreAll, 0.8);
        let mut session = engine.start(&seed, 5);

        assert_eq!(session.record(AttributeKey::WeaponIsInfection, Yes), AnswerEffect::Kept);
        assert_eq!(session.candidate_count(), seed.len());
    }
}
