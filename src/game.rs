//! Game loop
//!
//! One round asks every configured question, lets the engine decide, and
//! either celebrates a confirmed guess or hands over to the learning flow.

use crate::config::GameConfig;
use crate::engine::{AnswerEffect, MatchEngine, ScoredCandidate, Verdict};
use crate::frontend::Frontend;
use crate::learning::{LearnOutcome, LearningFlow};
use crate::store::KnowledgeStore;
use crate::types::{AnswerVector, KnowledgeBase};
use anyhow::Result;
use tracing::{debug, info};

/// How many runner-up characters to show when no guess is confident
const SHOWN_OPTIONS: usize = 3;

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The player confirmed the engine's answer
    Guessed { name: String },
    Learned(LearnOutcome),
}

pub struct Game<'a, F: Frontend> {
    config: &'a GameConfig,
    store: &'a KnowledgeStore,
    engine: MatchEngine,
    frontend: F,
    base: KnowledgeBase,
}

impl<'a, F: Frontend> Game<'a, F> {
    /// Load the knowledge base and surface any load warning
    pub fn new(config: &'a GameConfig, store: &'a KnowledgeStore, mut frontend: F) -> Result<Self> {
        let loaded = store.load();
        if let Some(warning) = loaded.warning() {
            frontend.show_message(&format!("⚠️ {}", warning))?;
        }
        info!(
            "Starting with {} characters ({:?})",
            loaded.base.len(),
            loaded.origin
        );

        Ok(Self {
            config,
            store,
            engine: MatchEngine::from_config(config),
            frontend,
            base: loaded.base,
        })
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.base
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Play rounds until the player declines another one
    pub fn run(&mut self) -> Result<Vec<RoundOutcome>> {
        self.frontend.show_message(
            "🎮 Bienvenido a '¿Quién soy? - Hollow Knight Edition'\n\
             Piensa en un personaje de Hollow Knight. Yo intentaré adivinarlo.",
        )?;

        let mut outcomes = Vec::new();
        loop {
            outcomes.push(self.play_round()?);
            if !self.frontend.ask_confirmation("¿Quieres jugar de nuevo?")? {
                break;
            }
        }

        self.frontend.show_message("Fin del juego. 🦋")?;
        Ok(outcomes)
    }

    pub fn play_round(&mut self) -> Result<RoundOutcome> {
        let (answers, verdict) = self.ask_questions()?;
        debug!("Verdict: {:?}", verdict);

        if let Some(name) = verdict.candidate() {
            let name = name.to_string();
            self.reveal_pause()?;

            let prompt = match &verdict {
                Verdict::Deduced { .. } => format!("¡Lo tengo! Tu personaje es: {}. ¿Acerté?", name),
                _ => format!("Creo que tu personaje es {}. ¿Acerté?", name),
            };
            if self.frontend.ask_confirmation(&prompt)? {
                self.frontend.show_message("¡Genial! ¡He acertado! 😄")?;
                info!("Guessed {}", name);
                return Ok(RoundOutcome::Guessed { name });
            }
        } else if let Verdict::Unknown { ranking } = &verdict {
            self.frontend
                .show_message("No estoy seguro de quién es tu personaje 😕")?;
            if !ranking.is_empty() {
                self.frontend.show_message(&format_options(ranking))?;
            }
        }

        let outcome = LearningFlow::new(self.store).run(&mut self.frontend, &mut self.base, &answers)?;
        Ok(RoundOutcome::Learned(outcome))
    }

    /// Ask every question in order, eliminating as answers arrive
    ///
    /// All questions are asked even after the candidate set runs dry, so a
    /// full profile is available for learning.
    fn ask_questions(&mut self) -> Result<(AnswerVector, Verdict)> {
        let mut session = self.engine.start(&self.base, self.config.questions.len());

        for question in &self.config.questions {
            let answer = self.frontend.ask_question(question)?;
            if let AnswerEffect::Exhausted(_) = session.record(question.key, answer) {
                self.frontend.show_message(
                    "¡Personaje nuevo! No conozco ese personaje. \
                     Déjame terminar las preguntas para aprender.",
                )?;
            }
        }

        Ok((session.answers().clone(), session.conclude()))
    }

    fn reveal_pause(&mut self) -> Result<()> {
        if !self.config.reveal_delay.is_zero() {
            self.frontend.show_message("\n🤔 Estoy pensando...")?;
            std::thread::sleep(self.config.reveal_delay);
        }
        Ok(())
    }
}

/// "Mis mejores opciones eran" line with the top candidates
pub fn format_options(ranking: &[ScoredCandidate]) -> String {
    let options: Vec<String> = ranking
        .iter()
        .take(SHOWN_OPTIONS)
        .map(|c| format!("{} ({:.0}%)", c.name, c.score * 100.0))
        .collect();
    format!("Mis mejores opciones eran: {}", options.join(", "))
}
