//! Learning flow
//!
//! When the engine cannot name the character (or the player rejects its
//! guess), the player supplies the name and the round's answers become
//! that character's profile. The base is persisted immediately; a failed
//! write is reported but the session keeps the new entry in memory.

use crate::frontend::Frontend;
use crate::store::KnowledgeStore;
use crate::types::{AnswerVector, KnowledgeBase};
use anyhow::{bail, Result};
use tracing::{info, warn};

/// How the knowledge base changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Overwritten,
}

/// Result of one learning step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnOutcome {
    Learned {
        name: String,
        change: Change,
        /// False when the save failed and the entry lives only in memory
        persisted: bool,
    },
    /// Player declined to overwrite an existing character
    Declined { name: String },
}

/// Trim a player-supplied name, rejecting empty ones
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        bail!("Debes ingresar un nombre.");
    }
    Ok(name.to_string())
}

/// Store the answers verbatim as `name`'s profile
pub fn teach(base: &mut KnowledgeBase, name: &str, answers: &AnswerVector) -> Change {
    match base.insert(name.to_string(), answers.to_profile()) {
        Some(_) => Change::Overwritten,
        None => Change::Added,
    }
}

/// Drives the name prompt, overwrite confirmation and save
pub struct LearningFlow<'a> {
    store: &'a KnowledgeStore,
}

impl<'a> LearningFlow<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self { store }
    }

    pub fn run<F: Frontend + ?Sized>(
        &self,
        frontend: &mut F,
        base: &mut KnowledgeBase,
        answers: &AnswerVector,
    ) -> Result<LearnOutcome> {
        let name = loop {
            let raw = frontend.ask_name("Vaya, no acerté. ¿Cuál era tu personaje?:")?;
            match normalize_name(&raw) {
                Ok(name) => break name,
                Err(e) => frontend.show_message(&format!("Error: {}", e))?,
            }
        };

        if base.contains_key(&name) {
            let prompt = format!(
                "'{}' ya existe. ¿Deseas sobrescribir sus características con las respuestas actuales?",
                name
            );
            if !frontend.ask_confirmation(&prompt)? {
                info!("Overwrite of {} declined", name);
                frontend.show_message(&format!("No se modificó a {}.", name))?;
                return Ok(LearnOutcome::Declined { name });
            }
        }

        let change = teach(base, &name, answers);
        info!("Learned {} ({:?})", name, change);

        let persisted = match self.store.save(base) {
            Ok(()) => {
                frontend.show_message(&format!(
                    "✅ ¡He aprendido sobre {}! Gracias, lo recordaré para la próxima vez.",
                    name
                ))?;
                true
            }
            Err(e) => {
                warn!("Learned {} but could not save: {:#}", name, e);
                frontend.show_message(&format!(
                    "Error al guardar: no se pudo guardar el archivo de conocimiento:\n{:#}\n\
                     {} se recordará solo durante esta sesión.",
                    e, name
                ))?;
                false
            }
        };

        Ok(LearnOutcome::Learned {
            name,
            change,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::seed_knowledge_base;
    use crate::types::{AnswerValue, AnswerValue::*, AttributeKey, Question};
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::tempdir;

    /// Replays canned names and confirmations, recording messages
    #[derive(Default)]
    struct Scripted {
        names: VecDeque<String>,
        confirmations: VecDeque<bool>,
        messages: Vec<String>,
    }

    impl Frontend for Scripted {
        fn ask_question(&mut self, _question: &Question) -> Result<AnswerValue> {
            bail!("no questions expected")
        }

        fn ask_confirmation(&mut self, _prompt: &str) -> Result<bool> {
            self.confirmations
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("out of confirmations"))
        }

        fn ask_name(&mut self, _prompt: &str) -> Result<String> {
            self.names
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("out of names"))
        }

        fn show_message(&mut self, text: &str) -> Result<()> {
            self.messages.push(text.to_string());
            Ok(())
        }
    }

    fn scripted(names: &[&str], confirmations: &[bool]) -> Scripted {
        Scripted {
            names: names.iter().map(|s| s.to_string()).collect(),
            confirmations: confirmations.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn setup_test_store() -> (KnowledgeStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hollow_knight_data.json");
        (KnowledgeStore::new(path, seed_knowledge_base()), dir)
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Testigo \t").unwrap(), "Testigo");
        assert!(normalize_name("").is_err());
        assert!(normalize_name("   ").is_err());
    }

    #[test]
    fn test_teach_reports_change() {
        let mut base = seed_knowledge_base();
        let answers = AnswerVector::from_values([No; 5]);

        assert_eq!(teach(&mut base, "Testigo", &answers), Change::Added);
        assert_eq!(teach(&mut base, "Testigo", &answers), Change::Overwritten);
        assert_eq!(base.len(), 6);
    }

    #[test]
    fn test_learns_and_persists_new_character() {
        let (store, _dir) = setup_test_store();
        let mut base = store.load().base;
        let answers = AnswerVector::from_values([No, No, No, No, No]);
        let mut frontend = scripted(&["  Testigo  "], &[]);

        let outcome = LearningFlow::new(&store)
            .run(&mut frontend, &mut base, &answers)
            .unwrap();

        assert_eq!(
            outcome,
            LearnOutcome::Learned {
                name: "Testigo".to_string(),
                change: Change::Added,
                persisted: true
            }
        );

        let reloaded = store.load().base;
        let testigo = &reloaded["Testigo"];
        for key in AttributeKey::ALL {
            assert_eq!(testigo.get(key), No);
        }
        assert_eq!(reloaded, base);
        assert!(frontend.messages.last().unwrap().contains("Testigo"));
    }

    #[test]
    fn test_empty_name_reprompts_without_change() {
        let (store, _dir) = setup_test_store();
        let mut base = seed_knowledge_base();
        let answers = AnswerVector::from_values([Yes; 5]);
        let mut frontend = scripted(&["", "   ", "Grimm"], &[]);

        let outcome = LearningFlow::new(&store)
            .run(&mut frontend, &mut base, &answers)
            .unwrap();

        assert!(matches!(outcome, LearnOutcome::Learned { ref name, .. } if name == "Grimm"));
        let errors = frontend
            .messages
            .iter()
            .filter(|m| m.contains("Debes ingresar un nombre"))
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_existing_name_requires_confirmation() {
        let (store, _dir) = setup_test_store();
        let mut base = store.load().base;
        let answers = AnswerVector::from_values([Yes; 5]);
        let before = base.clone();

        let mut frontend = scripted(&["Zote"], &[false]);
        let outcome = LearningFlow::new(&store)
            .run(&mut frontend, &mut base, &answers)
            .unwrap();

        assert_eq!(
            outcome,
            LearnOutcome::Declined {
                name: "Zote".to_string()
            }
        );
        assert_eq!(base, before);
        assert_eq!(store.load().base, before);

        let mut frontend = scripted(&["Zote"], &[true]);
        let outcome = LearningFlow::new(&store)
            .run(&mut frontend, &mut base, &answers)
            .unwrap();

        assert!(matches!(
            outcome,
            LearnOutcome::Learned {
                change: Change::Overwritten,
                persisted: true,
                ..
            }
        ));
        assert_eq!(store.load().base["Zote"], answers.to_profile());
    }

    #[test]
    fn test_save_failure_keeps_entry_in_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.json");
        fs::create_dir_all(path.join("occupied")).unwrap();
        let store = KnowledgeStore::new(&path, seed_knowledge_base());

        let mut base = seed_knowledge_base();
        let answers = AnswerVector::from_values([Probably; 5]);
        let mut frontend = scripted(&["Quirrel"], &[]);

        let outcome = LearningFlow::new(&store)
            .run(&mut frontend, &mut base, &answers)
            .unwrap();

        assert!(matches!(outcome, LearnOutcome::Learned { persisted: false, .. }));
        assert!(base.contains_key("Quirrel"));
        assert!(frontend.messages.iter().any(|m| m.starts_with("Error al guardar")));
    }
}
