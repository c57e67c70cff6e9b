//! hallownest-guess - "¿Quién soy?" for the cast of Hollow Knight
//!
//! The player thinks of a character and answers five questions with
//! Si / No / No lo se / Probablemente. The engine either deduces who it is
//! from a small knowledge base or asks for the name and remembers the
//! answers for next time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hallownest_guess::{ConsoleFrontend, Game, GameConfig, KnowledgeStore};
//!
//! let config = GameConfig::default();
//! let store = KnowledgeStore::new(&config.data_path, config.seed.clone());
//! let frontend = ConsoleFrontend::new(stdin.lock(), stdout, config.input_mode);
//!
//! let mut game = Game::new(&config, &store, frontend)?;
//! game.run()?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  questions/answers  ┌──────────────┐
//! │   Frontend   │ ◄─────────────────► │     Game     │
//! └──────────────┘                     └──────┬───────┘
//!                                             │
//!                ┌────────────────────────────┼────────────────┐
//!                ▼                            ▼                ▼
//!        ┌──────────────┐            ┌──────────────┐  ┌──────────────┐
//!        │ MatchEngine  │            │ LearningFlow │─►│KnowledgeStore│
//!        └──────────────┘            └──────────────┘  └──────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod frontend;
pub mod game;
pub mod learning;
pub mod store;
pub mod types;

pub use config::{GameConfig, InputMode, MatchPolicy};
pub use engine::{rank, similarity, AnswerEffect, MatchEngine, ScoredCandidate, Session, Verdict};
pub use frontend::{ConsoleFrontend, Frontend, InputClosed};
pub use game::{Game, RoundOutcome};
pub use learning::{Change, LearnOutcome, LearningFlow};
pub use store::{KnowledgeStore, LoadOrigin, Loaded};
pub use types::*;
