//! Turn engine for a two-player word transformation game.
//!
//! Players take turns changing a shared word by adding one letter, removing
//! one letter, rearranging, or any mix of those, and score a point for each
//! kind of change plus one for using the rotating key letter. A greedy bot
//! can take either seat.
//!
//! The dictionary is injected through the [`dictionary::Dictionary`] trait;
//! [`dictionary::WordList`] is a ready-made in-memory implementation.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod game;
pub mod models;
pub mod utils;

pub use config::{BotConfig, Config, GameConfig, PlayerSeed};
pub use dictionary::{Dictionary, ValidateOptions, ValidationResult, WordList};
pub use error::{GameError, ValidationReason};
pub use game::{GameEvent, GameSession, MoveAttempt, TurnEngine};
pub use models::{GameState, GameStatus, Player, ScoringBreakdown, TurnRecord, WordDiff};
