use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::turn::TurnRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub is_bot: bool,
    pub score: u32,
    pub is_current_player: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot,
            score: 0,
            is_current_player: false,
        }
    }
}

/// Complete state of one game.
///
/// Mutated only by `TurnEngine`; everything handed out is a clone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: Uuid,
    pub current_word: String,
    pub players: Vec<Player>,
    /// At most one letter during play
    pub key_letters: Vec<char>,
    /// Key letters retired for the rest of the game
    pub used_key_letters: BTreeSet<char>,
    /// Letters the next committed word must keep
    pub locked_key_letters: Vec<char>,
    pub used_words: HashSet<String>,
    pub turn_history: Vec<TurnRecord>,
    pub current_turn: u32,
    pub max_turns: u32,
    pub game_status: GameStatus,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameState {
    pub fn new(initial_word: String, players: Vec<Player>, max_turns: u32) -> Self {
        Self {
            game_id: Uuid::new_v4(),
            current_word: initial_word,
            players,
            key_letters: Vec::new(),
            used_key_letters: BTreeSet::new(),
            locked_key_letters: Vec::new(),
            used_words: HashSet::new(),
            turn_history: Vec::new(),
            current_turn: 1,
            max_turns,
            game_status: GameStatus::Waiting,
            winner: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_current_player)
    }

    pub fn current_player_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_current_player)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_word_used(&self, word: &str) -> bool {
        self.used_words.contains(word)
    }
}
