use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Multiset difference between two words
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiff {
    /// Letters gained, one entry per extra occurrence, alphabetical
    pub added_letters: Vec<char>,
    /// Letters lost, one entry per missing occurrence, alphabetical
    pub removed_letters: Vec<char>,
    /// Same letters, different order
    pub is_rearranged: bool,
    /// Letters of the new word that are active key letters
    pub key_letters_used: BTreeSet<char>,
}

impl WordDiff {
    /// True when neither letters were added nor removed
    pub fn is_same_letters(&self) -> bool {
        self.added_letters.is_empty() && self.removed_letters.is_empty()
    }
}

/// Points awarded for a single move
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringBreakdown {
    pub add_points: u32,
    pub remove_points: u32,
    pub rearrange_points: u32,
    pub key_letter_points: u32,
    pub total_score: u32,
    pub key_letters_used: BTreeSet<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnAction {
    Move,
    Pass,
}

/// Append-only log entry, one per committed move or pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub player_id: String,
    pub action: TurnAction,
    pub previous_word: String,
    pub new_word: String,
    pub score: u32,
    pub breakdown: ScoringBreakdown,
    pub timestamp: DateTime<Utc>,
}
