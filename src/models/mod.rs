pub mod game;
pub mod turn;

pub use game::{GameState, GameStatus, Player};
pub use turn::{ScoringBreakdown, TurnAction, TurnRecord, WordDiff};
