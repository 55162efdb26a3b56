// Turn engine modules

pub mod bot;
pub mod diff;
pub mod engine;
pub mod events;
pub mod scorer;
pub mod session;
pub mod validator;

pub use bot::{BotMove, BotMoveGenerator, BotRequest, ScoredCandidate};
pub use diff::WordDiffer;
pub use engine::{MoveAttempt, TurnEngine};
pub use events::{GameEvent, ListenerId};
pub use scorer::Scorer;
pub use session::GameSession;
pub use validator::MoveValidator;
