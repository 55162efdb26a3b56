use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::Mutex;

use crate::game::bot::BotMove;
use crate::game::engine::TurnEngine;
use crate::models::GameState;

/// A shareable handle to one game.
///
/// The bot search runs on the blocking pool without holding the engine
/// lock. Only one bot search may be in flight per session; a second call
/// while one is running returns `None` immediately.
#[derive(Clone)]
pub struct GameSession {
    engine: Arc<Mutex<TurnEngine>>,
    bot_in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag however the bot turn ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GameSession {
    pub fn new(engine: TurnEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            bot_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run `f` with exclusive access to the engine
    pub async fn with_engine<R>(&self, f: impl FnOnce(&mut TurnEngine) -> R) -> R {
        let mut engine = self.engine.lock().await;
        f(&mut engine)
    }

    /// Snapshot copy of the state
    pub async fn state(&self) -> GameState {
        self.engine.lock().await.get_state()
    }

    pub fn is_bot_thinking(&self) -> bool {
        self.bot_in_flight.load(Ordering::Acquire)
    }

    /// Let the bot on turn play, committing through the normal move path.
    ///
    /// `None` when no bot is on turn, when another bot search is running, or
    /// when the bot had to pass.
    pub async fn make_bot_move(&self) -> Option<BotMove> {
        if self
            .bot_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Bot move already in flight, ignoring request");
            return None;
        }
        let _guard = InFlightGuard(&self.bot_in_flight);

        let job = self.engine.lock().await.prepare_bot_turn()?;
        let ticket = job.ticket();

        let result = match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Bot move search failed: {}", e);
                None
            }
        };

        self.engine.lock().await.finish_bot_turn(&ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BotConfig, GameConfig};
    use crate::dictionary::WordList;
    use crate::models::TurnAction;
    use rand::{rngs::StdRng, SeedableRng};

    fn session() -> GameSession {
        let dictionary = Arc::new(WordList::from_words([
            "cat", "cats", "cast", "acts", "scat", "coat",
        ]));
        let engine = TurnEngine::with_rng(
            GameConfig {
                initial_word: Some("CAT".to_string()),
                ..GameConfig::default()
            },
            BotConfig::default(),
            dictionary,
            StdRng::seed_from_u64(8),
        );
        GameSession::new(engine)
    }

    #[tokio::test]
    async fn test_bot_move_after_human() {
        let session = session();
        session
            .with_engine(|engine| {
                engine.start_game()?;
                engine.apply_move("CATS").map(|_| ())
            })
            .await
            .unwrap();

        let bot_move = session.make_bot_move().await.unwrap();
        let state = session.state().await;
        assert_eq!(state.current_word, bot_move.word);
        assert_eq!(state.turn_history.len(), 2);
        assert_eq!(state.turn_history[1].action, TurnAction::Move);
        assert!(!session.is_bot_thinking());
    }

    #[tokio::test]
    async fn test_no_bot_move_on_human_turn() {
        let session = session();
        session
            .with_engine(|engine| engine.start_game())
            .await
            .unwrap();

        assert!(session.make_bot_move().await.is_none());
        assert!(session.state().await.turn_history.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_bot_moves_commit_once() {
        let session = session();
        session
            .with_engine(|engine| {
                engine.start_game()?;
                engine.apply_move("CATS").map(|_| ())
            })
            .await
            .unwrap();

        let (first, second) = tokio::join!(session.make_bot_move(), session.make_bot_move());
        assert_eq!(
            usize::from(first.is_some()) + usize::from(second.is_some()),
            1
        );
        assert_eq!(session.state().await.turn_history.len(), 2);
    }

    #[test]
    fn test_session_usable_from_sync_code() {
        let session = session();
        let state = tokio_test::block_on(session.state());
        assert_eq!(state.current_word, "CAT");
    }
}
