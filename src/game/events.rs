use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::models::{GameState, TurnRecord};

/// State changes broadcast to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted,
    MoveApplied { record: TurnRecord },
    TurnPassed { record: TurnRecord },
    KeyLettersChanged { key_letters: Vec<char> },
    LockedLettersChanged { locked_letters: Vec<char> },
    GameFinished { winner: Option<String> },
    GameReset,
}

pub type Listener = Box<dyn Fn(&GameEvent, &GameState) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of listeners.
///
/// Delivery is synchronous. A panicking listener is logged and skipped; it
/// never reaches the caller and never stops later listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn notify(&self, event: &GameEvent, state: &GameState) {
        for (id, listener) in &self.listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event, state))).is_err() {
                tracing::error!("Listener {:?} panicked while handling {:?}", id, event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Player;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn state() -> GameState {
        GameState::new("CAT".to_string(), vec![Player::new("p1", "P1", false)], 5)
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let mut registry = ListenerRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));

        registry.subscribe(Box::new(|_, _| panic!("listener failure")));
        let counter = calls.clone();
        registry.subscribe(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(&GameEvent::GameStarted, &state());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ListenerRegistry::default();
        let counter = calls.clone();
        let id = registry.subscribe(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(&GameEvent::GameStarted, &state());
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.notify(&GameEvent::GameReset, &state());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
