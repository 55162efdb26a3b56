use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::{BotConfig, GameConfig};
use crate::dictionary::{Dictionary, ValidateOptions, MIN_WORD_LENGTH};
use crate::error::GameError;
use crate::game::bot::{BotMove, BotMoveGenerator, BotRequest};
use crate::game::events::{GameEvent, Listener, ListenerId, ListenerRegistry};
use crate::game::{scorer::Scorer, validator::MoveValidator};
use crate::models::{
    GameState, GameStatus, Player, ScoringBreakdown, TurnAction, TurnRecord,
};
use crate::utils::letters::{
    is_alphabetic_word, normalize_letter, normalize_word, weighted_random_letter,
};

/// Length of the random seed word when none is configured
pub const INITIAL_WORD_LENGTH: usize = 4;
/// Seed word when the dictionary has nothing of `INITIAL_WORD_LENGTH`
pub const FALLBACK_INITIAL_WORD: &str = "WORD";
/// Active key letters allowed at once
pub const MAX_ACTIVE_KEY_LETTERS: usize = 1;

/// Result of checking a move without applying it
#[derive(Debug, Clone, PartialEq)]
pub struct MoveAttempt {
    /// Normalized (uppercase) word
    pub word: String,
    pub player_id: Option<String>,
    pub breakdown: ScoringBreakdown,
    pub error: Option<GameError>,
}

impl MoveAttempt {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Stable reason code when the attempt failed
    pub fn reason(&self) -> Option<&'static str> {
        self.error.as_ref().map(GameError::code)
    }
}

/// Work a bot turn needs, detached from the engine so it can run elsewhere
pub struct BotJob {
    generator: BotMoveGenerator,
    ticket: BotTicket,
    key_letters: Vec<char>,
    locked_letters: Vec<char>,
    used_words: HashSet<String>,
    rng: StdRng,
}

/// Identifies the position a bot job was computed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotTicket {
    pub player_id: String,
    pub current_word: String,
    pub turn: u32,
}

impl BotJob {
    pub fn ticket(&self) -> BotTicket {
        self.ticket.clone()
    }

    /// Run the move search. Pure with respect to the engine.
    pub fn run(mut self) -> Option<BotMove> {
        let request = BotRequest {
            current_word: &self.ticket.current_word,
            key_letters: &self.key_letters,
            locked_letters: &self.locked_letters,
            used_words: &self.used_words,
        };
        self.generator.find_best_move(request, &mut self.rng)
    }
}

/// The turn state machine: `waiting -> playing -> finished`.
///
/// Every mutation runs all of its checks before the first assignment, so a
/// rejected move or action leaves the state untouched.
pub struct TurnEngine {
    config: GameConfig,
    state: GameState,
    dictionary: Arc<dyn Dictionary>,
    bot: BotMoveGenerator,
    rng: StdRng,
    listeners: ListenerRegistry,
}

impl TurnEngine {
    pub fn new(config: GameConfig, bot_config: BotConfig, dictionary: Arc<dyn Dictionary>) -> Self {
        Self::with_rng(config, bot_config, dictionary, StdRng::from_os_rng())
    }

    /// Create an engine whose randomness comes from `rng`
    pub fn with_rng(
        config: GameConfig,
        bot_config: BotConfig,
        dictionary: Arc<dyn Dictionary>,
        mut rng: StdRng,
    ) -> Self {
        let state = Self::build_state(&config, dictionary.as_ref(), &mut rng);
        let bot = BotMoveGenerator::new(bot_config, dictionary.clone());

        Self {
            config,
            state,
            dictionary,
            bot,
            rng,
            listeners: ListenerRegistry::default(),
        }
    }

    fn build_state(
        config: &GameConfig,
        dictionary: &dyn Dictionary,
        rng: &mut StdRng,
    ) -> GameState {
        let initial_word = config
            .initial_word
            .as_deref()
            .map(normalize_word)
            .filter(|word| {
                let usable = is_alphabetic_word(word) && word.chars().count() >= MIN_WORD_LENGTH;
                if !usable {
                    tracing::warn!("Ignoring configured initial word {:?}", word);
                }
                usable
            })
            .or_else(|| dictionary.random_word_of_length(INITIAL_WORD_LENGTH, rng))
            .unwrap_or_else(|| {
                tracing::warn!(
                    "No {}-letter word available, starting from {}",
                    INITIAL_WORD_LENGTH,
                    FALLBACK_INITIAL_WORD
                );
                FALLBACK_INITIAL_WORD.to_string()
            });

        let players = config
            .player_seeds()
            .into_iter()
            .map(|seed| Player::new(seed.id, seed.name, seed.is_bot))
            .collect();

        GameState::new(initial_word, players, config.max_turns)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Borrow the live state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Snapshot copy of the state
    pub fn get_state(&self) -> GameState {
        self.state.clone()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn start_game(&mut self) -> Result<(), GameError> {
        match self.state.game_status {
            GameStatus::Waiting => {}
            GameStatus::Playing => return Err(GameError::GameAlreadyStarted),
            GameStatus::Finished => return Err(GameError::GameFinished),
        }
        if self.state.players.is_empty() {
            return Err(GameError::NoCurrentPlayer);
        }

        self.state.game_status = GameStatus::Playing;
        self.state.started_at = Some(Utc::now());
        for (index, player) in self.state.players.iter_mut().enumerate() {
            player.is_current_player = index == 0;
        }
        let seed_word = self.state.current_word.clone();
        self.state.used_words.insert(seed_word);

        if self.config.enable_key_letters && self.state.key_letters.is_empty() {
            self.generate_key_letter();
        }

        tracing::info!(
            "Game {} started with word {} and {} players",
            self.state.game_id,
            self.state.current_word,
            self.state.players.len()
        );
        self.emit(GameEvent::GameStarted);

        Ok(())
    }

    /// Check a move for the current player without changing anything
    pub fn attempt_move(&self, word: &str) -> MoveAttempt {
        let word = normalize_word(word);
        let player_id = self.state.current_player().map(|p| p.id.clone());

        match self.evaluate(&word) {
            Ok(breakdown) => MoveAttempt {
                word,
                player_id,
                breakdown,
                error: None,
            },
            Err(error) => MoveAttempt {
                word,
                player_id,
                breakdown: ScoringBreakdown::default(),
                error: Some(error),
            },
        }
    }

    /// Check a move on behalf of a specific player
    pub fn attempt_move_for(&self, player_id: &str, word: &str) -> MoveAttempt {
        let mut attempt = self.attempt_move(word);
        let turn_error = if self.state.player(player_id).is_none() {
            Some(GameError::UnknownPlayer(player_id.to_string()))
        } else if attempt.player_id.as_deref().is_some_and(|id| id != player_id) {
            Some(GameError::NotYourTurn(player_id.to_string()))
        } else {
            None
        };

        if let Some(error) = turn_error {
            attempt.player_id = Some(player_id.to_string());
            attempt.breakdown = ScoringBreakdown::default();
            attempt.error = Some(error);
        }
        attempt
    }

    /// Apply a move for the current player
    pub fn apply_move(&mut self, word: &str) -> Result<TurnRecord, GameError> {
        let attempt = self.attempt_move(word);
        self.commit(attempt)
    }

    /// Apply a previously checked attempt. It is re-checked against the
    /// current state first.
    pub fn apply_attempt(&mut self, attempt: &MoveAttempt) -> Result<TurnRecord, GameError> {
        match attempt.player_id.as_deref() {
            Some(player_id) => self.submit_move(player_id, &attempt.word),
            None => self.apply_move(&attempt.word),
        }
    }

    /// Apply a move only if `player_id` is on turn
    pub fn submit_move(&mut self, player_id: &str, word: &str) -> Result<TurnRecord, GameError> {
        let attempt = self.attempt_move_for(player_id, word);
        self.commit(attempt)
    }

    pub fn pass_turn(&mut self) -> Result<TurnRecord, GameError> {
        self.ensure_playing()?;
        let index = self
            .state
            .current_player_index()
            .ok_or(GameError::NoCurrentPlayer)?;

        let had_locks = !self.state.locked_key_letters.is_empty();
        self.state.locked_key_letters.clear();

        let record = TurnRecord {
            turn_number: self.state.current_turn,
            player_id: self.state.players[index].id.clone(),
            action: TurnAction::Pass,
            previous_word: self.state.current_word.clone(),
            new_word: self.state.current_word.clone(),
            score: 0,
            breakdown: ScoringBreakdown::default(),
            timestamp: Utc::now(),
        };
        self.state.turn_history.push(record.clone());

        tracing::info!(
            "Turn {}: {} passed on {}",
            record.turn_number,
            record.player_id,
            record.new_word
        );

        self.advance_turn(index);

        if had_locks {
            self.emit(GameEvent::LockedLettersChanged {
                locked_letters: Vec::new(),
            });
        }
        self.emit(GameEvent::TurnPassed {
            record: record.clone(),
        });
        self.emit_if_finished();

        Ok(record)
    }

    /// Let the current bot player search for and commit a move.
    ///
    /// Returns `None` when the game is not in play or the current player is
    /// human. When the bot finds nothing, or its word is rejected, the turn
    /// is passed and `None` is returned.
    pub fn make_bot_move(&mut self) -> Option<BotMove> {
        let job = self.prepare_bot_turn()?;
        let ticket = job.ticket();
        let result = job.run();
        self.finish_bot_turn(&ticket, result)
    }

    /// Snapshot what a bot turn needs. `None` unless a bot is on turn.
    pub fn prepare_bot_turn(&mut self) -> Option<BotJob> {
        if self.state.game_status != GameStatus::Playing {
            return None;
        }
        let player = self.state.current_player().filter(|p| p.is_bot)?;

        let ticket = BotTicket {
            player_id: player.id.clone(),
            current_word: self.state.current_word.clone(),
            turn: self.state.current_turn,
        };

        Some(BotJob {
            generator: self.bot.clone(),
            ticket,
            key_letters: self.active_key_letters().to_vec(),
            locked_letters: self.state.locked_key_letters.clone(),
            used_words: self.state.used_words.clone(),
            rng: StdRng::from_rng(&mut self.rng),
        })
    }

    /// Commit the outcome of a bot job through the normal move path
    pub fn finish_bot_turn(
        &mut self,
        ticket: &BotTicket,
        result: Option<BotMove>,
    ) -> Option<BotMove> {
        let still_on_turn = self.state.game_status == GameStatus::Playing
            && self.state.current_turn == ticket.turn
            && self.state.current_word == ticket.current_word
            && self
                .state
                .current_player()
                .is_some_and(|p| p.id == ticket.player_id);
        if !still_on_turn {
            tracing::warn!(
                "Discarding stale bot result for {} on turn {}",
                ticket.player_id,
                ticket.turn
            );
            return None;
        }

        let Some(bot_move) = result else {
            tracing::info!("Bot {} found no move, passing", ticket.player_id);
            self.pass_after_bot_failure();
            return None;
        };

        match self.submit_move(&ticket.player_id, &bot_move.word) {
            Ok(_) => Some(bot_move),
            Err(e) => {
                tracing::warn!(
                    "Bot move {} rejected ({}), passing",
                    bot_move.word,
                    e.code()
                );
                self.pass_after_bot_failure();
                None
            }
        }
    }

    fn pass_after_bot_failure(&mut self) {
        if let Err(e) = self.pass_turn() {
            tracing::error!("Bot could not pass its turn: {}", e);
        }
    }

    pub fn add_key_letter(&mut self, letter: char) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        if !self.config.enable_key_letters {
            return Err(GameError::FeatureDisabled("key letters"));
        }
        let letter = normalize_letter(letter).ok_or(GameError::InvalidLetter(letter))?;
        if self.state.used_key_letters.contains(&letter) {
            return Err(GameError::KeyLetterUsed(letter));
        }
        if self.state.key_letters.contains(&letter) {
            return Ok(());
        }
        if self.state.key_letters.len() >= MAX_ACTIVE_KEY_LETTERS {
            return Err(GameError::KeyLetterLimit);
        }

        self.state.key_letters.push(letter);
        self.emit(GameEvent::KeyLettersChanged {
            key_letters: self.state.key_letters.clone(),
        });
        Ok(())
    }

    /// Returns whether the letter was active
    pub fn remove_key_letter(&mut self, letter: char) -> Result<bool, GameError> {
        self.ensure_not_finished()?;
        let letter = normalize_letter(letter).ok_or(GameError::InvalidLetter(letter))?;
        let before = self.state.key_letters.len();
        self.state.key_letters.retain(|l| *l != letter);
        let removed = self.state.key_letters.len() != before;
        if removed {
            self.emit(GameEvent::KeyLettersChanged {
                key_letters: self.state.key_letters.clone(),
            });
        }
        Ok(removed)
    }

    pub fn add_locked_letter(&mut self, letter: char) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        if !self.config.enable_locked_letters {
            return Err(GameError::FeatureDisabled("locked letters"));
        }
        let letter = normalize_letter(letter).ok_or(GameError::InvalidLetter(letter))?;
        if self.state.locked_key_letters.contains(&letter) {
            return Ok(());
        }

        self.state.locked_key_letters.push(letter);
        self.emit(GameEvent::LockedLettersChanged {
            locked_letters: self.state.locked_key_letters.clone(),
        });
        Ok(())
    }

    /// Returns whether the letter was locked
    pub fn remove_locked_letter(&mut self, letter: char) -> Result<bool, GameError> {
        self.ensure_not_finished()?;
        let letter = normalize_letter(letter).ok_or(GameError::InvalidLetter(letter))?;
        let before = self.state.locked_key_letters.len();
        self.state.locked_key_letters.retain(|l| *l != letter);
        let removed = self.state.locked_key_letters.len() != before;
        if removed {
            self.emit(GameEvent::LockedLettersChanged {
                locked_letters: self.state.locked_key_letters.clone(),
            });
        }
        Ok(removed)
    }

    /// Throw the game away and start over in `waiting`.
    /// Listeners stay subscribed.
    pub fn reset_game(&mut self, config: Option<GameConfig>) {
        if let Some(config) = config {
            self.config = config;
        }
        self.state = Self::build_state(&self.config, self.dictionary.as_ref(), &mut self.rng);

        tracing::info!(
            "Game reset to {} ({} turns)",
            self.state.current_word,
            self.state.max_turns
        );
        self.emit(GameEvent::GameReset);
    }

    /// Players ordered by score, highest first
    pub fn final_scores(&self) -> Vec<Player> {
        let mut players = self.state.players.clone();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.state.game_status {
            GameStatus::Playing => Ok(()),
            GameStatus::Waiting => Err(GameError::GameNotStarted),
            GameStatus::Finished => Err(GameError::GameFinished),
        }
    }

    fn ensure_not_finished(&self) -> Result<(), GameError> {
        if self.state.game_status == GameStatus::Finished {
            return Err(GameError::GameFinished);
        }
        Ok(())
    }

    fn active_key_letters(&self) -> &[char] {
        if self.config.enable_key_letters {
            &self.state.key_letters
        } else {
            &[]
        }
    }

    /// Run every move check in order and score the result
    fn evaluate(&self, word: &str) -> Result<ScoringBreakdown, GameError> {
        self.ensure_playing()?;
        let player = self
            .state
            .current_player()
            .ok_or(GameError::NoCurrentPlayer)?;

        if self.state.is_word_used(word) {
            return Err(GameError::AlreadyPlayed(word.to_string()));
        }

        if let Some(letter) = MoveValidator::missing_locked_letter(
            &self.state.current_word,
            word,
            &self.state.locked_key_letters,
        ) {
            return Err(GameError::LockedLetterRemoved(letter));
        }

        let previous = Some(self.state.current_word.as_str());
        let options = if player.is_bot {
            ValidateOptions::bot(previous)
        } else {
            ValidateOptions::human(previous)
        };
        let validation = self.dictionary.validate(word, options);
        if let Some(reason) = validation.reason {
            return Err(GameError::InvalidWord(reason));
        }

        MoveValidator::check(&self.state.current_word, word)?;

        Ok(Scorer::calculate_score(
            &self.state.current_word,
            word,
            self.active_key_letters(),
        ))
    }

    fn commit(&mut self, attempt: MoveAttempt) -> Result<TurnRecord, GameError> {
        if let Some(error) = attempt.error {
            tracing::debug!("Rejected move {}: {}", attempt.word, error.code());
            return Err(error);
        }
        let index = self
            .state
            .current_player_index()
            .ok_or(GameError::NoCurrentPlayer)?;

        let breakdown = attempt.breakdown;
        let new_word = attempt.word;
        let previous_word = std::mem::replace(&mut self.state.current_word, new_word.clone());

        self.state.players[index].score += breakdown.total_score;
        self.state.used_words.insert(new_word.clone());

        let record = TurnRecord {
            turn_number: self.state.current_turn,
            player_id: self.state.players[index].id.clone(),
            action: TurnAction::Move,
            previous_word,
            new_word,
            score: breakdown.total_score,
            breakdown,
            timestamp: Utc::now(),
        };
        self.state.turn_history.push(record.clone());

        tracing::info!(
            "Turn {}: {} played {} -> {} for {} points",
            record.turn_number,
            record.player_id,
            record.previous_word,
            record.new_word,
            record.score
        );

        // Key letters used in the new word are still in it, so they lock
        self.state.locked_key_letters.clear();
        if self.config.enable_locked_letters {
            self.state.locked_key_letters = self
                .state
                .key_letters
                .iter()
                .copied()
                .filter(|letter| record.breakdown.key_letters_used.contains(letter))
                .collect();
        }

        if self.config.enable_key_letters {
            let retired: Vec<char> = self.state.key_letters.drain(..).collect();
            self.state.used_key_letters.extend(retired);
            self.generate_key_letter();
        }

        self.advance_turn(index);

        self.emit(GameEvent::MoveApplied {
            record: record.clone(),
        });
        self.emit(GameEvent::LockedLettersChanged {
            locked_letters: self.state.locked_key_letters.clone(),
        });
        if self.config.enable_key_letters {
            self.emit(GameEvent::KeyLettersChanged {
                key_letters: self.state.key_letters.clone(),
            });
        }
        self.emit_if_finished();

        Ok(record)
    }

    /// Add one fresh key letter that has never been used this game and is
    /// not in the current word. Leaves none active when nothing qualifies.
    fn generate_key_letter(&mut self) {
        let used = &self.state.used_key_letters;
        let active = &self.state.key_letters;
        let word = &self.state.current_word;
        let letter = weighted_random_letter(&mut self.rng, |ch| {
            !used.contains(&ch) && !active.contains(&ch) && !word.contains(ch)
        });

        match letter {
            Some(letter) => {
                tracing::debug!("New key letter {}", letter);
                self.state.key_letters.push(letter);
            }
            None => tracing::info!("No eligible key letters remain"),
        }
    }

    /// Hand the turn to the next player and finish the game after the last turn
    fn advance_turn(&mut self, index: usize) {
        let players = &mut self.state.players;
        players[index].is_current_player = false;
        let next = (index + 1) % players.len();
        players[next].is_current_player = true;

        self.state.current_turn += 1;
        if self.state.current_turn > self.state.max_turns {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state.game_status = GameStatus::Finished;
        self.state.finished_at = Some(Utc::now());
        for player in &mut self.state.players {
            player.is_current_player = false;
        }
        self.state.winner = Self::compute_winner(&self.state.players);

        tracing::info!(
            "Game {} finished, winner: {}",
            self.state.game_id,
            self.state.winner.as_deref().unwrap_or("tie")
        );
    }

    /// The player with a strictly higher score than everyone else
    fn compute_winner(players: &[Player]) -> Option<String> {
        let best = players.iter().map(|p| p.score).max()?;
        let mut leaders = players.iter().filter(|p| p.score == best);
        let leader = leaders.next()?;
        if leaders.next().is_some() {
            return None;
        }
        Some(leader.id.clone())
    }

    fn emit_if_finished(&self) {
        if self.state.game_status == GameStatus::Finished {
            self.emit(GameEvent::GameFinished {
                winner: self.state.winner.clone(),
            });
        }
    }

    fn emit(&self, event: GameEvent) {
        self.listeners.notify(&event, &self.state);
    }
}
