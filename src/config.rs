use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default number of turns before the game ends
pub const DEFAULT_MAX_TURNS: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dictionary_path: String,
    pub game: GameConfig,
    pub bot: BotConfig,
    /// Seed for all game randomness; random when unset
    pub rng_seed: Option<u64>,
}

/// A player to seat at game construction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_turns: u32,
    /// Seed word; a random 4-letter dictionary word when unset
    pub initial_word: Option<String>,
    /// Seat a bot as the second player when `players` is unset
    pub allow_bot_player: bool,
    pub enable_key_letters: bool,
    pub enable_locked_letters: bool,
    /// Explicit seating; overrides `allow_bot_player`
    pub players: Option<Vec<PlayerSeed>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            initial_word: None,
            allow_bot_player: true,
            enable_key_letters: true,
            enable_locked_letters: true,
            players: None,
        }
    }
}

impl GameConfig {
    /// Players to seat, in turn order
    pub fn player_seeds(&self) -> Vec<PlayerSeed> {
        if let Some(players) = &self.players {
            return players.clone();
        }

        let second = if self.allow_bot_player {
            PlayerSeed {
                id: "bot".to_string(),
                name: "Bot".to_string(),
                is_bot: true,
            }
        } else {
            PlayerSeed {
                id: "player2".to_string(),
                name: "Player 2".to_string(),
                is_bot: false,
            }
        };

        vec![
            PlayerSeed {
                id: "player1".to_string(),
                name: "Player 1".to_string(),
                is_bot: false,
            },
            second,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Candidates kept for scoring after dictionary filtering
    pub max_candidates: usize,
    /// Distinct random permutations tried per turn
    pub max_rearrangements: usize,
    /// Soft wall-clock budget for one move search
    pub time_budget: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_candidates: 2000,
            max_rearrangements: 50,
            time_budget: Duration::from_secs(2),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = GameConfig::default();
        let game = GameConfig {
            max_turns: parse_var("MAX_TURNS")?.unwrap_or(defaults.max_turns),
            initial_word: env::var("INITIAL_WORD")
                .ok()
                .filter(|word| !word.trim().is_empty()),
            allow_bot_player: parse_var("ALLOW_BOT_PLAYER")?
                .unwrap_or(defaults.allow_bot_player),
            enable_key_letters: parse_var("ENABLE_KEY_LETTERS")?
                .unwrap_or(defaults.enable_key_letters),
            enable_locked_letters: parse_var("ENABLE_LOCKED_LETTERS")?
                .unwrap_or(defaults.enable_locked_letters),
            players: None,
        };

        let bot_defaults = BotConfig::default();
        let bot = BotConfig {
            max_candidates: parse_var("BOT_MAX_CANDIDATES")?
                .unwrap_or(bot_defaults.max_candidates),
            max_rearrangements: parse_var("BOT_MAX_REARRANGEMENTS")?
                .unwrap_or(bot_defaults.max_rearrangements),
            time_budget: parse_var("BOT_TIME_BUDGET_MS")?
                .map(Duration::from_millis)
                .unwrap_or(bot_defaults.time_budget),
        };

        Ok(Config {
            dictionary_path: env::var("DICTIONARY_PATH")
                .unwrap_or_else(|_| "./dictionary.txt".to_string()),
            game,
            bot,
            rng_seed: parse_var("RNG_SEED")?,
        })
    }
}

/// Read an optional variable, failing loudly when it is set but malformed
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.max_turns, 10);
        assert!(config.initial_word.is_none());
        assert!(config.enable_key_letters);
        assert!(config.enable_locked_letters);
    }

    #[test]
    fn test_default_seating_includes_bot() {
        let seeds = GameConfig::default().player_seeds();
        assert_eq!(seeds.len(), 2);
        assert!(!seeds[0].is_bot);
        assert!(seeds[1].is_bot);

        let humans = GameConfig {
            allow_bot_player: false,
            ..GameConfig::default()
        };
        assert!(humans.player_seeds().iter().all(|seed| !seed.is_bot));
    }

    #[test]
    fn test_game_config_deserializes_partial_json() {
        let config: GameConfig =
            serde_json::from_str(r#"{"max_turns": 5, "initial_word": "CAT"}"#).unwrap();
        assert_eq!(config.max_turns, 5);
        assert_eq!(config.initial_word.as_deref(), Some("CAT"));
        assert!(config.allow_bot_player);
    }
}
