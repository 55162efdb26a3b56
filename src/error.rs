use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason codes produced by dictionary validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    #[error("word is empty")]
    EmptyWord,
    #[error("word contains characters other than A-Z")]
    InvalidCharacters,
    #[error("word is shorter than the minimum length")]
    TooShort,
    #[error("word length changed by more than one letter")]
    LengthChangeTooLarge,
    #[error("word is not in the dictionary")]
    NotInDictionary,
    #[error("word has already been played")]
    AlreadyPlayed,
}

impl ValidationReason {
    /// Stable reason code for collaborators
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::EmptyWord => "EMPTY_WORD",
            ValidationReason::InvalidCharacters => "INVALID_CHARACTERS",
            ValidationReason::TooShort => "TOO_SHORT",
            ValidationReason::LengthChangeTooLarge => "LENGTH_CHANGE_TOO_LARGE",
            ValidationReason::NotInDictionary => "NOT_IN_DICTIONARY",
            ValidationReason::AlreadyPlayed => "ALREADY_PLAYED",
        }
    }
}

/// Everything the turn engine can refuse to do.
///
/// No variant is ever returned after state has been mutated: every check
/// runs before the first assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("'{0}' has already been played this game")]
    AlreadyPlayed(String),
    #[error("locked letter '{0}' cannot be removed this turn")]
    LockedLetterRemoved(char),
    #[error("only one letter may be added per turn ({0} added)")]
    TooManyAdds(usize),
    #[error("only one letter may be removed per turn ({0} removed)")]
    TooManyRemoves(usize),
    #[error("invalid word: {0}")]
    InvalidWord(ValidationReason),
    #[error("it is not {0}'s turn")]
    NotYourTurn(String),
    #[error("no player is currently on turn")]
    NoCurrentPlayer,
    #[error("game has not been started")]
    GameNotStarted,
    #[error("game has already been started")]
    GameAlreadyStarted,
    #[error("game is finished")]
    GameFinished,
    #[error("{0} are disabled for this game")]
    FeatureDisabled(&'static str),
    #[error("'{0}' is not a letter A-Z")]
    InvalidLetter(char),
    #[error("only one key letter may be active at a time")]
    KeyLetterLimit,
    #[error("key letter '{0}' has already been used this game")]
    KeyLetterUsed(char),
    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
}

impl GameError {
    /// Stable reason code for collaborators
    pub fn code(&self) -> &'static str {
        match self {
            GameError::AlreadyPlayed(_) => ValidationReason::AlreadyPlayed.code(),
            GameError::LockedLetterRemoved(_) => "INVALID_ACTION",
            GameError::TooManyAdds(_) => "TOO_MANY_ADDS",
            GameError::TooManyRemoves(_) => "TOO_MANY_REMOVES",
            GameError::InvalidWord(reason) => reason.code(),
            GameError::NotYourTurn(_) => "NOT_YOUR_TURN",
            GameError::NoCurrentPlayer => "NO_CURRENT_PLAYER",
            GameError::GameNotStarted => "GAME_NOT_STARTED",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::GameFinished => "GAME_FINISHED",
            GameError::FeatureDisabled(_) => "FEATURE_DISABLED",
            GameError::InvalidLetter(_) => "INVALID_LETTER",
            GameError::KeyLetterLimit => "KEY_LETTER_LIMIT",
            GameError::KeyLetterUsed(_) => "KEY_LETTER_USED",
            GameError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(GameError::LockedLetterRemoved('A').code(), "INVALID_ACTION");
        assert_eq!(GameError::TooManyAdds(2).code(), "TOO_MANY_ADDS");
        assert_eq!(
            GameError::InvalidWord(ValidationReason::NotInDictionary).code(),
            "NOT_IN_DICTIONARY"
        );
        assert_eq!(GameError::AlreadyPlayed("CAT".into()).code(), "ALREADY_PLAYED");
    }

    #[test]
    fn test_reason_serializes_as_code() {
        let json = serde_json::to_string(&ValidationReason::LengthChangeTooLarge).unwrap();
        assert_eq!(json, "\"LENGTH_CHANGE_TOO_LARGE\"");
    }
}
