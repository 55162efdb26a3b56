use crate::error::GameError;
use crate::game::diff::WordDiffer;
use crate::models::WordDiff;

/// Maximum letters that may be added, and separately removed, in one turn
pub const MAX_LETTER_CHANGES: usize = 1;

pub struct MoveValidator;

impl MoveValidator {
    /// Check the "one add, one remove" rule. Rearrangement is unrestricted.
    pub fn check(previous: &str, current: &str) -> Result<WordDiff, GameError> {
        let diff = WordDiffer::analyze(previous, current, &[]);
        Self::check_diff(&diff)?;
        Ok(diff)
    }

    pub fn check_diff(diff: &WordDiff) -> Result<(), GameError> {
        if diff.added_letters.len() > MAX_LETTER_CHANGES {
            return Err(GameError::TooManyAdds(diff.added_letters.len()));
        }
        if diff.removed_letters.len() > MAX_LETTER_CHANGES {
            return Err(GameError::TooManyRemoves(diff.removed_letters.len()));
        }
        Ok(())
    }

    pub fn is_legal(previous: &str, current: &str) -> bool {
        Self::check(previous, current).is_ok()
    }

    /// First locked letter present in `previous` that `current` dropped.
    pub fn missing_locked_letter(previous: &str, current: &str, locked: &[char]) -> Option<char> {
        let previous = previous.to_uppercase();
        let current = current.to_uppercase();
        locked
            .iter()
            .copied()
            .find(|letter| previous.contains(*letter) && !current.contains(*letter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_changes_are_legal() {
        assert!(MoveValidator::is_legal("CAT", "CATS"));
        assert!(MoveValidator::is_legal("CATS", "CAT"));
        assert!(MoveValidator::is_legal("CAT", "COT"));
        assert!(MoveValidator::is_legal("TASKS", "STALK"));
        assert!(MoveValidator::is_legal("STOP", "POTS"));
    }

    #[test]
    fn test_every_single_insertion_is_legal() {
        let word = "CAT";
        for pos in 0..=word.len() {
            for letter in 'A'..='Z' {
                let mut candidate = word.to_string();
                candidate.insert(pos, letter);
                let diff = MoveValidator::check(word, &candidate).unwrap();
                assert_eq!(diff.added_letters.len(), 1);
            }
        }
    }

    #[test]
    fn test_two_adds_rejected() {
        assert_eq!(
            MoveValidator::check("CAT", "CHATS"),
            Err(GameError::TooManyAdds(2))
        );
        assert_eq!(
            MoveValidator::check("CAT", "CATT").map(|_| ()),
            Ok(())
        );
        assert_eq!(
            MoveValidator::check("CAT", "CATTT"),
            Err(GameError::TooManyAdds(2))
        );
    }

    #[test]
    fn test_two_removes_rejected() {
        assert_eq!(
            MoveValidator::check("CHATS", "CAT"),
            Err(GameError::TooManyRemoves(2))
        );
    }

    #[test]
    fn test_missing_locked_letter() {
        assert_eq!(MoveValidator::missing_locked_letter("TASKS", "TSKS", &['A']), Some('A'));
        assert_eq!(MoveValidator::missing_locked_letter("TASKS", "STALK", &['A']), None);
        // Lock only binds letters actually present in the current word
        assert_eq!(MoveValidator::missing_locked_letter("TSKS", "TUSKS", &['A']), None);
    }
}
