use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use rand::{seq::IndexedRandom, RngCore};
use serde::Serialize;
use tokio::fs;

use crate::error::ValidationReason;
use crate::utils::letters::{is_alphabetic_word, normalize_word};

/// Minimum length of a human-authored word
pub const MIN_WORD_LENGTH: usize = 3;

/// Context for a single validation call
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions<'a> {
    /// Bot words skip the length checks
    pub is_bot: bool,
    /// Word being transformed, used for the length-change check
    pub previous_word: Option<&'a str>,
    /// Enforce `MIN_WORD_LENGTH`
    pub check_length: bool,
}

impl<'a> ValidateOptions<'a> {
    pub fn human(previous_word: Option<&'a str>) -> Self {
        Self {
            is_bot: false,
            previous_word,
            check_length: true,
        }
    }

    pub fn bot(previous_word: Option<&'a str>) -> Self {
        Self {
            is_bot: true,
            previous_word,
            check_length: false,
        }
    }
}

/// Outcome of dictionary validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: Option<ValidationReason>,
    pub normalized_word: String,
}

impl ValidationResult {
    fn valid(normalized_word: String) -> Self {
        Self {
            is_valid: true,
            reason: None,
            normalized_word,
        }
    }

    fn invalid(reason: ValidationReason, normalized_word: String) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason),
            normalized_word,
        }
    }
}

/// Word-existence capability consumed by the turn engine and the bot.
///
/// Implementors only need `is_dictionary_word` and `random_word_of_length`;
/// `validate` layers the format checks on top.
pub trait Dictionary: Send + Sync {
    /// Check if a normalized (uppercase) word exists
    fn is_dictionary_word(&self, word: &str) -> bool;

    /// Pick a random word of exactly `length` letters
    fn random_word_of_length(&self, length: usize, rng: &mut dyn RngCore) -> Option<String>;

    /// Validate a raw word.
    ///
    /// Checks in order:
    /// 1. Not empty
    /// 2. Letters A-Z only
    /// 3. Length >= 3 (humans with `check_length`)
    /// 4. Length differs from `previous_word` by at most one (humans)
    /// 5. Word exists in dictionary
    fn validate(&self, word: &str, options: ValidateOptions<'_>) -> ValidationResult {
        let normalized = normalize_word(word);

        if normalized.is_empty() {
            return ValidationResult::invalid(ValidationReason::EmptyWord, normalized);
        }

        if !is_alphabetic_word(&normalized) {
            return ValidationResult::invalid(ValidationReason::InvalidCharacters, normalized);
        }

        if !options.is_bot {
            let length = normalized.chars().count();

            if options.check_length && length < MIN_WORD_LENGTH {
                return ValidationResult::invalid(ValidationReason::TooShort, normalized);
            }

            if let Some(previous) = options.previous_word {
                let previous_length = previous.trim().chars().count();
                if length.abs_diff(previous_length) > 1 {
                    return ValidationResult::invalid(
                        ValidationReason::LengthChangeTooLarge,
                        normalized,
                    );
                }
            }
        }

        if !self.is_dictionary_word(&normalized) {
            return ValidationResult::invalid(ValidationReason::NotInDictionary, normalized);
        }

        ValidationResult::valid(normalized)
    }
}

/// In-memory word list backed by a hash set, indexed by length for
/// random word selection.
pub struct WordList {
    words: HashSet<String>,
    by_length: HashMap<usize, Vec<String>>,
}

impl WordList {
    /// Load a word list from a newline-separated file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dictionary at {}", path.display()))?;
        let list = Self::from_words(content.lines());

        tracing::info!("Loaded {} words into dictionary", list.len());

        Ok(list)
    }

    /// Build a word list from any iterator of words.
    /// Entries are uppercased; non-alphabetic and empty entries are skipped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|word| normalize_word(word.as_ref()))
            .filter(|word| is_alphabetic_word(word))
            .collect();

        let mut by_length: HashMap<usize, Vec<String>> = HashMap::new();
        for word in &words {
            by_length
                .entry(word.chars().count())
                .or_default()
                .push(word.clone());
        }
        // Hash set iteration order is random; sort so seeded picks are stable
        for bucket in by_length.values_mut() {
            bucket.sort_unstable();
        }

        Self { words, by_length }
    }

    /// Create an empty dictionary (for testing)
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
            by_length: HashMap::new(),
        }
    }

    /// Get the number of words in the dictionary
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_dictionary_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }

    fn random_word_of_length(&self, length: usize, rng: &mut dyn RngCore) -> Option<String> {
        self.by_length.get(&length)?.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> WordList {
        WordList::from_words(["cat", "cats", "coat", "dog", "it's", ""])
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = WordList::empty();
        assert!(dict.is_empty());
        assert!(!dict.is_dictionary_word("TEST"));
    }

    #[test]
    fn test_from_words_normalizes_and_filters() {
        let dict = sample();
        assert_eq!(dict.len(), 4);
        assert!(dict.is_dictionary_word("CATS"));
        assert!(dict.is_dictionary_word("cats"));
        assert!(!dict.is_dictionary_word("IT'S"));
    }

    #[test]
    fn test_validate_reason_order() {
        let dict = sample();
        let human = ValidateOptions::human(Some("CAT"));

        assert_eq!(
            dict.validate("   ", human).reason,
            Some(ValidationReason::EmptyWord)
        );
        assert_eq!(
            dict.validate("c4t", human).reason,
            Some(ValidationReason::InvalidCharacters)
        );
        assert_eq!(
            dict.validate("at", human).reason,
            Some(ValidationReason::TooShort)
        );
        assert_eq!(
            dict.validate("catsss", human).reason,
            Some(ValidationReason::LengthChangeTooLarge)
        );
        assert_eq!(
            dict.validate("cot", human).reason,
            Some(ValidationReason::NotInDictionary)
        );

        let ok = dict.validate(" cats ", human);
        assert!(ok.is_valid);
        assert_eq!(ok.reason, None);
        assert_eq!(ok.normalized_word, "CATS");
    }

    #[test]
    fn test_bot_mode_skips_length_checks_only() {
        let dict = WordList::from_words(["at", "cat"]);
        let bot = ValidateOptions::bot(Some("CATTLE"));

        assert!(dict.validate("at", bot).is_valid);
        assert_eq!(
            dict.validate("a-t", bot).reason,
            Some(ValidationReason::InvalidCharacters)
        );
    }

    #[test]
    fn test_random_word_of_length() {
        let dict = sample();
        let mut rng = StdRng::seed_from_u64(1);

        let word = dict.random_word_of_length(4, &mut rng).unwrap();
        assert!(word == "CATS" || word == "COAT");
        assert_eq!(dict.random_word_of_length(9, &mut rng), None);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = WordList::load("./definitely/not/here.txt").await;
        assert!(result.is_err());
    }
}
