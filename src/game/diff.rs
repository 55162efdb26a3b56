use std::collections::BTreeMap;

use crate::models::WordDiff;

/// Multiset comparison of two words.
pub struct WordDiffer;

impl WordDiffer {
    /// Compare `previous` against `current`, both uppercased first.
    ///
    /// Letters are counted, not set-compared, so repeated letters are handled:
    /// `TASKS -> TASK` removes one `S`, not every `S`.
    pub fn analyze(previous: &str, current: &str, key_letters: &[char]) -> WordDiff {
        let previous = previous.trim().to_uppercase();
        let current = current.trim().to_uppercase();

        let mut deltas: BTreeMap<char, i64> = BTreeMap::new();
        for ch in previous.chars() {
            *deltas.entry(ch).or_default() -= 1;
        }
        for ch in current.chars() {
            *deltas.entry(ch).or_default() += 1;
        }

        let mut added_letters = Vec::new();
        let mut removed_letters = Vec::new();
        for (&letter, &delta) in &deltas {
            let count = delta.unsigned_abs() as usize;
            if delta > 0 {
                added_letters.extend(std::iter::repeat(letter).take(count));
            } else if delta < 0 {
                removed_letters.extend(std::iter::repeat(letter).take(count));
            }
        }

        let is_rearranged = added_letters.is_empty()
            && removed_letters.is_empty()
            && previous.len() == current.len()
            && previous != current;

        let key_letters_used = current
            .chars()
            .filter(|ch| key_letters.contains(ch))
            .collect();

        WordDiff {
            added_letters,
            removed_letters,
            is_rearranged,
            key_letters_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_words_have_empty_diff() {
        for word in ["CAT", "TASKS", "BOOKKEEPER", ""] {
            let diff = WordDiffer::analyze(word, word, &[]);
            assert!(diff.added_letters.is_empty());
            assert!(diff.removed_letters.is_empty());
            assert!(!diff.is_rearranged);
        }
    }

    #[test]
    fn test_single_insertion() {
        let diff = WordDiffer::analyze("CAT", "CATS", &[]);
        assert_eq!(diff.added_letters, vec!['S']);
        assert!(diff.removed_letters.is_empty());
        assert!(!diff.is_rearranged);
    }

    #[test]
    fn test_repeated_letters_counted() {
        let diff = WordDiffer::analyze("TASKS", "TASK", &[]);
        assert_eq!(diff.removed_letters, vec!['S']);

        let diff = WordDiffer::analyze("TOT", "TOOTS", &[]);
        assert_eq!(diff.added_letters, vec!['O', 'S']);
        assert!(diff.removed_letters.is_empty());

        let diff = WordDiffer::analyze("TOP", "TOOTS", &[]);
        assert_eq!(diff.added_letters, vec!['O', 'S', 'T']);
        assert_eq!(diff.removed_letters, vec!['P']);
    }

    #[test]
    fn test_pure_rearrangement() {
        let diff = WordDiffer::analyze("STOP", "POTS", &[]);
        assert!(diff.is_same_letters());
        assert!(diff.is_rearranged);
    }

    #[test]
    fn test_substitution_is_add_and_remove() {
        let diff = WordDiffer::analyze("CAT", "COT", &[]);
        assert_eq!(diff.added_letters, vec!['O']);
        assert_eq!(diff.removed_letters, vec!['A']);
        assert!(!diff.is_rearranged);
    }

    #[test]
    fn test_case_insensitive_and_key_letters() {
        let diff = WordDiffer::analyze("cat", "Cast", &['S', 'Q']);
        assert_eq!(diff.added_letters, vec!['S']);
        assert_eq!(diff.key_letters_used.iter().copied().collect::<Vec<_>>(), vec!['S']);

        // Key letter counts even when it was already present
        let diff = WordDiffer::analyze("CAST", "CATS", &['S']);
        assert!(diff.is_rearranged);
        assert!(diff.key_letters_used.contains(&'S'));
    }
}
