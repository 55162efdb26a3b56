use crate::game::diff::WordDiffer;
use crate::models::{ScoringBreakdown, WordDiff};

pub struct Scorer;

impl Scorer {
    /// Score the transformation `previous -> current`.
    ///
    /// Scoring rules:
    /// - +1 if any letter was added
    /// - +1 if any letter was removed
    /// - +1 if the letters were rearranged (pure reorder, or a substitution
    ///   that also moved retained letters)
    /// - +1 if the new word contains an active key letter
    ///
    /// An empty word on either side scores zero.
    pub fn calculate_score(
        previous: &str,
        current: &str,
        key_letters: &[char],
    ) -> ScoringBreakdown {
        if previous.trim().is_empty() || current.trim().is_empty() {
            return ScoringBreakdown::default();
        }

        let diff = WordDiffer::analyze(previous, current, key_letters);
        Self::score_diff(previous, current, &diff)
    }

    /// Score an already computed diff
    pub fn score_diff(previous: &str, current: &str, diff: &WordDiff) -> ScoringBreakdown {
        let add_points = u32::from(!diff.added_letters.is_empty());
        let remove_points = u32::from(!diff.removed_letters.is_empty());
        let rearranged =
            diff.is_rearranged || Self::retained_letters_shifted(previous, current, diff);
        let rearrange_points = u32::from(rearranged);
        let key_letter_points = u32::from(!diff.key_letters_used.is_empty());

        ScoringBreakdown {
            add_points,
            remove_points,
            rearrange_points,
            key_letter_points,
            total_score: add_points + remove_points + rearrange_points + key_letter_points,
            key_letters_used: diff.key_letters_used.clone(),
        }
    }

    /// Heuristic: a same-length substitution also counts as a rearrangement
    /// when more slots changed than letters were swapped, meaning some
    /// retained letter moved. Only applies when letters were both added and
    /// removed in equal number.
    pub fn retained_letters_shifted(previous: &str, current: &str, diff: &WordDiff) -> bool {
        if diff.is_same_letters() || diff.added_letters.len() != diff.removed_letters.len() {
            return false;
        }

        let previous: Vec<char> = previous.trim().to_uppercase().chars().collect();
        let current: Vec<char> = current.trim().to_uppercase().chars().collect();
        if previous.len() != current.len() {
            return false;
        }

        let changed_slots = previous
            .iter()
            .zip(&current)
            .filter(|(before, after)| before != after)
            .count();

        changed_slots > diff.added_letters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_scores_one() {
        let breakdown = Scorer::calculate_score("CAT", "CATS", &['Q']);
        assert_eq!(breakdown.add_points, 1);
        assert_eq!(breakdown.key_letter_points, 0);
        assert_eq!(breakdown.total_score, 1);
    }

    #[test]
    fn test_add_with_key_letter_scores_two() {
        let breakdown = Scorer::calculate_score("CAT", "CATS", &['S']);
        assert_eq!(breakdown.total_score, 2);
        assert!(breakdown.key_letters_used.contains(&'S'));
    }

    #[test]
    fn test_remove_scores_one() {
        let breakdown = Scorer::calculate_score("CATS", "CAT", &[]);
        assert_eq!(breakdown.remove_points, 1);
        assert_eq!(breakdown.total_score, 1);
    }

    #[test]
    fn test_pure_rearrangement_scores_one() {
        let breakdown = Scorer::calculate_score("STOP", "POTS", &[]);
        assert_eq!(breakdown.rearrange_points, 1);
        assert_eq!(breakdown.add_points, 0);
        assert_eq!(breakdown.remove_points, 0);
        assert_eq!(breakdown.total_score, 1);
    }

    #[test]
    fn test_in_place_substitution_is_not_rearranged() {
        let breakdown = Scorer::calculate_score("CAT", "COT", &[]);
        assert_eq!(breakdown.add_points, 1);
        assert_eq!(breakdown.remove_points, 1);
        assert_eq!(breakdown.rearrange_points, 0);
        assert_eq!(breakdown.total_score, 2);
    }

    #[test]
    fn test_substitution_with_shift_earns_rearrange_point() {
        // TASKS -> STALK: +L, -S, and the kept letters moved
        let breakdown = Scorer::calculate_score("TASKS", "STALK", &['A']);
        assert_eq!(breakdown.add_points, 1);
        assert_eq!(breakdown.remove_points, 1);
        assert_eq!(breakdown.rearrange_points, 1);
        assert_eq!(breakdown.key_letter_points, 1);
        assert_eq!(breakdown.total_score, 4);
    }

    #[test]
    fn test_no_key_letters_means_no_key_points() {
        for (before, after) in [("CAT", "CATS"), ("STOP", "POTS"), ("TASKS", "STALK")] {
            let breakdown = Scorer::calculate_score(before, after, &[]);
            assert_eq!(breakdown.key_letter_points, 0);
            assert!(breakdown.key_letters_used.is_empty());
        }
    }

    #[test]
    fn test_empty_word_scores_zero() {
        assert_eq!(Scorer::calculate_score("", "CAT", &['C']), ScoringBreakdown::default());
        assert_eq!(Scorer::calculate_score("CAT", "  ", &['C']), ScoringBreakdown::default());
    }

    #[test]
    fn test_unchanged_word_scores_only_key_letter() {
        let breakdown = Scorer::calculate_score("CAT", "CAT", &['A']);
        assert_eq!(breakdown.total_score, 1);
        assert_eq!(breakdown.key_letter_points, 1);
    }
}
