use once_cell::sync::Lazy;
use rand::Rng;

/// Letter frequency distribution for English (approximate)
/// Ordered from most to least frequent.
pub static LETTER_DISTRIBUTION: Lazy<Vec<(char, f32)>> = Lazy::new(|| {
    vec![
        ('E', 12.70),
        ('T', 9.05),
        ('A', 8.16),
        ('O', 7.50),
        ('I', 6.96),
        ('N', 6.74),
        ('S', 6.32),
        ('H', 6.09),
        ('R', 5.98),
        ('D', 4.25),
        ('L', 4.02),
        ('C', 2.78),
        ('U', 2.75),
        ('M', 2.40),
        ('W', 2.36),
        ('F', 2.22),
        ('G', 2.01),
        ('Y', 1.97),
        ('P', 1.92),
        ('B', 1.49),
        ('V', 0.97),
        ('K', 0.77),
        ('J', 0.15),
        ('X', 0.15),
        ('Q', 0.09),
        ('Z', 0.07),
    ]
});

/// The alphabet in descending frequency order.
/// The bot walks letters in this order so that common letters are tried first
/// when the candidate cap truncates the list.
pub static FREQUENCY_ORDERED_ALPHABET: Lazy<Vec<char>> =
    Lazy::new(|| LETTER_DISTRIBUTION.iter().map(|(ch, _)| *ch).collect());

/// Trim and uppercase a raw word.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_uppercase()
}

/// True when every character is an ASCII letter A-Z (case-insensitive).
pub fn is_alphabetic_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|ch| ch.is_ascii_alphabetic())
}

/// Normalize a single letter, rejecting anything outside A-Z.
pub fn normalize_letter(letter: char) -> Option<char> {
    let upper = letter.to_ascii_uppercase();
    upper.is_ascii_uppercase().then_some(upper)
}

/// Calculate the cumulative distribution for weighted random selection,
/// restricted to the letters accepted by `eligible`.
pub fn get_cumulative_distribution<F>(eligible: F) -> Vec<(char, f32)>
where
    F: Fn(char) -> bool,
{
    let mut cumulative = 0.0;
    LETTER_DISTRIBUTION
        .iter()
        .filter(|(ch, _)| eligible(*ch))
        .map(|(ch, freq)| {
            cumulative += freq;
            (*ch, cumulative)
        })
        .collect()
}

/// Pick a letter weighted by English frequency among the eligible ones.
/// Returns `None` when no letter is eligible.
pub fn weighted_random_letter<R, F>(rng: &mut R, eligible: F) -> Option<char>
where
    R: Rng + ?Sized,
    F: Fn(char) -> bool,
{
    let cumulative_dist = get_cumulative_distribution(eligible);
    let (last, total) = *cumulative_dist.last()?;
    let random_value = rng.random::<f32>() * total;

    for (letter, cumulative) in &cumulative_dist {
        if random_value <= *cumulative {
            return Some(*letter);
        }
    }

    Some(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_cumulative_distribution() {
        let dist = get_cumulative_distribution(|_| true);
        assert!(dist.len() == 26);
        // Last entry should be close to 100%
        assert!((dist.last().unwrap().1 - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_frequency_alphabet_is_complete() {
        let mut letters = FREQUENCY_ORDERED_ALPHABET.clone();
        assert_eq!(letters[0], 'E');
        letters.sort_unstable();
        let expected: Vec<char> = ('A'..='Z').collect();
        assert_eq!(letters, expected);
    }

    #[test]
    fn test_weighted_letter_respects_eligibility() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let letter = weighted_random_letter(&mut rng, |ch| ch == 'Q' || ch == 'Z').unwrap();
            assert!(letter == 'Q' || letter == 'Z');
        }
        assert_eq!(weighted_random_letter(&mut rng, |_| false), None);
    }

    #[test]
    fn test_normalization_helpers() {
        assert_eq!(normalize_word("  cAt "), "CAT");
        assert!(is_alphabetic_word("Stalk"));
        assert!(!is_alphabetic_word("st4lk"));
        assert!(!is_alphabetic_word(""));
        assert_eq!(normalize_letter('s'), Some('S'));
        assert_eq!(normalize_letter('3'), None);
    }
}
