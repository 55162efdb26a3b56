use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use rand::{seq::SliceRandom, Rng, RngCore};
use serde::Serialize;

use crate::config::BotConfig;
use crate::dictionary::{Dictionary, ValidateOptions};
use crate::game::{scorer::Scorer, validator::MoveValidator};
use crate::models::ScoringBreakdown;
use crate::utils::letters::FREQUENCY_ORDERED_ALPHABET;

/// Check the time budget every this many filtered candidates
const BUDGET_CHECK_INTERVAL: usize = 256;
/// Random permutation attempts allowed per requested rearrangement
const REARRANGE_ATTEMPTS_PER_RESULT: usize = 10;
/// Attempts in a row without a new permutation before a strategy is abandoned
const MAX_MISSES_IN_A_ROW: usize = 64;

const BASE_CONFIDENCE: f64 = 0.5;
const SCORE_CONFIDENCE_STEP: f64 = 0.1;
const KEY_LETTER_CONFIDENCE: f64 = 0.1;
const LENGTH_CONFIDENCE: f64 = 0.1;

/// Everything the bot needs to know about the position
#[derive(Debug, Clone, Copy)]
pub struct BotRequest<'a> {
    pub current_word: &'a str,
    pub key_letters: &'a [char],
    pub locked_letters: &'a [char],
    pub used_words: &'a HashSet<String>,
}

/// A filtered, scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub word: String,
    pub breakdown: ScoringBreakdown,
    pub confidence: f64,
}

/// The move the bot settled on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotMove {
    pub word: String,
    pub breakdown: ScoringBreakdown,
    pub confidence: f64,
    /// Number of scored candidates the move was picked from
    pub candidates_considered: usize,
}

/// Greedy brute-force move search.
///
/// Candidates are every single-letter add, remove and substitution plus a
/// bounded set of random rearrangements. Survivors of dictionary and legality
/// filtering are scored with the same `Scorer` human moves use, and the
/// highest total wins.
#[derive(Clone)]
pub struct BotMoveGenerator {
    config: BotConfig,
    dictionary: Arc<dyn Dictionary>,
}

impl BotMoveGenerator {
    pub fn new(config: BotConfig, dictionary: Arc<dyn Dictionary>) -> Self {
        Self { config, dictionary }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Pick the best move, or `None` when nothing survives filtering or the
    /// time budget ran out.
    pub fn find_best_move(
        &self,
        request: BotRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<BotMove> {
        let ranked = self.rank_candidates(request, rng);
        let candidates_considered = ranked.len();
        let best = ranked.into_iter().next()?;

        tracing::debug!(
            "Bot chose {} -> {} (score {}, confidence {:.2}) from {} candidates",
            request.current_word,
            best.word,
            best.breakdown.total_score,
            best.confidence,
            candidates_considered
        );

        Some(BotMove {
            word: best.word,
            breakdown: best.breakdown,
            confidence: best.confidence,
            candidates_considered,
        })
    }

    /// All playable candidates, best first.
    ///
    /// Sorted by total score then confidence; the sort is stable so full ties
    /// keep generation order. Empty when the time budget is exceeded.
    pub fn rank_candidates(
        &self,
        request: BotRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<ScoredCandidate> {
        let started = Instant::now();
        let current = request.current_word.trim().to_uppercase();
        if current.is_empty() {
            return Vec::new();
        }

        let raw = self.generate_before(&current, self.deadline(started), rng);
        let raw_count = raw.len();

        let mut playable = Vec::new();
        for (index, candidate) in raw.into_iter().enumerate() {
            if index % BUDGET_CHECK_INTERVAL == 0 && self.over_budget(started) {
                return Vec::new();
            }
            if self.is_playable(&current, &candidate, &request) {
                playable.push(candidate);
            }
        }
        playable.truncate(self.config.max_candidates);

        if self.over_budget(started) {
            return Vec::new();
        }

        tracing::debug!(
            "Bot generated {} candidates for {}, {} playable",
            raw_count,
            current,
            playable.len()
        );

        let mut ranked: Vec<ScoredCandidate> = playable
            .into_iter()
            .map(|word| {
                let breakdown = Scorer::calculate_score(&current, &word, request.key_letters);
                let confidence = Self::confidence(&word, &breakdown);
                ScoredCandidate {
                    word,
                    breakdown,
                    confidence,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.breakdown
                .total_score
                .cmp(&a.breakdown.total_score)
                .then(b.confidence.total_cmp(&a.confidence))
        });

        ranked
    }

    /// Raw candidate words in generation order: adds, removes, substitutions,
    /// rearrangements. Duplicates and the word itself are dropped.
    ///
    /// Generation stops early, returning what it has, once the time budget
    /// is spent.
    pub fn generate_candidates(&self, word: &str, rng: &mut dyn RngCore) -> Vec<String> {
        self.generate_before(word, self.deadline(Instant::now()), rng)
    }

    fn generate_before(
        &self,
        word: &str,
        deadline: Option<Instant>,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let expired = || deadline.is_some_and(|deadline| Instant::now() >= deadline);
        let letters: Vec<char> = word.chars().collect();
        let mut seen: HashSet<String> = HashSet::from([word.to_string()]);
        let mut candidates = Vec::new();
        let mut push = |candidate: String| {
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
        };

        // Add
        for pos in 0..=letters.len() {
            if expired() {
                return candidates;
            }
            for &letter in FREQUENCY_ORDERED_ALPHABET.iter() {
                let mut next = letters.clone();
                next.insert(pos, letter);
                push(next.into_iter().collect());
            }
        }

        // Remove
        for pos in 0..letters.len() {
            let mut next = letters.clone();
            next.remove(pos);
            push(next.into_iter().collect());
        }

        // Substitute
        for pos in 0..letters.len() {
            if expired() {
                return candidates;
            }
            for &letter in FREQUENCY_ORDERED_ALPHABET.iter() {
                if letter == letters[pos] {
                    continue;
                }
                let mut next = letters.clone();
                next[pos] = letter;
                push(next.into_iter().collect());
            }
        }

        // Rearrange
        let cap = self.config.max_rearrangements;
        for permutation in Self::rearrangements(&letters, cap, deadline, rng) {
            push(permutation);
        }

        candidates
    }

    /// Up to `cap` distinct permutations of `letters`, excluding the original.
    ///
    /// Attempts escalate through three strategies: one adjacent swap, one
    /// arbitrary pair swap, then a full shuffle. A strategy is abandoned after
    /// `MAX_MISSES_IN_A_ROW` attempts that find nothing new. The search ends
    /// once every distinct arrangement is found or `deadline` passes.
    pub fn rearrangements(
        letters: &[char],
        cap: usize,
        deadline: Option<Instant>,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let len = letters.len();
        if len < 2 || cap == 0 {
            return Vec::new();
        }

        let target = cap.min(Self::distinct_arrangements(letters).saturating_sub(1));
        let max_attempts = cap.saturating_mul(REARRANGE_ATTEMPTS_PER_RESULT);
        let phase_len = (max_attempts / 3).max(1);

        let original: String = letters.iter().collect();
        let mut seen = HashSet::from([original]);
        let mut permutations = Vec::new();
        let mut strategy = 0;
        let mut phase_attempts = 0;
        let mut misses = 0;

        for attempt in 0..max_attempts {
            if permutations.len() >= target {
                break;
            }
            if attempt % BUDGET_CHECK_INTERVAL == 0
                && deadline.is_some_and(|deadline| Instant::now() >= deadline)
            {
                break;
            }
            if misses >= MAX_MISSES_IN_A_ROW || (strategy < 2 && phase_attempts >= phase_len) {
                if strategy == 2 {
                    break;
                }
                strategy += 1;
                phase_attempts = 0;
                misses = 0;
            }
            phase_attempts += 1;

            let mut next = letters.to_vec();
            match strategy {
                0 => {
                    let i = rng.random_range(0..len - 1);
                    next.swap(i, i + 1);
                }
                1 => {
                    let i = rng.random_range(0..len);
                    let j = rng.random_range(0..len);
                    next.swap(i, j);
                }
                _ => next.shuffle(&mut *rng),
            }

            let candidate: String = next.into_iter().collect();
            if seen.insert(candidate.clone()) {
                permutations.push(candidate);
                misses = 0;
            } else {
                misses += 1;
            }
        }

        permutations
    }

    /// Number of distinct orderings of `letters` (n! over the product of the
    /// factorials of each letter's count), saturating at `usize::MAX`.
    pub fn distinct_arrangements(letters: &[char]) -> usize {
        let mut counts: HashMap<char, u128> = HashMap::new();
        for &letter in letters {
            *counts.entry(letter).or_default() += 1;
        }

        // Product of binomials C(placed + k, k), built one factor at a time
        // so every division is exact.
        let mut total: u128 = 1;
        let mut placed: u128 = 0;
        for count in counts.into_values() {
            for i in 1..=count {
                placed += 1;
                total = match total.checked_mul(placed) {
                    Some(product) => product / i,
                    None => return usize::MAX,
                };
            }
        }
        usize::try_from(total).unwrap_or(usize::MAX)
    }

    fn deadline(&self, started: Instant) -> Option<Instant> {
        started.checked_add(self.config.time_budget)
    }

    fn is_playable(&self, current: &str, candidate: &str, request: &BotRequest<'_>) -> bool {
        if request.used_words.contains(candidate) {
            return false;
        }
        if MoveValidator::missing_locked_letter(current, candidate, request.locked_letters)
            .is_some()
        {
            return false;
        }
        if !MoveValidator::is_legal(current, candidate) {
            return false;
        }
        self.dictionary
            .validate(candidate, ValidateOptions::bot(Some(current)))
            .is_valid
    }

    fn over_budget(&self, started: Instant) -> bool {
        let over = started.elapsed() > self.config.time_budget;
        if over {
            tracing::warn!(
                "Bot move search exceeded its {:?} budget, giving up",
                self.config.time_budget
            );
        }
        over
    }

    /// Tie-breaker between equal scores, clamped to [0, 1]
    fn confidence(word: &str, breakdown: &ScoringBreakdown) -> f64 {
        let mut confidence =
            BASE_CONFIDENCE + SCORE_CONFIDENCE_STEP * f64::from(breakdown.total_score);
        if !breakdown.key_letters_used.is_empty() {
            confidence += KEY_LETTER_CONFIDENCE;
        }
        if (4..=6).contains(&word.chars().count()) {
            confidence += LENGTH_CONFIDENCE;
        }
        confidence.clamp(0.0, 1.0)
    }
}
