//! Salience estimation
//!
//! Scores how important a piece of text is so that only memorable events
//! survive consolidation. Scoring is a pure additive heuristic over a fixed
//! marker table, word count and punctuation.

/// Score every text starts from
pub const BASE_SALIENCE: f32 = 0.1;

/// Lowercase markers and the boost each contributes when present.
///
/// Markers are matched independently, so overlapping entries (`remember`
/// and `membe`) both fire on the same text.
const IMPORTANCE_MARKERS: &[(&str, f32)] = &[
    ("remember", 0.4),
    ("remmeber", 0.4),
    ("membe", 0.4),
    ("important", 0.35),
    ("prefer", 0.25),
    ("always", 0.2),
    ("never", 0.2),
    ("my name is", 0.35),
    ("i am", 0.2),
    ("i like", 0.15),
    ("i dislike", 0.15),
    ("i hate", 0.2),
    ("i love", 0.2),
    ("passphrase", 0.4),
    ("password", 0.4),
    ("secret", 0.3),
];

const LONG_TEXT_WORDS: usize = 10;
const VERY_LONG_TEXT_WORDS: usize = 30;
const LENGTH_BONUS: f32 = 0.1;
const QUESTION_BONUS: f32 = 0.15;
const EXCLAMATION_BONUS: f32 = 0.1;

/// Estimate the salience of `text` in `[0, 1]`.
pub fn estimate_salience(text: &str) -> f32 {
    let lower = text.to_lowercase();

    let mut score = BASE_SALIENCE;
    score += IMPORTANCE_MARKERS
        .iter()
        .filter(|(marker, _)| lower.contains(marker))
        .map(|(_, boost)| boost)
        .sum::<f32>();

    let words = text.split_whitespace().count();
    if words > LONG_TEXT_WORDS {
        score += LENGTH_BONUS;
    }
    if words > VERY_LONG_TEXT_WORDS {
        score += LENGTH_BONUS;
    }

    if text.contains('?') {
        score += QUESTION_BONUS;
    }
    if text.contains('!') {
        score += EXCLAMATION_BONUS;
    }

    score.clamp(0.0, 1.0)
}
