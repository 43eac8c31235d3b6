//! Word-level garbage score: seven equal-weight signals over the page's
//! tokenized text, normalized to `[0, 1]`.

use super::dictionary::{is_in_dictionary, is_stopword};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_SIGNAL_POINTS: f64 = 2.0;
const SIGNAL_COUNT: f64 = 7.0;

static GARBAGE_OPERATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[~*§¬¨£¢¡¿]").expect("static garbage-operator pattern"));

static CONSONANT_RUN_OR_CASE_CHANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[bcdfghjklmnpqrstvwxyz]{4,}|[a-z][A-Z][a-z]").expect("static pattern")
});

static ENCODING_CORRUPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9][~\-=][A-Za-z0-9]|[A-Za-z]\d[A-Za-z]|[a-z][A-Z][a-z]")
        .expect("static pattern")
});

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn alphanumeric_fraction(word: &str) -> f64 {
    if word.is_empty() {
        return 0.0;
    }
    let alnum = word.chars().filter(|c| c.is_alphanumeric()).count();
    alnum as f64 / word.chars().count() as f64
}

fn points_for(value: f64, high: f64, low: f64) -> f64 {
    if value > high {
        2.0
    } else if value > low {
        1.0
    } else {
        0.0
    }
}

/// Computes the seven-signal word garbage score for a page's text (already
/// stripped of the PJe footer where applicable). Returns a value in `[0, 1]`.
pub fn word_garbage_score(text: &str) -> f64 {
    let words = tokenize(text);
    if words.is_empty() {
        return 0.0;
    }
    let total = words.len() as f64;

    // Signal 1: fraction of 1-2 char "words".
    let short_fraction = words.iter().filter(|w| w.chars().count() <= 2).count() as f64 / total;
    let s1 = points_for(short_fraction, 0.45, 0.30);

    // Signal 2: words whose alphanumeric portion is <40% and length > 1.
    let low_alnum_fraction = words
        .iter()
        .filter(|w| w.chars().count() > 1 && alphanumeric_fraction(w) < 0.40)
        .count() as f64
        / total;
    let s2 = points_for(low_alnum_fraction, 0.15, 0.08);

    // Signal 3: density of garbage operators across the whole text.
    let char_total = text.chars().count().max(1) as f64;
    let operator_count = GARBAGE_OPERATORS.find_iter(text).count() as f64;
    let operator_density = operator_count / char_total;
    let s3 = if operator_density > 0.02 { 2.0 } else { 0.0 };

    // Signal 4: fraction of words NOT in the high-frequency stoplist. A
    // fraction this low means almost every token collapsed into a handful of
    // common connector words, which real prose does not do.
    let non_stopword_fraction = words.iter().filter(|w| !is_stopword(w)).count() as f64 / total;
    let s4 = points_for_low(non_stopword_fraction, 0.05, 0.10);

    // Signal 5: consecutive-consonant runs or mid-word case changes.
    let consonant_run_fraction = words
        .iter()
        .filter(|w| CONSONANT_RUN_OR_CASE_CHANGE.is_match(w))
        .count() as f64
        / total;
    let s5 = points_for(consonant_run_fraction, 0.15, 0.08);

    // Signal 6: encoding-corruption tokens.
    let corruption_fraction = words
        .iter()
        .filter(|w| ENCODING_CORRUPTION.is_match(w))
        .count() as f64
        / total;
    let s6 = points_for(corruption_fraction, 0.10, 0.05);

    // Signal 7: dictionary miss rate, only evaluated with >= 10 eligible words.
    let long_words: Vec<&String> = words.iter().filter(|w| w.chars().count() >= 4).collect();
    let s7 = if long_words.len() >= 10 {
        let miss_fraction = long_words.iter().filter(|w| !is_in_dictionary(w)).count() as f64
            / long_words.len() as f64;
        points_for(miss_fraction, 0.70, 0.55)
    } else {
        0.0
    };

    let total_points = s1 + s2 + s3 + s4 + s5 + s6 + s7;
    (total_points / (SIGNAL_COUNT * MAX_SIGNAL_POINTS)).clamp(0.0, 1.0)
}

/// Signal 4 fires when the measured fraction is LOW (few stopword hits means
/// the text doesn't look like real Portuguese), the inverse sense of the
/// other six signals.
fn points_for_low(value: f64, low: f64, high: f64) -> f64 {
    if value < low {
        2.0
    } else if value < high {
        1.0
    } else {
        0.0
    }
}
