//! Readability score: four equally-weighted heuristics over page text,
//! producing a 0-100 score.

const HEALTHY_WORD_LEN: std::ops::RangeInclusive<f64> = 3.0..=8.0;
const HEALTHY_LINE_LEN: std::ops::RangeInclusive<f64> = 30.0..=120.0;

fn band_score(value: f64, healthy: std::ops::RangeInclusive<f64>) -> f64 {
    if healthy.contains(&value) {
        return 100.0;
    }
    let (low, high) = (*healthy.start(), *healthy.end());
    let distance = if value < low { low - value } else { value - high };
    let span = high - low;
    (100.0 - (distance / span.max(1.0)) * 100.0).clamp(0.0, 100.0)
}

fn chars_per_page_density(char_count: usize) -> f64 {
    // A typical legal-document page runs roughly 1500-3500 characters; scale
    // linearly up to that band and flatten above it.
    let count = char_count as f64;
    (count / 2500.0 * 100.0).clamp(0.0, 100.0)
}

fn printable_latin_ratio(text: &str) -> f64 {
    let total = text.chars().count().max(1) as f64;
    let printable = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || c.is_ascii_punctuation())
        .count() as f64;
    (printable / total) * 100.0
}

fn average_word_length(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    words.iter().map(|w| w.chars().count() as f64).sum::<f64>() / words.len() as f64
}

fn average_line_length(text: &str) -> f64 {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return 0.0;
    }
    lines.iter().map(|l| l.chars().count() as f64).sum::<f64>() / lines.len() as f64
}

/// Computes the readability score (0-100) for a page of text, from four
/// equally weighted heuristics: character density, average word length,
/// printable-Latin ratio, and average line length.
pub fn readability_score(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let density = chars_per_page_density(text.chars().count());
    let word_len = band_score(average_word_length(text), HEALTHY_WORD_LEN);
    let latin_ratio = printable_latin_ratio(text);
    let line_len = band_score(average_line_length(text), HEALTHY_LINE_LEN);

    ((density + word_len + latin_ratio + line_len) / 4.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(readability_score(""), 0.0);
        assert_eq!(readability_score("   \n  "), 0.0);
    }

    #[test]
    fn well_formed_prose_scores_in_the_a_tier() {
        let paragraph = "Vistos. Ante o exposto neste processo, julgo procedente o pedido \
            formulado pelo autor na presente ação judicial, condenando o réu ao pagamento \
            integral da indenização por danos morais e materiais apurados nos autos.\n"
            .repeat(10);
        let score = readability_score(&paragraph);
        assert!(score >= 80.0, "expected tier A, got {score}");
    }

    #[test]
    fn short_fragment_scores_lower_than_full_paragraph() {
        let fragment = "a b c";
        let paragraph = "Vistos. Ante o exposto neste processo, julgo procedente o pedido \
            formulado pelo autor na presente ação judicial.\n"
            .repeat(10);
        assert!(readability_score(fragment) < readability_score(&paragraph));
    }
}
