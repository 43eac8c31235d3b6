//! Per-page quality profiling, document aggregation, and repetitive-content
//! stripping.

mod dictionary;
mod garbage;
mod readability;
mod repetitive;

pub use garbage::word_garbage_score;
pub use repetitive::strip_repetitive_content;

use crate::config::PipelineConfig;
use crate::types::{DocumentProfile, NoiseLevel, Page, PageProfile, QualityTier};
use once_cell::sync::Lazy;
use regex::Regex;

/// The same five canonical PJe footer patterns used by [`repetitive`], kept
/// separately here because scoring strips the footer from a copy of the text
/// without mutating the page, and only when it falls in the tail of the page.
static PJE_FOOTER_LINE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^assinado eletronicamente",
        r"(?i)^documento assinado digitalmente",
        r"(?i)^para conferir o original",
        r"(?i)^processo judicial eletr[oô]nico",
        r"(?i)^n[uú]mero do documento:?\s*\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static PJe footer pattern"))
    .collect()
});

/// Strips PJe-footer lines from the text used for scoring, but only when
/// they fall within the last 40% of the text — never on short fragments,
/// where a false match would wipe out the whole page.
fn strip_pje_footer_for_scoring(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return text.to_string();
    }
    let tail_start = (lines.len() as f64 * 0.6).floor() as usize;
    lines
        .iter()
        .enumerate()
        .filter(|(i, line)| !(*i >= tail_start && PJE_FOOTER_LINE.iter().any(|p| p.is_match(line))))
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn noise_level_for(garbage_score: f64) -> NoiseLevel {
    if garbage_score >= 0.30 {
        NoiseLevel::High
    } else if garbage_score >= 0.15 {
        NoiseLevel::Medium
    } else {
        NoiseLevel::Low
    }
}

fn quality_tier_for(score: f64, cfg: &PipelineConfig) -> QualityTier {
    cfg.tier_for_readability(score)
}

/// Profiles one page: readability, garbage score, tier, degradation.
pub fn profile_page(page: &Page, cfg: &PipelineConfig) -> PageProfile {
    let scored_text = strip_pje_footer_for_scoring(&page.text);
    let readability_score = readability::readability_score(&scored_text);
    let word_garbage_score = garbage::word_garbage_score(&scored_text);
    let noise_level = noise_level_for(word_garbage_score);
    let char_count = page.text.chars().count();
    let quality_tier = quality_tier_for(readability_score, cfg);

    let is_degraded = !page.empty
        && (readability_score < cfg.degraded_readability_threshold
            || !matches!(noise_level, NoiseLevel::Low)
            || word_garbage_score >= cfg.degraded_garbage_threshold
            || char_count < cfg.degraded_char_count_threshold);

    PageProfile {
        page_number: page.page_number,
        readability_score,
        noise_level,
        word_garbage_score,
        quality_tier,
        char_count,
        is_degraded,
        empty: page.empty,
        propagated: None,
    }
}

/// Profiles every page, then propagates degradation across the whole
/// document when the configured ratio of non-empty pages is degraded.
pub fn profile_pages(pages: &[Page], cfg: &PipelineConfig) -> Vec<PageProfile> {
    let mut profiles: Vec<PageProfile> = pages.iter().map(|p| profile_page(p, cfg)).collect();

    let non_empty_count = profiles.iter().filter(|p| !p.empty).count();
    let degraded_count = profiles.iter().filter(|p| !p.empty && p.is_degraded).count();

    if DocumentProfile::exceeds_degraded_ratio(non_empty_count, degraded_count, cfg.degraded_ratio_propagate) {
        for profile in profiles.iter_mut() {
            if !profile.empty && !profile.is_degraded {
                profile.is_degraded = true;
                profile.propagated = Some(true);
            }
        }
    }

    profiles
}

pub fn aggregate_document(profiles: &[PageProfile], cfg: &PipelineConfig) -> DocumentProfile {
    DocumentProfile::from_profiles(profiles, cfg.degraded_ratio_propagate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtractionMethod;

    fn page(number: u32, text: &str) -> Page {
        Page {
            page_number: number,
            text: text.to_string(),
            confidence: 0.9,
            empty: text.trim().chars().count() < 50,
            method: ExtractionMethod::FastParsePoppler,
            rotation_applied: None,
            word_garbage_score: None,
            ocr_replaced: None,
            ocr_fallback_to_fp: None,
        }
    }

    #[test]
    fn clean_page_is_not_degraded() {
        let cfg = PipelineConfig::default();
        let text = "Vistos. Ante o exposto neste processo, julgo procedente o pedido \
            formulado pelo autor na presente ação judicial, condenando o réu ao pagamento \
            integral da indenização por danos morais e materiais apurados nos autos.";
        let profile = profile_page(&page(1, text), &cfg);
        assert!(!profile.is_degraded);
        assert_eq!(profile.empty, false);
    }

    #[test]
    fn short_page_is_marked_empty_and_not_degraded_by_char_count_alone() {
        let cfg = PipelineConfig::default();
        let profile = profile_page(&page(1, "curto"), &cfg);
        assert!(profile.empty);
    }

    #[test]
    fn degradation_propagates_once_over_threshold() {
        let cfg = PipelineConfig::default();
        let garbled = "x q z 7f ~k *8 §w a1 b2 c3 d4 e5 f6 g7 h8 ¬i9 ¨j0 £k1 ¢l2 ¡m3 ¿n4 b5 c6 d7 e8 f9 g0";
        let clean = "Vistos. Ante o exposto neste processo, julgo procedente o pedido \
            formulado pelo autor na presente ação judicial, condenando o réu ao pagamento \
            integral da indenização por danos morais e materiais apurados nos autos.";
        let pages = vec![page(1, garbled), page(2, garbled), page(3, clean)];
        let profiles = profile_pages(&pages, &cfg);
        assert!(profiles[2].is_degraded, "clean page should have been propagated");
        assert_eq!(profiles[2].propagated, Some(true));
    }
}
