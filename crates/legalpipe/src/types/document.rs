use super::page::{NoiseLevel, PageProfile, QualityTier};
use serde::{Deserialize, Serialize};

/// Document-level aggregation of per-page profiles. Readability is the
/// **median**, not the mean, so a clean majority cannot mask a degraded tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub median_readability: f64,
    pub quality_tier: QualityTier,
    pub noise_level: NoiseLevel,
    pub degraded_pages: Vec<u32>,
    pub degraded_count: usize,
    pub clean_count: usize,
    pub is_mixed_quality: bool,
    pub has_text_layer: bool,
}

impl DocumentProfile {
    /// True once degraded pages account for at least the configured share of
    /// non-empty pages; callers use this to decide whether to propagate
    /// degradation onto the remaining clean pages.
    pub fn exceeds_degraded_ratio(non_empty_count: usize, degraded_count: usize, ratio: f64) -> bool {
        if non_empty_count == 0 {
            return false;
        }
        (degraded_count as f64) / (non_empty_count as f64) >= ratio
    }

    pub fn from_profiles(profiles: &[PageProfile], degraded_ratio_propagate: f64) -> Self {
        let non_empty: Vec<&PageProfile> = profiles.iter().filter(|p| !p.empty).collect();
        let mut readabilities: Vec<f64> = non_empty.iter().map(|p| p.readability_score).collect();
        readabilities.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median_readability = median(&readabilities);

        let degraded_count = non_empty.iter().filter(|p| p.is_degraded).count();
        let clean_count = non_empty.len().saturating_sub(degraded_count);
        let is_mixed_quality = Self::exceeds_degraded_ratio(non_empty.len(), degraded_count, degraded_ratio_propagate);

        let noise_level = non_empty
            .iter()
            .map(|p| p.noise_level)
            .max_by_key(noise_rank)
            .unwrap_or(NoiseLevel::Low);

        let has_text_layer = non_empty.iter().any(|p| !p.is_degraded);

        let quality_tier = tier_for(median_readability);

        let degraded_pages = non_empty
            .iter()
            .filter(|p| p.is_degraded)
            .map(|p| p.page_number)
            .collect();

        Self {
            median_readability,
            quality_tier,
            noise_level,
            degraded_pages,
            degraded_count,
            clean_count,
            is_mixed_quality,
            has_text_layer,
        }
    }
}

fn noise_rank(level: &NoiseLevel) -> u8 {
    match level {
        NoiseLevel::Low => 0,
        NoiseLevel::Medium => 1,
        NoiseLevel::High => 2,
    }
}

fn tier_for(score: f64) -> QualityTier {
    if score >= 80.0 {
        QualityTier::A
    } else if score >= 60.0 {
        QualityTier::B
    } else if score >= 40.0 {
        QualityTier::C
    } else if score >= 20.0 {
        QualityTier::D
    } else {
        QualityTier::F
    }
}

fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(page_number: u32, readability: f64, degraded: bool, empty: bool) -> PageProfile {
        PageProfile {
            page_number,
            readability_score: readability,
            noise_level: NoiseLevel::Low,
            word_garbage_score: 0.0,
            quality_tier: tier_for(readability),
            char_count: 500,
            is_degraded: degraded,
            empty,
            propagated: None,
        }
    }

    #[test]
    fn median_readability_is_not_mean() {
        let profiles = vec![
            profile(1, 10.0, true, false),
            profile(2, 90.0, false, false),
            profile(3, 95.0, false, false),
        ];
        let doc = DocumentProfile::from_profiles(&profiles, 0.5);
        assert_eq!(doc.median_readability, 90.0);
    }

    #[test]
    fn mixed_quality_triggers_at_ratio() {
        let profiles = vec![
            profile(1, 10.0, true, false),
            profile(2, 10.0, true, false),
            profile(3, 90.0, false, false),
            profile(4, 90.0, false, false),
        ];
        let doc = DocumentProfile::from_profiles(&profiles, 0.5);
        assert!(doc.is_mixed_quality);
    }

    #[test]
    fn empty_pages_are_excluded_from_aggregation() {
        let mut empty_page = profile(5, 0.0, true, true);
        empty_page.char_count = 0;
        let profiles = vec![profile(1, 90.0, false, false), empty_page];
        let doc = DocumentProfile::from_profiles(&profiles, 0.5);
        assert_eq!(doc.median_readability, 90.0);
        assert_eq!(doc.clean_count, 1);
    }
}
