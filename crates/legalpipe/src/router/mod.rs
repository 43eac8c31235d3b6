//! Page Router (C5): maps a document-level profile to a fetch strategy, and
//! a page-level profile to a per-page route.

use crate::types::{
    DocumentProfile, PageProfile, PageRoute, PageRouteMethod, Preprocessing, RouteDecision, RouteMethod,
};
use chrono::Utc;

/// Document-level routing table, per the fixed condition ladder: text layer
/// and high readability stays on the fast path; degraded documents escalate
/// through OCR tiers with increasing preprocessing; the worst tier is
/// flagged for manual review.
pub fn route_document(file: &str, profile: &DocumentProfile, orientation_abnormal: bool, skew_detected: bool) -> RouteDecision {
    let readability = profile.median_readability;

    let (method, engine, mut preprocessing, rationale) = if profile.has_text_layer && readability >= 80.0 {
        (RouteMethod::FastParse, "pdf-parse", vec![], "text layer present, high readability")
    } else if profile.has_text_layer && readability >= 60.0 {
        (RouteMethod::FastParse, "pdf-parse", vec![], "text layer present, acceptable readability")
    } else if readability >= 60.0 {
        (RouteMethod::OcrStandard, "tesseract", vec![Preprocessing::Deskew], "no reliable text layer, good readability")
    } else if readability >= 40.0 {
        (
            RouteMethod::OcrEnhanced,
            "tesseract",
            vec![Preprocessing::Deskew, Preprocessing::Denoise],
            "degraded readability, enhanced OCR needed",
        )
    } else if readability >= 20.0 {
        (
            RouteMethod::OcrEnhanced,
            "tesseract",
            vec![
                Preprocessing::Deskew,
                Preprocessing::Denoise,
                Preprocessing::ContrastEnhance,
                Preprocessing::Binarize,
            ],
            "severely degraded readability, full preprocessing",
        )
    } else {
        (RouteMethod::ManualReview, "none", vec![], "readability too low for automated extraction")
    };

    if orientation_abnormal && !preprocessing.contains(&Preprocessing::AutoRotate) {
        preprocessing.push(Preprocessing::AutoRotate);
    }
    if skew_detected && !preprocessing.contains(&Preprocessing::Deskew) {
        preprocessing.push(Preprocessing::Deskew);
    }

    RouteDecision {
        file: file.to_string(),
        method,
        engine: engine.to_string(),
        preprocessing,
        rationale: rationale.to_string(),
        quality_tier: profile.quality_tier,
        readability_score: readability,
        routed_at: Utc::now(),
    }
}

/// Per-page routing: `empty -> skip`; clean pages stay on the fast path;
/// degraded pages escalate to standard or enhanced OCR by readability.
pub fn route_page(profile: &PageProfile) -> PageRoute {
    if profile.empty {
        return PageRoute {
            page: profile.page_number,
            method: PageRouteMethod::Skip,
            needs_ocr: false,
            reason: "page is empty".to_string(),
        };
    }

    if !profile.is_degraded {
        return PageRoute {
            page: profile.page_number,
            method: PageRouteMethod::FastParse,
            needs_ocr: false,
            reason: "page is not degraded".to_string(),
        };
    }

    if profile.readability_score >= 40.0 {
        PageRoute {
            page: profile.page_number,
            method: PageRouteMethod::OcrStandard,
            needs_ocr: true,
            reason: "degraded but readability still moderate".to_string(),
        }
    } else {
        PageRoute {
            page: profile.page_number,
            method: PageRouteMethod::OcrEnhanced,
            needs_ocr: true,
            reason: "degraded with low readability".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NoiseLevel, QualityTier};

    fn doc_profile(has_text_layer: bool, readability: f64) -> DocumentProfile {
        DocumentProfile {
            median_readability: readability,
            quality_tier: QualityTier::A,
            noise_level: NoiseLevel::Low,
            degraded_pages: vec![],
            degraded_count: 0,
            clean_count: 1,
            is_mixed_quality: false,
            has_text_layer,
        }
    }

    #[test]
    fn text_layer_and_high_readability_routes_fast_parse() {
        let decision = route_document("a.pdf", &doc_profile(true, 90.0), false, false);
        assert_eq!(decision.method, RouteMethod::FastParse);
        assert!(decision.preprocessing.is_empty());
    }

    #[test]
    fn no_text_layer_moderate_readability_routes_ocr_standard_with_deskew() {
        let decision = route_document("a.pdf", &doc_profile(false, 65.0), false, false);
        assert_eq!(decision.method, RouteMethod::OcrStandard);
        assert!(decision.preprocessing.contains(&Preprocessing::Deskew));
    }

    #[test]
    fn very_low_readability_routes_manual_review() {
        let decision = route_document("a.pdf", &doc_profile(false, 10.0), false, false);
        assert_eq!(decision.method, RouteMethod::ManualReview);
    }

    #[test]
    fn orientation_abnormal_adds_auto_rotate_without_duplication() {
        let decision = route_document("a.pdf", &doc_profile(false, 65.0), true, true);
        let rotate_count = decision.preprocessing.iter().filter(|p| **p == Preprocessing::AutoRotate).count();
        assert_eq!(rotate_count, 1);
    }

    fn page_profile(empty: bool, degraded: bool, readability: f64) -> PageProfile {
        PageProfile {
            page_number: 1,
            readability_score: readability,
            noise_level: NoiseLevel::Low,
            word_garbage_score: 0.0,
            quality_tier: QualityTier::A,
            char_count: 500,
            is_degraded: degraded,
            empty,
            propagated: None,
        }
    }

    #[test]
    fn empty_page_routes_to_skip() {
        let route = route_page(&page_profile(true, false, 0.0));
        assert_eq!(route.method, PageRouteMethod::Skip);
        assert!(!route.needs_ocr);
    }

    #[test]
    fn clean_page_routes_to_fast_parse() {
        let route = route_page(&page_profile(false, false, 90.0));
        assert_eq!(route.method, PageRouteMethod::FastParse);
    }

    #[test]
    fn degraded_low_readability_page_routes_to_ocr_enhanced() {
        let route = route_page(&page_profile(false, true, 20.0));
        assert_eq!(route.method, PageRouteMethod::OcrEnhanced);
        assert!(route.needs_ocr);
    }
}
