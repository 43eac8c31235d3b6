//! Hybrid extraction: merges the fast-parse pass with OCR on pages the
//! router flagged, keeping whichever candidate has the lower garbage score.

use super::capability::Capabilities;
use super::ocr::ocr_single_page_with_retry;
use crate::config::PipelineConfig;
use crate::profiler::word_garbage_score;
use crate::types::{DocumentExtractionMethod, ExtractedDocument, Page, PageRoute, PageRouteMethod};
use std::path::Path;

/// For each page flagged `needs_ocr`, runs OCR (with rotation retry), then
/// keeps whichever of the OCR and fast-parse candidates has the lower
/// garbage score. A chosen candidate still above the 0.3 garbage floor has
/// its confidence clamped and is marked accordingly.
pub fn extract_hybrid(
    pdf: &Path,
    fast_pages: &[Page],
    page_routes: &[PageRoute],
    caps: &Capabilities,
    cfg: &PipelineConfig,
) -> ExtractedDocument {
    let mut pages: Vec<Page> = Vec::with_capacity(fast_pages.len());
    let mut ocr_pages = Vec::new();

    for fast_page in fast_pages {
        let route = page_routes.iter().find(|r| r.page == fast_page.page_number);
        let needs_ocr = route.map(|r| r.needs_ocr).unwrap_or(false);

        if !needs_ocr {
            pages.push(fast_page.clone());
            continue;
        }

        let enhanced = matches!(route.map(|r| r.method), Some(PageRouteMethod::OcrEnhanced));
        let ocr_page = ocr_single_page_with_retry(pdf, fast_page.page_number, enhanced, caps, cfg);
        ocr_pages.push(fast_page.page_number);

        let ocr_garbage = ocr_page.word_garbage_score.unwrap_or_else(|| word_garbage_score(&ocr_page.text));
        let fast_garbage = word_garbage_score(&fast_page.text);

        let mut chosen = if ocr_garbage <= fast_garbage { ocr_page } else { fast_page.clone() };
        let chosen_garbage = ocr_garbage.min(fast_garbage);

        if chosen_garbage > 0.3 {
            chosen.confidence = cfg.garbage_penalty_confidence;
            if ocr_garbage <= fast_garbage {
                chosen.ocr_replaced = Some(true);
            } else {
                chosen.ocr_fallback_to_fp = Some(true);
            }
        }

        pages.push(chosen);
    }

    let overall_confidence = ExtractedDocument::mean_non_empty_confidence(&pages);

    ExtractedDocument {
        method: DocumentExtractionMethod::OcrStandard,
        pages,
        overall_confidence,
        fallback_triggered: false,
        ocr_pages: if ocr_pages.is_empty() { None } else { Some(ocr_pages) },
        ocr_method: None,
        classification: None,
    }
}
