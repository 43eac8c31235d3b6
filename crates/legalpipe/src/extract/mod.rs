//! Text extraction: the bootstrap fast parse used before profiling, and the
//! three-mode (fast-parse / ocr-standard / ocr-enhanced) extraction the
//! router chooses between, plus the hybrid merge and its fallback chain.

pub mod capability;
mod fast_parse;
mod hybrid;
mod ocr;
mod postprocess;

pub use capability::Capabilities;
pub use fast_parse::fast_parse_per_page;
pub use hybrid::extract_hybrid;
pub use ocr::{ocr_single_page, ocr_single_page_with_retry};

use crate::config::PipelineConfig;
use crate::types::{DocumentExtractionMethod, ExtractedDocument, Page};
use std::path::Path;

/// Runs the whole-document fallback chain: `fast-parse -> ocr-standard ->
/// ocr-enhanced -> manual-review`, advancing whenever `overall_confidence`
/// falls below the configured threshold.
pub fn extract(pdf: &Path, page_count: u32, caps: &Capabilities, cfg: &PipelineConfig) -> ExtractedDocument {
    let fast_pages = fast_parse_per_page(pdf, page_count, caps, cfg);
    let fast_confidence = ExtractedDocument::mean_non_empty_confidence(&fast_pages);

    if fast_confidence >= cfg.extraction_fallback_confidence {
        return ExtractedDocument {
            method: DocumentExtractionMethod::FastParse,
            pages: fast_pages,
            overall_confidence: fast_confidence,
            fallback_triggered: false,
            ocr_pages: None,
            ocr_method: None,
            classification: None,
        };
    }

    if !caps.ocr.is_available() {
        return ExtractedDocument {
            method: DocumentExtractionMethod::ManualReview,
            pages: fast_pages,
            overall_confidence: fast_confidence,
            fallback_triggered: true,
            ocr_pages: None,
            ocr_method: None,
            classification: None,
        };
    }

    let standard_pages: Vec<Page> = (1..=page_count)
        .map(|page_number| ocr::ocr_single_page_with_retry(pdf, page_number, false, caps, cfg))
        .collect();
    let standard_confidence = ExtractedDocument::mean_non_empty_confidence(&standard_pages);

    if standard_confidence >= cfg.extraction_fallback_confidence {
        return ExtractedDocument {
            method: DocumentExtractionMethod::OcrStandard,
            pages: standard_pages,
            overall_confidence: standard_confidence,
            fallback_triggered: true,
            ocr_pages: Some((1..=page_count).collect()),
            ocr_method: Some("tesseract-standard".to_string()),
            classification: None,
        };
    }

    let enhanced_pages: Vec<Page> = (1..=page_count)
        .map(|page_number| ocr::ocr_single_page_with_retry(pdf, page_number, true, caps, cfg))
        .collect();
    let enhanced_confidence = ExtractedDocument::mean_non_empty_confidence(&enhanced_pages);

    if enhanced_confidence >= cfg.extraction_fallback_confidence {
        ExtractedDocument {
            method: DocumentExtractionMethod::OcrEnhanced,
            pages: enhanced_pages,
            overall_confidence: enhanced_confidence,
            fallback_triggered: true,
            ocr_pages: Some((1..=page_count).collect()),
            ocr_method: Some("tesseract-enhanced".to_string()),
            classification: None,
        }
    } else {
        ExtractedDocument {
            method: DocumentExtractionMethod::ManualReview,
            pages: enhanced_pages,
            overall_confidence: enhanced_confidence,
            fallback_triggered: true,
            ocr_pages: Some((1..=page_count).collect()),
            ocr_method: Some("tesseract-enhanced".to_string()),
            classification: None,
        }
    }
}
