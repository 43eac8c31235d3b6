use serde::{Deserialize, Serialize};

/// How a page's text was ultimately obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Per-page `pdftotext` invocation, the normal path.
    FastParsePoppler,
    /// `pdftotext` absent; recovered via form-feed splits of a full-document parse.
    FastParseFormfeed,
    /// `pdftotext` absent and form-feed recovery was unreliable; the
    /// document text was divided into `page_count` equal character chunks.
    FastParseChunked,
    OcrStandard,
    OcrEnhanced,
}

/// One page's extracted text plus the provenance needed to arbitrate
/// between the fast-parse and OCR candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
    pub confidence: f64,
    pub empty: bool,
    pub method: ExtractionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_applied: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_garbage_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_replaced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_fallback_to_fp: Option<bool>,
}

impl Page {
    /// A page is empty when its text is too short to be meaningful, per the
    /// fixed character floor, or when extraction produced nothing at all.
    pub fn compute_empty(text: &str, char_floor: usize) -> bool {
        text.trim().chars().count() < char_floor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    A,
    B,
    C,
    D,
    F,
}

/// Per-page quality signals computed by the profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageProfile {
    pub page_number: u32,
    pub readability_score: f64,
    pub noise_level: NoiseLevel,
    pub word_garbage_score: f64,
    pub quality_tier: QualityTier,
    pub char_count: usize,
    pub is_degraded: bool,
    pub empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagated: Option<bool>,
}
