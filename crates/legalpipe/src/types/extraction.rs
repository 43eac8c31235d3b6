use super::classification::Classification;
use super::page::Page;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentExtractionMethod {
    FastParse,
    OcrStandard,
    OcrEnhanced,
    ManualReview,
}

impl DocumentExtractionMethod {
    /// The kebab-case form used in reports and frontmatter.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentExtractionMethod::FastParse => "fast-parse",
            DocumentExtractionMethod::OcrStandard => "ocr-standard",
            DocumentExtractionMethod::OcrEnhanced => "ocr-enhanced",
            DocumentExtractionMethod::ManualReview => "manual-review",
        }
    }
}

/// The per-document result of the fallback chain `fast-parse -> ocr-standard
/// -> ocr-enhanced -> manual-review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub method: DocumentExtractionMethod,
    pub pages: Vec<Page>,
    pub overall_confidence: f64,
    pub fallback_triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_pages: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl ExtractedDocument {
    /// Mean confidence over non-empty pages, or 0.0 when every page is empty.
    pub fn mean_non_empty_confidence(pages: &[Page]) -> f64 {
        let non_empty: Vec<&Page> = pages.iter().filter(|p| !p.empty).collect();
        if non_empty.is_empty() {
            return 0.0;
        }
        non_empty.iter().map(|p| p.confidence).sum::<f64>() / non_empty.len() as f64
    }
}
