use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteMethod {
    FastParse,
    OcrStandard,
    OcrEnhanced,
    ManualReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preprocessing {
    AutoRotate,
    Deskew,
    Denoise,
    ContrastEnhance,
    Binarize,
}

/// Document-level routing decision, produced from a [`super::DocumentProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub file: String,
    pub method: RouteMethod,
    pub engine: String,
    pub preprocessing: Vec<Preprocessing>,
    pub rationale: String,
    pub quality_tier: super::page::QualityTier,
    pub readability_score: f64,
    pub routed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRouteMethod {
    FastParse,
    OcrStandard,
    OcrEnhanced,
    Skip,
}

/// Per-page routing decision, produced from a [`super::page::PageProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRoute {
    pub page: u32,
    pub method: PageRouteMethod,
    pub needs_ocr: bool,
    pub reason: String,
}
