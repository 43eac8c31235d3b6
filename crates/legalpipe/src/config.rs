//! Pipeline configuration.
//!
//! Every threshold mentioned in the design notes is an explicit field here
//! rather than a literal scattered through the stage modules. `PipelineConfig`
//! implements `Default` with the values the specification fixes, and can be
//! overlaid from a TOML/YAML/JSON file on disk using the same discovery
//! convention the rest of the ecosystem uses: an explicit path, or else a
//! `legalpipe.{toml,yaml,json}` found by walking up from the current directory.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// All tunable constants for the six-stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Readability-tier cutoffs, highest to lowest: A, B, C, D. Below the last is F.
    pub readability_tier_thresholds: [u8; 4],
    /// Fraction of non-empty pages that must be degraded before propagating
    /// degradation to the whole document.
    pub degraded_ratio_propagate: f64,
    /// Fraction of non-empty pages a header/footer fingerprint must appear on
    /// to be considered recurring chrome.
    pub repetitive_threshold: f64,
    /// Lines scanned from the top of a page when fingerprinting headers.
    pub header_lines: usize,
    /// Lines scanned from the bottom of a page when fingerprinting footers.
    pub footer_lines: usize,
    /// Rasterization DPI for standard OCR.
    pub ocr_dpi_standard: u32,
    /// Rasterization DPI for enhanced OCR.
    pub ocr_dpi_enhanced: u32,
    /// Overall confidence below which the extraction fallback chain advances.
    pub extraction_fallback_confidence: f64,
    /// Garbage-score gate above which rotation retry is attempted.
    pub rotation_garbage_gate: f64,
    /// Garbage score below which a rotation retry exits early.
    pub rotation_early_exit: f64,
    /// Confidence a page is clamped to when its chosen text is still garbage above 0.3.
    pub garbage_penalty_confidence: f64,
    /// Per-page fast-text-extraction timeout.
    pub text_extract_timeout_ms: u64,
    /// Per-page rasterization timeout.
    pub rasterize_timeout_ms: u64,
    /// Per-page OCR timeout.
    pub ocr_timeout_ms: u64,
    /// Per-image rotation timeout.
    pub rotate_timeout_ms: u64,
    /// Minimum text length in characters below which a page is `empty`.
    pub empty_page_char_threshold: usize,
    /// Readability score below which a page is considered degraded.
    pub degraded_readability_threshold: f64,
    /// Word-garbage score at/above which a page is considered degraded.
    pub degraded_garbage_threshold: f64,
    /// Char count below which a page is considered degraded regardless of other signals.
    pub degraded_char_count_threshold: usize,
    /// QC: body length below which a segment's exported Markdown is rejected as empty.
    pub qc_empty_body_chars: usize,
    /// QC: extraction confidence below which a file is flagged (not rejected).
    pub qc_extraction_confidence_floor: f64,
    /// QC: segmentation confidence below which a file is flagged (not rejected).
    pub qc_segmentation_confidence_floor: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            readability_tier_thresholds: [80, 60, 40, 20],
            degraded_ratio_propagate: 0.5,
            repetitive_threshold: 0.4,
            header_lines: 12,
            footer_lines: 8,
            ocr_dpi_standard: 300,
            ocr_dpi_enhanced: 400,
            extraction_fallback_confidence: 0.6,
            rotation_garbage_gate: 0.4,
            rotation_early_exit: 0.2,
            garbage_penalty_confidence: 0.4,
            text_extract_timeout_ms: 15_000,
            rasterize_timeout_ms: 30_000,
            ocr_timeout_ms: 60_000,
            rotate_timeout_ms: 10_000,
            empty_page_char_threshold: 50,
            degraded_readability_threshold: 60.0,
            degraded_garbage_threshold: 0.15,
            degraded_char_count_threshold: 50,
            qc_empty_body_chars: 50,
            qc_extraction_confidence_floor: 0.7,
            qc_segmentation_confidence_floor: 0.6,
        }
    }
}

impl PipelineConfig {
    /// Loads configuration the way the CLI does: an explicit path if given,
    /// otherwise a `legalpipe.{toml,yaml,json}` discovered by walking up from
    /// `start_dir`. Returns the default configuration if nothing is found.
    pub fn load(explicit_path: Option<&Path>, start_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }
        if let Some(path) = discover_config_file(start_dir) {
            return Self::from_file(&path);
        }
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&raw).map_err(|e| PipelineError::Config {
                message: format!("invalid TOML in {}: {e}", path.display()),
            }),
            Some("yaml") | Some("yml") => serde_yaml_ng::from_str(&raw).map_err(|e| PipelineError::Config {
                message: format!("invalid YAML in {}: {e}", path.display()),
            }),
            Some("json") => serde_json::from_str(&raw).map_err(|e| PipelineError::Config {
                message: format!("invalid JSON in {}: {e}", path.display()),
            }),
            _ => Err(PipelineError::Config {
                message: format!("unrecognized config extension for {}", path.display()),
            }),
        }
    }

    /// The tier for a readability score, per §4.3.
    pub fn tier_for_readability(&self, score: f64) -> crate::types::QualityTier {
        use crate::types::QualityTier::*;
        let [a, b, c, d] = self.readability_tier_thresholds;
        if score >= a as f64 {
            A
        } else if score >= b as f64 {
            B
        } else if score >= c as f64 {
            C
        } else if score >= d as f64 {
            D
        } else {
            F
        }
    }
}

fn discover_config_file(start_dir: &Path) -> Option<PathBuf> {
    let names = ["legalpipe.toml", "legalpipe.yaml", "legalpipe.json"];
    let mut dir = Some(start_dir.to_path_buf());
    while let Some(current) = dir {
        for name in &names {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        dir = current.parent().map(Path::to_path_buf);
    }
    None
}
