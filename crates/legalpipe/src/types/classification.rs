use serde::{Deserialize, Serialize};

/// Why a classification's confidence was adjusted from its raw rule score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disambiguation {
    EntityMentionOnly,
    StructuralNotInHeading,
}

/// Output of the L1 (and re-run L1/L2) classifier for a document or segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub primary_type: String,
    pub confidence: f64,
    pub indicators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<Disambiguation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclassified: Option<bool>,
}

impl Classification {
    pub const UNKNOWN: &'static str = "unknown";

    /// The invariant every classification must satisfy: a primary type not in
    /// the whitelist collapses to `unknown`, never errors.
    pub fn collapse_if_invalid(mut self, is_valid: impl Fn(&str) -> bool) -> Self {
        if !is_valid(&self.primary_type) {
            self.primary_type = Self::UNKNOWN.to_string();
        }
        if let Some(secondary) = &self.secondary_type {
            if !is_valid(secondary) {
                self.secondary_type = None;
                self.secondary_confidence = None;
            }
        }
        self
    }
}
