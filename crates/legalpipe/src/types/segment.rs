use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentType {
    Piece,
    Attachment,
    Exhibit,
    Cover,
    Separator,
}

impl SegmentType {
    /// The kebab-case form used in filenames and frontmatter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Piece => "piece",
            SegmentType::Attachment => "attachment",
            SegmentType::Exhibit => "exhibit",
            SegmentType::Cover => "cover",
            SegmentType::Separator => "separator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationSource {
    BoundaryRules,
    ProfilerFallback,
    PerSegmentL1,
    PerSegmentL2,
}

/// A contiguous page range classified as one procedural piece. The only
/// entity that keeps being decorated after its producing stage: boundary
/// detection creates it, per-segment L1 may override `doc_type`, and L2 may
/// adjust `confidence` again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub segment_id: String,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub doc_type: String,
    pub classification_source: ClassificationSource,
    pub page_start: u32,
    pub page_end: u32,
    pub confidence: f64,
    pub boundary_markers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_indicators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_previous_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_boost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2_reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_level: Option<u8>,
}

impl Segment {
    /// Formats a 1-origin segment index as `seg-NNN`, per the dense, padded
    /// identifier scheme.
    pub fn id_for_index(index_one_based: usize) -> String {
        format!("seg-{index_one_based:03}")
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.segment_type, SegmentType::Separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_padded_to_three_digits() {
        assert_eq!(Segment::id_for_index(1), "seg-001");
        assert_eq!(Segment::id_for_index(42), "seg-042");
        assert_eq!(Segment::id_for_index(123), "seg-123");
    }
}
