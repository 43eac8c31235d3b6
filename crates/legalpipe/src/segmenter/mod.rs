//! Segmenter (C6): heading-only boundary detection, paragraph-continuation
//! suppression, blank-page grouping, and type inference with a
//! profiler-fallback path.

mod rules;

use crate::classifier::classify;
use crate::types::{Classification, ClassificationSource, Page, Segment, SegmentType};
use once_cell::sync::Lazy;
use regex::Regex;
use rules::{is_blank_page, BOUNDARY_RULES};

const NEW_PIECE_WEIGHT_FLOOR: f64 = 0.7;
const STRUCTURAL_OVERRIDE_WEIGHT: f64 = 0.85;
const PROFILER_FALLBACK_CONFIDENCE: f64 = 0.20;

static NUMBERED_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}[.)\-]\s").expect("static pattern"));

fn heading_lines(text: &str, n: usize) -> String {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).take(n).collect::<Vec<_>>().join("\n")
}

struct Marker {
    name: &'static str,
    weight: f64,
    implies_type: &'static str,
}

fn markers_for(heading: &str) -> Vec<Marker> {
    BOUNDARY_RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(heading))
        .map(|rule| Marker {
            name: rule.name,
            weight: rule.weight,
            implies_type: rule.implies_type,
        })
        .collect()
}

/// Extracts the last numbered-paragraph marker (`K.`) within the page's last
/// 20 non-trivial lines, if any.
fn trailing_paragraph_number(text: &str) -> Option<u32> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(20);
    lines[start..]
        .iter()
        .rev()
        .find_map(|line| NUMBERED_PARAGRAPH.find(line).map(|m| m.as_str()))
        .and_then(|matched| matched.trim_end_matches(|c: char| !c.is_ascii_digit()).parse::<u32>().ok())
}

/// Extracts the first numbered-paragraph marker within the page's first 5
/// non-trivial lines, if any.
fn leading_paragraph_number(text: &str) -> Option<u32> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).take(5).collect();
    lines
        .iter()
        .find_map(|line| NUMBERED_PARAGRAPH.find(line).map(|m| m.as_str()))
        .and_then(|matched| matched.trim_end_matches(|c: char| !c.is_ascii_digit()).parse::<u32>().ok())
}

fn type_for_markers(markers: &[Marker]) -> &'static str {
    markers
        .iter()
        .max_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap())
        .map(|m| m.implies_type)
        .unwrap_or("unknown")
}

struct PageDecision {
    is_boundary: bool,
    markers: Vec<Marker>,
    is_blank: bool,
}

fn decide_page(pages: &[Page], index: usize) -> PageDecision {
    let text = &pages[index].text;
    let is_blank = is_blank_page(text);
    let heading = heading_lines(text, 3);
    let mut markers = markers_for(&heading);

    let mut is_boundary = markers.iter().any(|m| m.weight >= NEW_PIECE_WEIGHT_FLOOR);

    if is_boundary && index > 0 {
        if let (Some(prev_last), Some(curr_first)) = (
            trailing_paragraph_number(&pages[index - 1].text),
            leading_paragraph_number(text),
        ) {
            if curr_first == prev_last + 1 {
                let strongest = markers.iter().map(|m| m.weight).fold(0.0_f64, f64::max);
                if strongest < STRUCTURAL_OVERRIDE_WEIGHT {
                    is_boundary = false;
                    markers.clear();
                }
            }
        }
    }

    PageDecision { is_boundary, markers, is_blank }
}

/// Runs boundary detection and blank-page grouping over a document's pages,
/// producing dense, 1-origin `seg-NNN` segments. `doc_classification`
/// supplies the profiler-fallback type when a segment's own markers yield
/// `unknown`.
pub fn segment_pages(pages: &[Page], doc_classification: Option<&Classification>) -> Vec<Segment> {
    if pages.is_empty() {
        return Vec::new();
    }

    let decisions: Vec<PageDecision> = (0..pages.len()).map(|i| decide_page(pages, i)).collect();

    let mut segments: Vec<Segment> = Vec::new();
    let mut current_start = pages[0].page_number;
    let mut current_markers: Vec<&'static str> = Vec::new();
    let mut current_type_markers: Vec<Marker> = Vec::new();

    for (i, decision) in decisions.iter().enumerate() {
        let page_number = pages[i].page_number;
        let opens_new_piece = i > 0 && decision.is_boundary && !decision.is_blank;

        if opens_new_piece {
            segments.push(close_segment(current_start, pages[i - 1].page_number, &current_markers, &current_type_markers, doc_classification));
            current_start = page_number;
            current_markers = Vec::new();
            current_type_markers = Vec::new();
        }

        if !decision.is_blank {
            for marker in &decision.markers {
                current_markers.push(marker.name);
            }
        }
        // Collect typed markers (non-blank) for type inference, preferring the
        // opening page's markers but falling back to any seen within the piece.
        if current_type_markers.is_empty() {
            for marker in &decision.markers {
                current_type_markers.push(Marker {
                    name: marker.name,
                    weight: marker.weight,
                    implies_type: marker.implies_type,
                });
            }
        }
    }

    let last_page = pages.last().expect("non-empty pages checked above").page_number;
    segments.push(close_segment(current_start, last_page, &current_markers, &current_type_markers, doc_classification));

    segments
}

fn close_segment(
    start: u32,
    end: u32,
    markers: &[&'static str],
    type_markers: &[Marker],
    doc_classification: Option<&Classification>,
) -> Segment {
    let index = 0; // reassigned by caller via renumber_segments
    let _ = index;
    let inferred_type = type_for_markers(type_markers);

    let (doc_type, classification_source, confidence) = if inferred_type != "unknown" {
        (inferred_type.to_string(), ClassificationSource::BoundaryRules, 0.75)
    } else if let Some(doc_class) = doc_classification {
        if doc_class.confidence >= PROFILER_FALLBACK_CONFIDENCE {
            (doc_class.primary_type.clone(), ClassificationSource::ProfilerFallback, doc_class.confidence)
        } else {
            ("unknown".to_string(), ClassificationSource::BoundaryRules, 0.0)
        }
    } else {
        ("unknown".to_string(), ClassificationSource::BoundaryRules, 0.0)
    };

    Segment {
        segment_id: String::new(),
        segment_type: SegmentType::Piece,
        doc_type,
        classification_source,
        page_start: start,
        page_end: end,
        confidence,
        boundary_markers: markers.iter().map(|s| s.to_string()).collect(),
        classification_confidence: None,
        classification_indicators: None,
        l2_previous_type: None,
        l2_boost: None,
        l2_reasons: None,
        cascade_level: None,
    }
}

/// Assigns dense, 1-origin, zero-padded segment ids in place, after boundary
/// detection has produced the final ordered segment list.
pub fn renumber_segments(segments: &mut [Segment]) {
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.segment_id = Segment::id_for_index(i + 1);
    }
}

/// Re-runs the L1 classifier on each non-separator segment's own text
/// (heading/tail taken from the segment's first and last meaningful lines).
/// Overrides `doc_type` only when the new primary type is not `unknown` and
/// confident enough.
pub fn reclassify_segment_l1(segment: &mut Segment, segment_text: &str) {
    if segment.is_separator() {
        return;
    }
    let classification = classify(segment_text);
    if classification.primary_type != "unknown" && classification.confidence >= 0.30 {
        segment.doc_type = classification.primary_type.clone();
        segment.classification_source = ClassificationSource::PerSegmentL1;
        segment.confidence = classification.confidence;
        segment.classification_confidence = Some(classification.confidence);
        segment.classification_indicators = Some(classification.indicators);
    }
}
