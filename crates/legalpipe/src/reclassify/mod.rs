//! Contextual Reclassifier (C7): the L1 per-segment re-run (5.5) followed by
//! the L2 positional/contextual pass (5.6).

mod transitions;

use crate::segmenter::reclassify_segment_l1;
use crate::types::{ClassificationSource, Segment};
use transitions::{is_known_predecessor, probable_successors, INITIATOR_TYPES, PDF_CONTEXT_PROMOTIONS, RESPONSE_TYPES};

const SUCCESSOR_BOOST: f64 = 0.15;
const IMPOSSIBLE_INITIATOR_PENALTY: f64 = -0.20;
const INDEX_ZERO_INITIATOR_BOOST: f64 = 0.10;
const INDEX_ZERO_RESPONSE_PENALTY: f64 = -0.15;
const DUPLICATE_INICIAL_PENALTY: f64 = -0.25;
const PDF_AGREEMENT_BOOST_CONFIDENT: f64 = 0.05;
const PDF_AGREEMENT_BOOST_UNCERTAIN: f64 = 0.10;
const PDF_AGREEMENT_CONFIDENCE_FLOOR: f64 = 0.8;
const FALLBACK_TO_SECONDARY_THRESHOLD: f64 = 0.5;

/// Runs stage 5.5: re-runs the L1 classifier on each non-separator segment's
/// own text, given as `(segment_index, segment_text)` pairs.
pub fn run_l1_pass(segments: &mut [Segment], segment_texts: &[(usize, String)]) {
    for (index, text) in segment_texts {
        if let Some(segment) = segments.get_mut(*index) {
            reclassify_segment_l1(segment, text);
        }
    }
}

/// Runs stage 5.6: positional/contextual boosts against the previous
/// non-separator segment's type, index-0 initiator/response adjustments,
/// duplicate-`inicial-*` penalty, and PDF-context promotion/agreement.
/// `pdf_type` is the whole-document classification's primary type, if any.
pub fn run_l2_pass(segments: &mut [Segment], pdf_type: Option<&str>, pdf_confidence: f64) {
    let mut previous_type: Option<String> = None;
    let mut seen_inicial = false;
    let mut non_separator_index = 0usize;

    for i in 0..segments.len() {
        if segments[i].is_separator() {
            continue;
        }

        // Already adjusted by a prior run of this pass: re-running must be a
        // no-op on doc_type/confidence (idempotence), but bookkeeping for
        // later segments in this call still needs the current type.
        let already_l2 = segments[i].cascade_level == Some(2);

        if !already_l2 {
            if let Some(pdf) = pdf_type {
                if let Some((_, promoted_to)) = PDF_CONTEXT_PROMOTIONS.iter().find(|(p, _)| *p == pdf) {
                    if segments[i].doc_type == *promoted_to {
                        segments[i].doc_type = "inicial-eef".to_string();
                    }
                }
            }
        }
        let current_type = segments[i].doc_type.clone();

        if !already_l2 {
            let mut boost = 0.0;
            let mut reasons: Vec<String> = Vec::new();

            if let Some(prev) = &previous_type {
                if let Some(successors) = probable_successors(prev) {
                    if successors.contains(&current_type.as_str()) {
                        boost += SUCCESSOR_BOOST;
                        reasons.push(format!("probable successor of {prev}"));
                    } else if is_known_predecessor(prev) && INITIATOR_TYPES.contains(&current_type.as_str()) {
                        boost += IMPOSSIBLE_INITIATOR_PENALTY;
                        reasons.push(format!("impossible initiator after {prev}"));
                    }
                }
            } else if non_separator_index == 0 {
                if INITIATOR_TYPES.contains(&current_type.as_str()) {
                    boost += INDEX_ZERO_INITIATOR_BOOST;
                    reasons.push("initiator type at document start".to_string());
                } else if RESPONSE_TYPES.contains(&current_type.as_str()) {
                    boost += INDEX_ZERO_RESPONSE_PENALTY;
                    reasons.push("response type at document start".to_string());
                }
            }

            if current_type.starts_with("inicial-") || current_type == "peticao-inicial" {
                if seen_inicial {
                    boost += DUPLICATE_INICIAL_PENALTY;
                    reasons.push("duplicate inicial-* in document".to_string());
                }
            }

            if let Some(pdf) = pdf_type {
                if current_type == pdf {
                    if pdf_confidence >= PDF_AGREEMENT_CONFIDENCE_FLOOR {
                        boost += PDF_AGREEMENT_BOOST_CONFIDENT;
                        reasons.push("agrees with confident pdf classification".to_string());
                    } else {
                        boost += PDF_AGREEMENT_BOOST_UNCERTAIN;
                        reasons.push("agrees with pdf classification".to_string());
                    }
                }
            }

            let original_confidence = segments[i].confidence;
            let adjusted = (original_confidence + boost).clamp(0.0, 1.0);

            if adjusted < FALLBACK_TO_SECONDARY_THRESHOLD && adjusted < original_confidence {
                // Secondary-type fallback would apply here if the L1 pass had
                // recorded one; per-segment L1 does not currently populate
                // secondary_type, so the adjusted primary stands.
            }

            segments[i].confidence = adjusted;
            segments[i].classification_source = ClassificationSource::PerSegmentL2;
            segments[i].l2_previous_type = previous_type.clone();
            segments[i].l2_boost = Some(boost);
            segments[i].l2_reasons = if reasons.is_empty() { None } else { Some(reasons) };
            segments[i].cascade_level = Some(2);
        }

        if current_type.starts_with("inicial-") || current_type == "peticao-inicial" {
            seen_inicial = true;
        }

        previous_type = Some(current_type);
        non_separator_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SegmentType;

    fn segment(doc_type: &str, confidence: f64) -> Segment {
        Segment {
            segment_id: "seg-001".to_string(),
            segment_type: SegmentType::Piece,
            doc_type: doc_type.to_string(),
            classification_source: ClassificationSource::BoundaryRules,
            page_start: 1,
            page_end: 1,
            confidence,
            boundary_markers: vec![],
            classification_confidence: None,
            classification_indicators: None,
            l2_previous_type: None,
            l2_boost: None,
            l2_reasons: None,
            cascade_level: None,
        }
    }

    #[test]
    fn probable_successor_gets_boosted() {
        let mut segments = vec![segment("sentenca", 0.7), segment("edcl", 0.6)];
        run_l2_pass(&mut segments, None, 0.0);
        assert!(segments[1].confidence > 0.6);
        assert_eq!(segments[1].cascade_level, Some(2));
    }

    #[test]
    fn impossible_initiator_after_known_predecessor_is_penalized() {
        let mut segments = vec![segment("sentenca", 0.7), segment("peticao-inicial", 0.8)];
        run_l2_pass(&mut segments, None, 0.0);
        assert!(segments[1].confidence < 0.8);
    }

    #[test]
    fn duplicate_inicial_within_document_is_penalized() {
        let mut segments = vec![segment("peticao-inicial", 0.8), segment("despacho", 0.6), segment("peticao-inicial", 0.8)];
        run_l2_pass(&mut segments, None, 0.0);
        assert!(segments[2].confidence < 0.8);
    }

    #[test]
    fn l2_pass_is_idempotent_given_the_same_prior_type_sequence() {
        let mut first = vec![segment("sentenca", 0.7), segment("edcl", 0.6)];
        run_l2_pass(&mut first, None, 0.0);
        let mut second = first.clone();
        run_l2_pass(&mut second, None, 0.0);
        assert_eq!(first[1].doc_type, second[1].doc_type);
    }
}
