//! L1 classifier: regex-cascade over a closed rule table, with a
//! disambiguation pass and a specificity bonus for more-specific types.

mod disambiguation;
mod rules;
pub mod valid_types;

pub use valid_types::{is_valid_type, VALID_TYPES};

use crate::types::Classification;
use rules::{Rule, RULES};

/// Fixed ordered list of (more-specific, more-general) type pairs. When the
/// more-specific type's rule matches, it receives a small bonus so it wins
/// ties against its more-general sibling.
const SPECIFICITY_PAIRS: &[(&str, &str)] = &[
    ("inicial-eef", "peticao-inicial"),
    ("inicial-execfiscal", "peticao-inicial"),
    ("acordao-carf", "acordao"),
    ("sentenca-edcl", "sentenca"),
    ("recurso-especial", "apelacao"),
    ("recurso-extraordinario", "apelacao"),
    ("contrarrazoes-especial", "contrarrazoes-apelacao"),
    ("agravo-interno", "agravo-instrumento"),
    ("certidao-publicacao", "certidao"),
    ("certidao-transito-julgado", "certidao"),
    ("mandado-intimacao", "oficio"),
    ("notificacao-fiscal", "oficio"),
];

const SPECIFICITY_BONUS: f64 = 0.05;

fn is_more_specific(doc_type: &str) -> bool {
    SPECIFICITY_PAIRS.iter().any(|(specific, _)| *specific == doc_type)
}

fn non_trivial_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

fn heading(text: &str) -> String {
    non_trivial_lines(text).into_iter().take(5).collect::<Vec<_>>().join("\n")
}

fn tail(text: &str) -> String {
    let lines = non_trivial_lines(text);
    let start = lines.len().saturating_sub(3);
    lines[start..].join("\n")
}

struct RuleScore {
    doc_type: String,
    confidence: f64,
    indicators: Vec<String>,
}

fn score_rule(rule: &Rule, body: &str, heading_text: &str, tail_text: &str) -> RuleScore {
    let mut matched_patterns = Vec::new();
    let mut heading_hits = 0usize;
    let mut tail_hits = 0usize;

    for pattern in &rule.patterns {
        if pattern.is_match(body) {
            matched_patterns.push(pattern.as_str().to_string());
        }
        if pattern.is_match(heading_text) {
            heading_hits += 1;
        }
        if pattern.is_match(tail_text) {
            tail_hits += 1;
        }
    }

    let body_component = (matched_patterns.len() as f64 / rule.patterns.len() as f64) * rule.weight;
    let heading_component = (0.15 * heading_hits as f64).min(0.30);
    let tail_component = (0.10 * tail_hits as f64).min(0.20);

    let mut confidence = (body_component + heading_component + tail_component).min(1.0);

    if is_more_specific(&rule.doc_type) && !matched_patterns.is_empty() {
        confidence = (confidence + SPECIFICITY_BONUS).min(1.0);
    }

    RuleScore {
        doc_type: rule.doc_type.clone(),
        confidence,
        indicators: matched_patterns,
    }
}

/// Applies the disambiguation table to a raw rule score: penalizes a
/// classification whose only matched indicators mention an entity in
/// passing, and one whose structural marker appears in the body but not the
/// heading.
fn apply_disambiguation(score: RuleScore, body: &str, heading_text: &str) -> (RuleScore, Option<crate::types::Disambiguation>) {
    let Some(rule) = disambiguation::rule_for(&score.doc_type) else {
        return (score, None);
    };

    let structural_in_body = rule.structural.iter().any(|p| p.is_match(body));
    let structural_in_heading = rule.structural.iter().any(|p| p.is_match(heading_text));
    let any_entity_only_matched = rule.entity_only.iter().any(|p| p.is_match(body));

    if any_entity_only_matched && !structural_in_body {
        let mut adjusted = score;
        adjusted.confidence *= 0.30;
        return (adjusted, Some(crate::types::Disambiguation::EntityMentionOnly));
    }

    if structural_in_body && !structural_in_heading {
        let mut adjusted = score;
        adjusted.confidence *= 0.70;
        return (adjusted, Some(crate::types::Disambiguation::StructuralNotInHeading));
    }

    (score, None)
}

/// Runs the full L1 cascade over one piece of text (a whole document, or a
/// single segment when re-run by the contextual reclassifier).
pub fn classify(text: &str) -> Classification {
    let heading_text = heading(text);
    let tail_text = tail(text);

    let mut scored: Vec<(RuleScore, Option<crate::types::Disambiguation>)> = RULES
        .iter()
        .map(|rule| {
            let score = score_rule(rule, text, &heading_text, &tail_text);
            apply_disambiguation(score, text, &heading_text)
        })
        .collect();

    scored.sort_by(|a, b| b.0.confidence.partial_cmp(&a.0.confidence).unwrap());

    let Some((top, top_disambiguation)) = scored.first() else {
        return Classification {
            primary_type: valid_types::UNKNOWN.to_string(),
            confidence: 0.0,
            indicators: Vec::new(),
            secondary_type: None,
            secondary_confidence: None,
            disambiguation: None,
            reclassified: None,
        };
    };

    if top.confidence <= 0.0 {
        return Classification {
            primary_type: valid_types::UNKNOWN.to_string(),
            confidence: 0.0,
            indicators: Vec::new(),
            secondary_type: None,
            secondary_confidence: None,
            disambiguation: None,
            reclassified: None,
        };
    }

    let (secondary_type, secondary_confidence) = if top.confidence < 0.80 {
        scored
            .get(1)
            .filter(|(s, _)| s.confidence > 0.0)
            .map(|(s, _)| (Some(s.doc_type.clone()), Some(s.confidence)))
            .unwrap_or((None, None))
    } else {
        (None, None)
    };

    Classification {
        primary_type: top.doc_type.clone(),
        confidence: top.confidence,
        indicators: top.indicators.clone(),
        secondary_type,
        secondary_confidence,
        disambiguation: *top_disambiguation,
        reclassified: None,
    }
    .collapse_if_invalid(is_valid_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentenca_body_classifies_as_sentenca() {
        let text = "SENTENÇA\n\nVistos.\n\nAnte o exposto, julgo procedente o pedido formulado \
            pelo autor. Condeno o réu ao pagamento da indenização. P.R.I.";
        let classification = classify(text);
        assert_eq!(classification.primary_type, "sentenca");
        assert!(classification.confidence > 0.5);
    }

    #[test]
    fn entity_mention_only_is_penalized() {
        let text = "Este documento menciona de passagem uma sentença anterior proferida \
            em outro processo, mas não é ele próprio uma decisão de mérito, apenas um anexo \
            informativo sobre custas processuais e recolhimento de taxas.";
        let classification = classify(text);
        if classification.primary_type == "sentenca" {
            assert!(classification.confidence <= 0.30 * 0.90 + 0.01);
        }
    }

    #[test]
    fn unrelated_text_collapses_to_unknown_or_low_confidence() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
        let classification = classify(text);
        assert!(classification.primary_type == "unknown" || classification.confidence < 0.5);
    }

    #[test]
    fn specific_type_outscores_general_sibling_on_tie() {
        let text = "EXECUÇÃO FISCAL\n\nCertidão de Dívida Ativa nº 123/2020. \
            Vem a Fazenda Pública propor a presente execução fiscal em face do executado.";
        let classification = classify(text);
        assert!(["inicial-eef", "inicial-execfiscal"].contains(&classification.primary_type.as_str()));
    }
}
