//! The mislabel-rule table, loaded once from an embedded JSON data file, the
//! same way the classifier's rule table is loaded. Doc-types without a rule
//! here are simply not checked by the mislabel pass.
//!
//! Every pattern in a rule's `required_patterns` must match the segment body
//! (AND semantics): a `sentenca` rule requiring both a `julg…` stem and a
//! `procedente|improcedente` verdict only passes when both appear.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

const MISLABEL_RULES_JSON: &str = include_str!("mislabel_rules.json");

#[derive(Debug, Deserialize)]
struct RawMislabelRule {
    #[serde(rename = "type")]
    doc_type: String,
    required_patterns: Vec<String>,
}

pub struct MislabelRule {
    pub doc_type: String,
    pub required_patterns: Vec<Regex>,
}

impl MislabelRule {
    /// Whether `body` satisfies every required pattern.
    pub fn is_satisfied_by(&self, body: &str) -> bool {
        self.required_patterns.iter().all(|p| p.is_match(body))
    }
}

fn load_rules() -> Vec<MislabelRule> {
    let raw: Vec<RawMislabelRule> = serde_json::from_str(MISLABEL_RULES_JSON).expect("embedded mislabel_rules.json is valid");
    raw.into_iter()
        .map(|r| MislabelRule {
            doc_type: r.doc_type,
            required_patterns: r
                .required_patterns
                .iter()
                .map(|p| Regex::new(p).expect("embedded mislabel pattern compiles"))
                .collect(),
        })
        .collect()
}

pub static MISLABEL_RULES: Lazy<Vec<MislabelRule>> = Lazy::new(load_rules);

pub fn rule_for(doc_type: &str) -> Option<&'static MislabelRule> {
    MISLABEL_RULES.iter().find(|r| r.doc_type == doc_type)
}

/// A closed map from a filename token (matched case-insensitively as a
/// substring) to the doc-type it implies. Used by the filename-vs-classification
/// cross-check.
pub const FILENAME_KEYWORDS: &[(&str, &str)] = &[
    ("inicial", "peticao-inicial"),
    ("sentenca", "sentenca"),
    ("acordao", "acordao"),
    ("decisao", "decisao"),
    ("despacho", "despacho"),
    ("contestacao", "contestacao"),
    ("impugnacao", "impugnacao"),
    ("apelacao", "apelacao"),
    ("agravo", "agravo-instrumento"),
    ("certidao", "certidao"),
    ("oficio", "oficio"),
    ("edcl", "edcl"),
    ("embargos", "embargos-declaracao"),
    ("laudo", "laudo-pericial"),
];

/// The doc-type implied by a source filename's tokens, if any keyword matches.
pub fn expected_doc_type_for_filename(filename: &str) -> Option<&'static str> {
    let lower = filename.to_lowercase();
    FILENAME_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw)).map(|(_, t)| *t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mislabel_table_has_around_twenty_entries() {
        assert!(MISLABEL_RULES.len() >= 18, "got {}", MISLABEL_RULES.len());
    }

    #[test]
    fn sentenca_rule_requires_both_patterns() {
        let rule = rule_for("sentenca").expect("sentenca has a rule");
        assert!(rule.is_satisfied_by("Vistos. Ante o exposto, julgo procedente o pedido. P.R.I."));
        assert!(!rule.is_satisfied_by("Ofício ao delegado."));
    }

    #[test]
    fn filename_keyword_lookup_is_case_insensitive() {
        assert_eq!(expected_doc_type_for_filename("Inicial_EF.pdf"), Some("peticao-inicial"));
        assert_eq!(expected_doc_type_for_filename("Decisao-liminar-MS.pdf"), Some("decisao"));
        assert_eq!(expected_doc_type_for_filename("random.pdf"), None);
    }
}
