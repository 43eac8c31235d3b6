//! The 45+ rule classifier table, loaded once from an embedded JSON data
//! file so the rules can be audited or hand-edited without recompiling the
//! rest of the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

const RULES_JSON: &str = include_str!("rules.json");

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(rename = "type")]
    doc_type: String,
    patterns: Vec<String>,
    weight: f64,
}

pub struct Rule {
    pub doc_type: String,
    pub patterns: Vec<Regex>,
    pub weight: f64,
}

fn load_rules() -> Vec<Rule> {
    let raw: Vec<RawRule> = serde_json::from_str(RULES_JSON).expect("embedded rules.json is valid");
    raw.into_iter()
        .map(|r| Rule {
            doc_type: r.doc_type,
            patterns: r
                .patterns
                .iter()
                .map(|p| Regex::new(p).expect("embedded rule pattern compiles"))
                .collect(),
            weight: r.weight,
        })
        .collect()
}

pub static RULES: Lazy<Vec<Rule>> = Lazy::new(load_rules);
