//! Boundary-detection rules: ten markers, each with a weight in `[0.6, 0.9]`,
//! evaluated against a page's heading (first 3 meaningful lines, after
//! PJe-block stripping).

use once_cell::sync::Lazy;
use regex::Regex;

pub struct BoundaryRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub weight: f64,
    /// The segment `doc_type` this marker implies, used by type inference.
    pub implies_type: &'static str,
}

fn compiled(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static boundary pattern")
}

pub static BOUNDARY_RULES: Lazy<Vec<BoundaryRule>> = Lazy::new(|| {
    vec![
        BoundaryRule {
            name: "court-header",
            pattern: compiled(r"(?i)^(poder judici[aá]rio|tribunal de justi[cç]a|justi[cç]a federal)"),
            weight: 0.65,
            implies_type: "unknown",
        },
        BoundaryRule {
            name: "petition-opening-formula",
            pattern: compiled(r"(?i)(excelent[ií]ssimo senhor doutor juiz|exmo\.?\s*sr\.?\s*dr\.?\s*ju[ií]z)"),
            weight: 0.85,
            implies_type: "peticao-inicial",
        },
        BoundaryRule {
            name: "sentenca",
            pattern: compiled(r"(?i)^senten[cç]a\b"),
            weight: 0.90,
            implies_type: "sentenca",
        },
        BoundaryRule {
            name: "acordao",
            pattern: compiled(r"(?i)^ac[oó]rd[aã]o\b"),
            weight: 0.90,
            implies_type: "acordao",
        },
        BoundaryRule {
            name: "certidao",
            pattern: compiled(r"(?i)^certid[aã]o\b.{0,60}certifico"),
            weight: 0.80,
            implies_type: "certidao",
        },
        BoundaryRule {
            name: "attachment-exhibit-label",
            pattern: compiled(r"(?i)^(anexo|documento anexo|exibi[cç][aã]o de documento)\b"),
            weight: 0.75,
            implies_type: "anexo",
        },
        BoundaryRule {
            name: "cnj-process-number",
            pattern: compiled(r"\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4}"),
            weight: 0.60,
            implies_type: "unknown",
        },
        BoundaryRule {
            name: "despacho",
            pattern: compiled(r"(?i)^despacho\b"),
            weight: 0.75,
            implies_type: "despacho",
        },
        BoundaryRule {
            name: "decisao-interlocutoria",
            pattern: compiled(r"(?i)^decis[aã]o(\s+interlocut[oó]ria)?\b"),
            weight: 0.75,
            implies_type: "decisao-interlocutoria",
        },
        BoundaryRule {
            name: "oficio",
            pattern: compiled(r"(?i)^of[ií]cio n[ºo°]"),
            weight: 0.75,
            implies_type: "oficio",
        },
    ]
});

/// Blank-page detection: full cleaned text shorter than 30 characters.
pub fn is_blank_page(cleaned_text: &str) -> bool {
    cleaned_text.trim().chars().count() < 30
}
