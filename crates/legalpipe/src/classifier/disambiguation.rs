//! Disambiguation table: rules that down-weight a classification when its
//! matched indicators only mention an entity in passing, rather than
//! reflecting the document's own structure.

use once_cell::sync::Lazy;
use regex::Regex;

pub struct DisambiguationRule {
    pub doc_type: &'static str,
    pub structural: Vec<Regex>,
    pub entity_only: Vec<Regex>,
}

fn compiled(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static disambiguation pattern"))
        .collect()
}

/// ~12 closed entries, one per type prone to being matched by a passing
/// mention rather than its own structural marker.
pub static DISAMBIGUATION_TABLE: Lazy<Vec<DisambiguationRule>> = Lazy::new(|| {
    vec![
        DisambiguationRule {
            doc_type: "sentenca",
            structural: compiled(&[r"(?i)^senten[cç]a\b", r"(?i)julgo (procedente|improcedente)"]),
            entity_only: compiled(&[r"(?i)\bsenten[cç]a\b"]),
        },
        DisambiguationRule {
            doc_type: "acordao",
            structural: compiled(&[r"(?i)^ac[oó]rd[aã]o\b", r"(?i)vistos, relatados e discutidos"]),
            entity_only: compiled(&[r"(?i)\bac[oó]rd[aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "apelacao",
            structural: compiled(&[r"(?i)raz[oõ]es de apela[cç][aã]o", r"(?i)^recurso de apela[cç][aã]o"]),
            entity_only: compiled(&[r"(?i)\bapela[cç][aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "agravo-instrumento",
            structural: compiled(&[r"(?i)^agravo de instrumento"]),
            entity_only: compiled(&[r"(?i)\bagravo de instrumento\b"]),
        },
        DisambiguationRule {
            doc_type: "edcl",
            structural: compiled(&[r"(?i)^embargos de declara[cç][aã]o"]),
            entity_only: compiled(&[r"(?i)\bembargos de declara[cç][aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "contestacao",
            structural: compiled(&[r"(?i)^contesta[cç][aã]o", r"(?i)vem.{0,30}contestar"]),
            entity_only: compiled(&[r"(?i)\bcontesta[cç][aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "recurso-especial",
            structural: compiled(&[r"(?i)^recurso especial"]),
            entity_only: compiled(&[r"(?i)\brecurso especial\b"]),
        },
        DisambiguationRule {
            doc_type: "recurso-extraordinario",
            structural: compiled(&[r"(?i)^recurso extraordin[aá]rio"]),
            entity_only: compiled(&[r"(?i)\brecurso extraordin[aá]rio\b"]),
        },
        DisambiguationRule {
            doc_type: "mandado-citacao",
            structural: compiled(&[r"(?i)^mandado de cita[cç][aã]o"]),
            entity_only: compiled(&[r"(?i)\bcita[cç][aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "mandado-intimacao",
            structural: compiled(&[r"(?i)^mandado de intima[cç][aã]o"]),
            entity_only: compiled(&[r"(?i)\bintima[cç][aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "certidao",
            structural: compiled(&[r"(?i)^certid[aã]o\b", r"(?i)certifico que"]),
            entity_only: compiled(&[r"(?i)\bcertid[aã]o\b"]),
        },
        DisambiguationRule {
            doc_type: "inicial-eef",
            structural: compiled(&[r"(?i)execu[cç][aã]o fiscal", r"(?i)certid[aã]o de d[ií]vida ativa"]),
            entity_only: compiled(&[r"(?i)\bfiscal\b"]),
        },
    ]
});

pub fn rule_for(doc_type: &str) -> Option<&'static DisambiguationRule> {
    DISAMBIGUATION_TABLE.iter().find(|rule| rule.doc_type == doc_type)
}
