//! Deterministic clean-up of raw OCR output for Portuguese legal text.
//!
//! Applied after every OCR invocation, before garbage scoring, so the score
//! reflects genuine extraction quality rather than artifacts these rules fix.

use once_cell::sync::Lazy;
use regex::Regex;

/// Known digit-for-letter misreads in common given names, e.g. `Jos6` -> `José`.
static NAME_MISREAD_SOURCES: &[(&str, &str)] = &[
    (r"\bJos6\b", "José"),
    (r"\bMar1a\b", "Maria"),
    (r"\bJo3o\b", "João"),
    (r"\bAnt0nio\b", "Antônio"),
    (r"\bS1lva\b", "Silva"),
];

static NAME_MISREADS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    NAME_MISREAD_SOURCES
        .iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("static name-misread pattern"), *replacement)
        })
        .collect()
});

static DIGIT_IN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-zÀ-ÿ])(\d)([A-Za-zÀ-ÿ])").expect("static pattern"));

static DOUBLE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("static pattern"));

/// Runs the full deterministic substitution chain over raw OCR text.
pub fn clean(raw: &str) -> String {
    let mut text = raw.to_string();

    for (pattern, replacement) in NAME_MISREADS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    text = collapse_split_single_letters(&text);
    text = DIGIT_IN_WORD.replace_all(&text, "$1$3").into_owned();
    text = DOUBLE_SPACE.replace_all(&text, " ").into_owned();
    text
}

/// OCR sometimes splits a run of single letters with spaces (`S E N T E N
/// Ç A`). Collapse runs of 3 or more single-letter tokens separated by single
/// spaces back into one word; shorter runs are left alone since they may be
/// legitimate initials.
fn collapse_split_single_letters(text: &str) -> String {
    let tokens: Vec<&str> = text.split(' ').collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let mut run_end = i;
        while run_end < tokens.len() && is_single_letter(tokens[run_end]) {
            run_end += 1;
        }
        let run_len = run_end - i;
        if run_len >= 3 {
            out.push(tokens[i..run_end].concat());
            i = run_end;
        } else {
            out.push(tokens[i].to_string());
            i += 1;
        }
    }
    out.join(" ")
}

fn is_single_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}
