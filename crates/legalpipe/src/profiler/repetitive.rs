//! Repetitive-content stripping: recurring header/footer chrome, the
//! "ADVOGADOS" block, and PJe footer variants (including the inverted
//! signature produced by a rotated scan).
//!
//! Run once, post-extraction and pre-segmentation, across every page of a
//! document at the same time so the cross-page fingerprint table can be built.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static ADVOGADOS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)advogad|abvoga|advdga").expect("static pattern"));

/// The five canonical PJe footer line patterns, always stripped regardless of
/// recurrence frequency.
static PJE_FOOTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^assinado eletronicamente",
        r"(?i)^documento assinado digitalmente",
        r"(?i)^para conferir o original",
        r"(?i)^processo judicial eletr[oô]nico",
        r"(?i)^n[uú]mero do documento:?\s*\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static PJe footer pattern"))
    .collect()
});

/// Small closed set of OCR-garble signatures that identify an inverted PJe
/// footer (the footer text, upside-down, landing at the top of the page).
static INVERTED_PJE_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)oci(n|u)[o0]r(t|1)(e|c)l[ée]\s*od",
        r"(?i)[o0]dass[ae]d",
        r"(?i)[o0]tnemucod",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static inverted-footer pattern"))
    .collect()
});

fn normalize_line(line: &str) -> String {
    line.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn first_lines(text: &str, n: usize) -> Vec<&str> {
    text.lines().take(n).collect()
}

fn last_lines(text: &str, n: usize) -> Vec<&str> {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(n);
    all[start..].to_vec()
}

/// Builds a per-page fingerprint of the first `header_lines` and last
/// `footer_lines`, normalized (alphanumeric only, lowercased, whitespace
/// collapsed by construction of the filter above).
fn page_fingerprints(text: &str, header_lines: usize, footer_lines: usize) -> Vec<String> {
    first_lines(text, header_lines)
        .into_iter()
        .chain(last_lines(text, footer_lines))
        .map(normalize_line)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strips the ADVOGADOS header block: the first matching line within the
/// first 20 lines, plus the two lines after it.
fn strip_advogados_block(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let window = lines.len().min(20);
    let match_index = lines[..window].iter().position(|l| ADVOGADOS_HEADER.is_match(l));
    match match_index {
        Some(idx) => {
            let strip_through = (idx + 2).min(lines.len().saturating_sub(1));
            lines[(strip_through + 1).min(lines.len())..].join("\n")
        }
        None => text.to_string(),
    }
}

fn strip_pje_footer(text: &str) -> String {
    text.lines()
        .filter(|line| !PJE_FOOTER_PATTERNS.iter().any(|p| p.is_match(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strips an inverted PJe footer detected within the first 20 lines.
fn strip_inverted_pje_footer(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let window = lines.len().min(20);
    let keep: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| {
            !(*i < window && INVERTED_PJE_SIGNATURES.iter().any(|p| p.is_match(line)))
        })
        .map(|(_, line)| *line)
        .collect();
    keep.join("\n")
}

/// Applies every repetitive-content stripping rule across a whole document's
/// pages in one pass: cross-page fingerprint removal, the ADVOGADOS block,
/// the PJe footer, and the inverted PJe footer.
pub fn strip_repetitive_content(pages: &[String], header_lines: usize, footer_lines: usize, threshold: f64) -> Vec<String> {
    let non_empty_count = pages.iter().filter(|p| !p.trim().is_empty()).count();
    let mut fingerprint_counts: HashMap<String, usize> = HashMap::new();

    let all_fingerprints: Vec<Vec<String>> = pages
        .iter()
        .map(|p| page_fingerprints(p, header_lines, footer_lines))
        .collect();

    for fingerprints in &all_fingerprints {
        for fp in fingerprints.iter().collect::<std::collections::HashSet<_>>() {
            *fingerprint_counts.entry(fp.clone()).or_insert(0) += 1;
        }
    }

    let recurring: std::collections::HashSet<String> = fingerprint_counts
        .into_iter()
        .filter(|(_, count)| {
            non_empty_count > 0 && (*count as f64 / non_empty_count as f64) >= threshold
        })
        .map(|(fp, _)| fp)
        .collect();

    pages
        .iter()
        .map(|page_text| {
            let lines: Vec<&str> = page_text.lines().collect();
            let filtered: Vec<&str> = lines
                .into_iter()
                .filter(|line| !recurring.contains(&normalize_line(line)))
                .collect();
            let stage1 = filtered.join("\n");
            let stage2 = strip_advogados_block(&stage1);
            let stage3 = strip_pje_footer(&stage2);
            strip_inverted_pje_footer(&stage3)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurring_header_is_removed_from_every_page() {
        let header = "TRIBUNAL DE JUSTICA";
        let pages: Vec<String> = (0..5)
            .map(|i| format!("{header}\nConteúdo específico da página {i}.\nRodapé comum aqui"))
            .collect();
        let cleaned = strip_repetitive_content(&pages, 12, 8, 0.4);
        for (i, page) in cleaned.iter().enumerate() {
            assert!(!page.to_lowercase().contains("tribunal de justica"), "page {i}: {page}");
        }
    }

    #[test]
    fn unique_per_page_lines_survive() {
        let pages: Vec<String> = (0..5)
            .map(|i| format!("Conteúdo específico e único da página número {i}."))
            .collect();
        let cleaned = strip_repetitive_content(&pages, 12, 8, 0.4);
        for (i, page) in cleaned.iter().enumerate() {
            assert!(page.contains(&i.to_string()));
        }
    }

    #[test]
    fn pje_footer_is_always_stripped() {
        let text = "Corpo do documento.\nAssinado eletronicamente por Fulano.";
        let cleaned = strip_pje_footer(text);
        assert!(!cleaned.to_lowercase().contains("assinado eletronicamente"));
    }

    #[test]
    fn advogados_block_strips_through_match_plus_two_lines() {
        let text = "ADVOGADOS(AS) DO AUTOR\nFulano OAB 123\nBeltrano OAB 456\nCorpo real começa aqui.";
        let cleaned = strip_advogados_block(text);
        assert_eq!(cleaned, "Corpo real começa aqui.");
    }
}
