//! QC Validator (C9): reads `index.json`, opens each exported Markdown file,
//! parses its frontmatter, and applies the seven checks in order. Rejection
//! is never a pipeline failure — a rejected file is copied to `review/` and
//! counted in the report, the run continues.

mod rules;

pub use rules::{expected_doc_type_for_filename, MislabelRule};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::export::{Frontmatter, Index};
use crate::types::QcSummary;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcStatus {
    Passed,
    Flagged,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QcFileResult {
    pub file: String,
    pub status: QcStatus,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QcOutcome {
    pub results: Vec<QcFileResult>,
    pub summary: QcSummary,
    pub coverage_warnings: Vec<String>,
}

fn parse_page_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once('-') {
        Some((a, b)) => Some((a.parse().ok()?, b.parse().ok()?)),
        None => {
            let p: u32 = range.parse().ok()?;
            Some((p, p))
        }
    }
}

/// Pairwise overlap check across every entry's page range; returns the
/// filenames involved in at least one overlap.
fn overlapping_files(index: &Index) -> std::collections::HashSet<String> {
    let mut overlapping = std::collections::HashSet::new();
    let ranges: Vec<(String, u32, u32)> = index
        .entries
        .iter()
        .filter_map(|e| parse_page_range(&e.pages).map(|(s, t)| (e.file.clone(), s, t)))
        .collect();

    for i in 0..ranges.len() {
        for j in (i + 1)..ranges.len() {
            let (file_a, start_a, end_a) = &ranges[i];
            let (file_b, start_b, end_b) = &ranges[j];
            if start_a <= end_b && start_b <= end_a {
                overlapping.insert(file_a.clone());
                overlapping.insert(file_b.clone());
            }
        }
    }
    overlapping
}

/// Pages in `1..=total_pages` not covered by any entry's range.
fn missing_pages(index: &Index) -> Vec<u32> {
    let mut covered = std::collections::HashSet::new();
    for entry in &index.entries {
        if let Some((start, end)) = parse_page_range(&entry.pages) {
            for p in start..=end {
                covered.insert(p);
            }
        }
    }
    (1..=index.totals.total_pages).filter(|p| !covered.contains(p)).collect()
}

/// Validates every file enumerated in `index` against the seven checks,
/// copying rejected files into `review_dir`.
pub fn validate_document(index: &Index, markdown_dir: &Path, review_dir: &Path, source_pdf_filename: &str, cfg: &PipelineConfig) -> Result<QcOutcome> {
    let overlapping = overlapping_files(index);
    let missing = missing_pages(index);
    let mut coverage_warnings: Vec<String> = missing.iter().map(|p| format!("missing page {p} from page coverage")).collect();

    let mut results = Vec::with_capacity(index.entries.len());
    let mut summary = QcSummary::default();

    for entry in &index.entries {
        let path = markdown_dir.join(&entry.file);
        let contents = std::fs::read_to_string(&path).map_err(|e| PipelineError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut reasons: Vec<String> = Vec::new();
        let mut rejected = false;
        let mut flagged = false;

        let parsed = Frontmatter::parse(&contents);
        let Some((fm, body)) = parsed else {
            results.push(QcFileResult {
                file: entry.file.clone(),
                status: QcStatus::Rejected,
                reasons: vec!["metadata-completeness: missing or malformed frontmatter fields".to_string()],
            });
            summary.rejected += 1;
            continue;
        };
        let _ = &fm; // presence of every mandatory field is guaranteed by successful parse

        if body.trim().chars().count() < cfg.qc_empty_body_chars {
            rejected = true;
            reasons.push(format!("empty-content: body shorter than {} characters", cfg.qc_empty_body_chars));
        }

        if let Some(rule) = rules::rule_for(&entry.doc_type) {
            if !rule.is_satisfied_by(body) {
                rejected = true;
                reasons.push(format!("mislabel: body does not satisfy required patterns for {}", entry.doc_type));
                summary.mislabels_caught += 1;
            }
        }

        if let Some(expected) = expected_doc_type_for_filename(source_pdf_filename) {
            if entry.doc_type != expected && entry.doc_type != "unknown" {
                flagged = true;
                reasons.push(format!("filename-vs-classification: filename implies {expected}, got {}", entry.doc_type));
            }
        }

        if entry.doc_type == "unknown" {
            flagged = true;
            reasons.push("unknown doc_type".to_string());
        }

        if fm.extraction_confidence < cfg.qc_extraction_confidence_floor {
            flagged = true;
            reasons.push(format!("low extraction confidence: {:.2}", fm.extraction_confidence));
        }
        if fm.segmentation_confidence < cfg.qc_segmentation_confidence_floor {
            flagged = true;
            reasons.push(format!("low segmentation confidence: {:.2}", fm.segmentation_confidence));
        }

        if overlapping.contains(&entry.file) {
            rejected = true;
            reasons.push("page coverage: overlapping page range".to_string());
        }

        let status = if rejected {
            summary.rejected += 1;
            QcStatus::Rejected
        } else if flagged {
            summary.flagged += 1;
            QcStatus::Flagged
        } else {
            summary.passed += 1;
            QcStatus::Passed
        };

        if status == QcStatus::Rejected {
            std::fs::create_dir_all(review_dir).map_err(|e| PipelineError::Io {
                path: review_dir.to_path_buf(),
                message: e.to_string(),
            })?;
            std::fs::copy(&path, review_dir.join(&entry.file)).map_err(|e| PipelineError::Io {
                path: review_dir.join(&entry.file),
                message: e.to_string(),
            })?;
        }

        results.push(QcFileResult {
            file: entry.file.clone(),
            status,
            reasons,
        });
    }

    if !missing.is_empty() {
        summary.flagged += missing.len();
    }
    coverage_warnings.sort();

    Ok(QcOutcome { results, summary, coverage_warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::IndexEntry;
    use chrono::Utc;

    fn frontmatter_block(doc_type: &str, extraction: f64, segmentation: f64) -> Frontmatter {
        Frontmatter {
            segment_id: "seg-001".to_string(),
            source_pdf: "a.pdf".to_string(),
            source_pdf_path: "/in/a.pdf".to_string(),
            page_range: "1-2".to_string(),
            total_pages: 2,
            segment_type: "piece".to_string(),
            doc_type: doc_type.to_string(),
            segmentation_confidence: segmentation,
            extraction_method: "fast-parse".to_string(),
            extraction_confidence: extraction,
            fallback_triggered: None,
            generated_at: Utc::now(),
            pipeline_version: "0.1.0".to_string(),
        }
    }

    fn write_markdown(dir: &Path, filename: &str, fm: &Frontmatter, body: &str) {
        std::fs::write(dir.join(filename), format!("{}\n{body}", fm.render())).unwrap();
    }

    fn single_entry_index(filename: &str, doc_type: &str, pages: &str, total_pages: u32) -> Index {
        Index::new(
            vec![IndexEntry {
                file: filename.to_string(),
                file_path: filename.to_string(),
                segment_id: "seg-001".to_string(),
                doc_type: doc_type.to_string(),
                pages: pages.to_string(),
                confidence: 0.8,
            }],
            total_pages,
        )
    }

    #[test]
    fn sentenca_body_passes_mislabel_rule() {
        let dir = tempfile::tempdir().unwrap();
        let review = dir.path().join("review");
        let fm = frontmatter_block("sentenca", 0.9, 0.9);
        write_markdown(dir.path(), "001-piece-sentenca.md", &fm, "Vistos. Ante o exposto, julgo procedente o pedido. P.R.I.");
        let index = single_entry_index("001-piece-sentenca.md", "sentenca", "1-2", 2);
        let cfg = PipelineConfig::default();
        let outcome = validate_document(&index, dir.path(), &review, "Sentenca.pdf", &cfg).unwrap();
        assert_eq!(outcome.results[0].status, QcStatus::Passed);
    }

    #[test]
    fn sentenca_body_without_verdict_is_rejected_as_mislabel() {
        let dir = tempfile::tempdir().unwrap();
        let review = dir.path().join("review");
        let fm = frontmatter_block("sentenca", 0.9, 0.9);
        write_markdown(dir.path(), "001-piece-sentenca.md", &fm, "Ofício ao delegado.");
        let index = single_entry_index("001-piece-sentenca.md", "sentenca", "1-2", 2);
        let cfg = PipelineConfig::default();
        let outcome = validate_document(&index, dir.path(), &review, "a.pdf", &cfg).unwrap();
        assert_eq!(outcome.results[0].status, QcStatus::Rejected);
        assert!(review.join("001-piece-sentenca.md").is_file());
        assert_eq!(outcome.summary.mislabels_caught, 1);
    }

    #[test]
    fn unknown_doc_type_is_flagged_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let review = dir.path().join("review");
        let fm = frontmatter_block("unknown", 0.9, 0.9);
        write_markdown(
            dir.path(),
            "001-piece-unknown.md",
            &fm,
            "Texto qualquer suficientemente longo para passar o teste de conteúdo vazio.",
        );
        let index = single_entry_index("001-piece-unknown.md", "unknown", "1-2", 2);
        let cfg = PipelineConfig::default();
        let outcome = validate_document(&index, dir.path(), &review, "a.pdf", &cfg).unwrap();
        assert_eq!(outcome.results[0].status, QcStatus::Flagged);
    }

    #[test]
    fn missing_pages_are_reported_as_coverage_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let review = dir.path().join("review");
        let fm = frontmatter_block("sentenca", 0.9, 0.9);
        write_markdown(dir.path(), "001-piece-sentenca.md", &fm, "Vistos. Ante o exposto, julgo procedente o pedido. P.R.I.");
        let index = single_entry_index("001-piece-sentenca.md", "sentenca", "1-1", 2);
        let cfg = PipelineConfig::default();
        let outcome = validate_document(&index, dir.path(), &review, "a.pdf", &cfg).unwrap();
        assert_eq!(outcome.coverage_warnings, vec!["missing page 2 from page coverage".to_string()]);
    }

    #[test]
    fn batch_summary_additive_merge_still_sums_every_report() {
        let a = QcSummary { passed: 3, flagged: 1, rejected: 0, mislabels_caught: 0 };
        let b = QcSummary { passed: 2, flagged: 0, rejected: 1, mislabels_caught: 1 };
        assert_eq!(a.merge(&b), QcSummary { passed: 5, flagged: 1, rejected: 1, mislabels_caught: 1 });
    }
}
