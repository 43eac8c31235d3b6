//! Markdown Exporter (C8): segment body assembly, YAML frontmatter,
//! deterministic filenames, and `index.json`/`INDEX.md` generation.

pub mod frontmatter;
pub mod index;

pub use frontmatter::Frontmatter;
pub use index::{DocumentTotals, Index, IndexEntry};

use crate::error::{PipelineError, Result};
use crate::types::{ExtractedDocument, Page, Segment};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Deterministic filename for a segment at its 1-origin position: `NNN-{type}-{doctype}.md`.
pub fn filename_for(position_one_based: usize, segment: &Segment) -> String {
    format!(
        "{:03}-{}-{}.md",
        position_one_based,
        segment.segment_type.as_str(),
        segment.doc_type
    )
}

fn page_range(segment: &Segment) -> String {
    if segment.page_start == segment.page_end {
        segment.page_start.to_string()
    } else {
        format!("{}-{}", segment.page_start, segment.page_end)
    }
}

/// Concatenates a segment's pages in order, separating them with a
/// horizontal rule and an HTML page-break comment; empty pages render as a
/// comment placeholder rather than their (absent) text.
fn assemble_body(segment: &Segment, pages: &[Page]) -> String {
    let matched: Vec<&Page> = pages
        .iter()
        .filter(|p| p.page_number >= segment.page_start && p.page_number <= segment.page_end)
        .collect();

    if matched.is_empty() {
        return format!(
            "_Manual review required: no extracted text available for pages {}._\n",
            page_range(segment)
        );
    }

    let mut parts: Vec<String> = Vec::with_capacity(matched.len());
    for page in &matched {
        if page.empty {
            parts.push(format!("<!-- page: p.{} (empty) -->", page.page_number));
        } else {
            parts.push(page.text.trim_end().to_string());
        }
    }
    parts.join("\n\n---\n<!-- page-break -->\n\n")
}

/// Writes every non-separator segment's Markdown file into `output_dir`,
/// returning the `index.json` contents. `source_pdf`/`source_pdf_path` name
/// the originating file; `pages` is the full re-extracted document in page
/// order.
pub fn export_document(
    segments: &[Segment],
    pages: &[Page],
    source_pdf: &str,
    source_pdf_path: &str,
    extracted: &ExtractedDocument,
    output_dir: &Path,
    pipeline_version: &str,
    generated_at: DateTime<Utc>,
) -> Result<Index> {
    std::fs::create_dir_all(output_dir).map_err(|e| PipelineError::Io {
        path: output_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let exportable: Vec<&Segment> = segments.iter().filter(|s| !s.is_separator()).collect();
    let total_pages = pages.len() as u32;
    let mut entries = Vec::with_capacity(exportable.len());

    for (position, segment) in exportable.iter().enumerate() {
        let position_one_based = position + 1;
        let filename = filename_for(position_one_based, segment);
        let file_path = output_dir.join(&filename);

        let fm = Frontmatter {
            segment_id: segment.segment_id.clone(),
            source_pdf: source_pdf.to_string(),
            source_pdf_path: source_pdf_path.to_string(),
            page_range: page_range(segment),
            total_pages,
            segment_type: segment.segment_type.as_str().to_string(),
            doc_type: segment.doc_type.clone(),
            segmentation_confidence: segment.confidence,
            extraction_method: extracted.method.as_str().to_string(),
            extraction_confidence: extracted.overall_confidence,
            fallback_triggered: extracted.fallback_triggered.then_some(true),
            generated_at,
            pipeline_version: pipeline_version.to_string(),
        };

        let body = assemble_body(segment, pages);
        let contents = format!("{}\n{}", fm.render(), body);

        std::fs::write(&file_path, contents).map_err(|e| PipelineError::Io {
            path: file_path.clone(),
            message: e.to_string(),
        })?;

        entries.push(IndexEntry {
            file: filename,
            file_path: file_path.to_string_lossy().into_owned(),
            segment_id: segment.segment_id.clone(),
            doc_type: segment.doc_type.clone(),
            pages: page_range(segment),
            confidence: segment.confidence,
        });
    }

    let index = Index::new(entries, total_pages);

    let index_json = serde_json::to_string_pretty(&index).map_err(|e| PipelineError::Io {
        path: output_dir.join("index.json"),
        message: e.to_string(),
    })?;
    std::fs::write(output_dir.join("index.json"), index_json).map_err(|e| PipelineError::Io {
        path: output_dir.join("index.json"),
        message: e.to_string(),
    })?;
    std::fs::write(output_dir.join("INDEX.md"), index.render_markdown(source_pdf)).map_err(|e| PipelineError::Io {
        path: output_dir.join("INDEX.md"),
        message: e.to_string(),
    })?;

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationSource, DocumentExtractionMethod, ExtractionMethod, SegmentType};
    use regex::Regex;

    fn page(number: u32, text: &str) -> Page {
        Page {
            page_number: number,
            text: text.to_string(),
            confidence: 0.9,
            empty: text.is_empty(),
            method: ExtractionMethod::FastParsePoppler,
            rotation_applied: None,
            word_garbage_score: None,
            ocr_replaced: None,
            ocr_fallback_to_fp: None,
        }
    }

    fn segment(id: &str, doc_type: &str, start: u32, end: u32) -> Segment {
        Segment {
            segment_id: id.to_string(),
            segment_type: SegmentType::Piece,
            doc_type: doc_type.to_string(),
            classification_source: ClassificationSource::BoundaryRules,
            page_start: start,
            page_end: end,
            confidence: 0.8,
            boundary_markers: vec![],
            classification_confidence: None,
            classification_indicators: None,
            l2_previous_type: None,
            l2_boost: None,
            l2_reasons: None,
            cascade_level: None,
        }
    }

    fn extracted_doc() -> ExtractedDocument {
        ExtractedDocument {
            method: DocumentExtractionMethod::FastParse,
            pages: vec![],
            overall_confidence: 0.95,
            fallback_triggered: false,
            ocr_pages: None,
            ocr_method: None,
            classification: None,
        }
    }

    #[test]
    fn filenames_match_the_required_pattern_and_are_unique() {
        let pattern = Regex::new(r"^[0-9]{3}-[a-z-]+-[a-z-]+\.md$").unwrap();
        let segments = vec![segment("seg-001", "peticao-inicial", 1, 2), segment("seg-002", "sentenca", 3, 4)];
        let names: Vec<String> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| filename_for(i + 1, s))
            .collect();
        for name in &names {
            assert!(pattern.is_match(name), "{name} does not match required pattern");
        }
        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn export_writes_one_file_per_segment_and_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![segment("seg-001", "peticao-inicial", 1, 2)];
        let pages = vec![page(1, "Texto da primeira página."), page(2, "Texto da segunda página.")];
        let index = export_document(
            &segments,
            &pages,
            "Inicial.pdf",
            "/in/Inicial.pdf",
            &extracted_doc(),
            dir.path(),
            "0.1.0",
            Utc::now(),
        )
        .unwrap();

        assert_eq!(index.entries.len(), 1);
        assert!(dir.path().join("index.json").is_file());
        assert!(dir.path().join("INDEX.md").is_file());
        assert!(dir.path().join(&index.entries[0].file).is_file());

        let contents = std::fs::read_to_string(dir.path().join(&index.entries[0].file)).unwrap();
        assert!(contents.starts_with("---\n"));
        assert!(contents.contains("doc_type: \"peticao-inicial\""));
    }

    #[test]
    fn empty_page_renders_as_placeholder_comment() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![segment("seg-001", "sentenca", 1, 2)];
        let pages = vec![page(1, "Texto substantivo da sentença proferida neste processo."), page(2, "")];
        let index = export_document(
            &segments,
            &pages,
            "a.pdf",
            "/in/a.pdf",
            &extracted_doc(),
            dir.path(),
            "0.1.0",
            Utc::now(),
        )
        .unwrap();
        let contents = std::fs::read_to_string(dir.path().join(&index.entries[0].file)).unwrap();
        assert!(contents.contains("<!-- page: p.2 (empty) -->"));
    }

    #[test]
    fn separator_segments_are_excluded_from_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut sep = segment("seg-002", "unknown", 3, 3);
        sep.segment_type = SegmentType::Separator;
        let segments = vec![segment("seg-001", "sentenca", 1, 2), sep];
        let pages = vec![page(1, "a".repeat(60).as_str()), page(2, "b".repeat(60).as_str()), page(3, "c".repeat(60).as_str())];
        let index = export_document(&segments, &pages, "a.pdf", "/in/a.pdf", &extracted_doc(), dir.path(), "0.1.0", Utc::now()).unwrap();
        assert_eq!(index.entries.len(), 1);
    }
}
