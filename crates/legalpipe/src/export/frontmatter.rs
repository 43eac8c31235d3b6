//! YAML frontmatter: the interchange surface downstream consumers parse.
//!
//! Field names must match verbatim and strings must be double-quoted on
//! write, so `render` hand-formats the block rather than leaning on
//! `serde_yaml_ng`'s default style. Parsing (used by QC) is quote-agnostic
//! and goes through `serde_yaml_ng` directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub segment_id: String,
    pub source_pdf: String,
    pub source_pdf_path: String,
    pub page_range: String,
    pub total_pages: u32,
    pub segment_type: String,
    pub doc_type: String,
    pub segmentation_confidence: f64,
    pub extraction_method: String,
    pub extraction_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_triggered: Option<bool>,
    pub generated_at: DateTime<Utc>,
    pub pipeline_version: String,
}

impl Frontmatter {
    /// Renders the fenced `---`-delimited block with every string value
    /// double-quoted, per the interchange-surface requirement.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("segment_id: \"{}\"\n", self.segment_id));
        out.push_str(&format!("source_pdf: \"{}\"\n", escape(&self.source_pdf)));
        out.push_str(&format!("source_pdf_path: \"{}\"\n", escape(&self.source_pdf_path)));
        out.push_str(&format!("page_range: \"{}\"\n", self.page_range));
        out.push_str(&format!("total_pages: {}\n", self.total_pages));
        out.push_str(&format!("segment_type: \"{}\"\n", self.segment_type));
        out.push_str(&format!("doc_type: \"{}\"\n", self.doc_type));
        out.push_str(&format!("segmentation_confidence: {:.4}\n", self.segmentation_confidence));
        out.push_str(&format!("extraction_method: \"{}\"\n", self.extraction_method));
        out.push_str(&format!("extraction_confidence: {:.4}\n", self.extraction_confidence));
        if let Some(triggered) = self.fallback_triggered {
            out.push_str(&format!("fallback_triggered: {triggered}\n"));
        }
        out.push_str(&format!("generated_at: \"{}\"\n", self.generated_at.to_rfc3339()));
        out.push_str(&format!("pipeline_version: \"{}\"\n", self.pipeline_version));
        out.push_str("---\n");
        out
    }

    /// Parses a leading `---`-delimited frontmatter block from a Markdown
    /// file's contents, returning the block and the remaining body text.
    pub fn parse(markdown: &str) -> Option<(Frontmatter, &str)> {
        let rest = markdown.strip_prefix("---\n")?;
        let end = rest.find("\n---\n")?;
        let (block, after) = rest.split_at(end);
        let body = &after[5..]; // skip "\n---\n"
        let frontmatter: Frontmatter = serde_yaml_ng::from_str(block).ok()?;
        Some((frontmatter, body))
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frontmatter {
        Frontmatter {
            segment_id: "seg-001".to_string(),
            source_pdf: "Inicial_EF.pdf".to_string(),
            source_pdf_path: "/in/Inicial_EF.pdf".to_string(),
            page_range: "1-4".to_string(),
            total_pages: 4,
            segment_type: "piece".to_string(),
            doc_type: "inicial-eef".to_string(),
            segmentation_confidence: 0.82,
            extraction_method: "fast-parse".to_string(),
            extraction_confidence: 0.95,
            fallback_triggered: None,
            generated_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            pipeline_version: "0.1.0".to_string(),
        }
    }

    #[test]
    fn render_quotes_every_string_field() {
        let rendered = sample().render();
        assert!(rendered.contains("segment_id: \"seg-001\""));
        assert!(rendered.contains("doc_type: \"inicial-eef\""));
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("---\n"));
    }

    #[test]
    fn render_then_parse_round_trips() {
        let fm = sample();
        let body = "# Piece body\n\nSome text.\n";
        let markdown = format!("{}{}", fm.render(), body);
        let (parsed, parsed_body) = Frontmatter::parse(&markdown).expect("parses");
        assert_eq!(parsed, fm);
        assert_eq!(parsed_body, body);
    }
}
