//! `index.json` / `INDEX.md`: the enumeration of every emitted Markdown file
//! plus document-level totals. Every emitted file has an entry here and vice
//! versa.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub file: String,
    pub file_path: String,
    pub segment_id: String,
    pub doc_type: String,
    pub pages: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub total_pages: u32,
    pub total_segments: usize,
    pub total_files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
    pub totals: DocumentTotals,
}

impl Index {
    pub fn new(entries: Vec<IndexEntry>, total_pages: u32) -> Self {
        let totals = DocumentTotals {
            total_pages,
            total_segments: entries.len(),
            total_files: entries.len(),
        };
        Self { entries, totals }
    }

    /// A human-readable rendering of the same data, written alongside
    /// `index.json` for reviewers who prefer not to read JSON.
    pub fn render_markdown(&self, source_pdf: &str) -> String {
        let mut out = format!("# Index — {source_pdf}\n\n");
        out.push_str(&format!(
            "{} segment(s) across {} page(s)\n\n",
            self.totals.total_segments, self.totals.total_pages
        ));
        out.push_str("| File | Segment | Doc type | Pages | Confidence |\n");
        out.push_str("|---|---|---|---|---|\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {:.2} |\n",
                entry.file, entry.segment_id, entry.doc_type, entry.pages, entry.confidence
            ));
        }
        out
    }
}
