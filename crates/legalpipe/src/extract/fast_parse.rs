//! The fast, text-layer extraction path: one `pdftotext` invocation per
//! page, with a degraded fallback chain when `pdftotext` itself is absent.

use super::capability::Capabilities;
use crate::config::PipelineConfig;
use crate::types::{ExtractionMethod, Page};
use std::path::Path;
use std::time::Duration;

fn build_page(page_number: u32, text: String, method: ExtractionMethod, char_floor: usize) -> Page {
    let empty = Page::compute_empty(&text, char_floor);
    Page {
        page_number,
        text,
        confidence: if empty { 0.0 } else { 1.0 },
        empty,
        method,
        rotation_applied: None,
        word_garbage_score: None,
        ocr_replaced: None,
        ocr_fallback_to_fp: None,
    }
}

/// Splits on form-feed (`\x0c`) characters, one page of text per segment.
fn split_on_form_feed(full_text: &str) -> Vec<String> {
    full_text.split('\x0c').map(str::to_string).collect()
}

/// Splits concatenated text into `page_count` equal character chunks, in
/// order, used only when form-feed recovery is unreliable.
fn split_equal_chunks(full_text: &str, page_count: u32) -> Vec<String> {
    let chars: Vec<char> = full_text.chars().collect();
    if page_count == 0 || chars.is_empty() {
        return vec![String::new(); page_count.max(1) as usize];
    }
    let chunk_len = (chars.len() as f64 / page_count as f64).ceil() as usize;
    chars
        .chunks(chunk_len.max(1))
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Per-page fast parse. Prefers one `pdftotext` invocation per page; falls
/// back to a full-document parse plus form-feed splitting, or equal-size
/// chunking, when the capability is unavailable.
pub fn fast_parse_per_page(
    pdf: &Path,
    page_count: u32,
    caps: &Capabilities,
    cfg: &PipelineConfig,
) -> Vec<Page> {
    let timeout = Duration::from_millis(cfg.text_extract_timeout_ms);

    if caps.text.is_available() {
        return (1..=page_count)
            .map(|page_number| {
                let text = caps
                    .text
                    .extract_page(pdf, page_number, timeout)
                    .unwrap_or_default();
                build_page(page_number, text, ExtractionMethod::FastParsePoppler, cfg.empty_page_char_threshold)
            })
            .collect();
    }

    let full_text = caps
        .text
        .extract_document(pdf, timeout)
        .unwrap_or_default();

    let form_feed_segments = split_on_form_feed(&full_text);
    let form_feed_reliable =
        page_count > 0 && (form_feed_segments.len() as f64 / page_count as f64) >= 0.80;

    if form_feed_reliable {
        form_feed_segments
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                build_page(
                    (i + 1) as u32,
                    text,
                    ExtractionMethod::FastParseFormfeed,
                    cfg.empty_page_char_threshold,
                )
            })
            .collect()
    } else {
        split_equal_chunks(&full_text, page_count)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                build_page(
                    (i + 1) as u32,
                    text,
                    ExtractionMethod::FastParseChunked,
                    cfg.empty_page_char_threshold,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_split_produces_one_segment_per_marker() {
        let text = "page one\x0cpage two\x0cpage three";
        let segments = split_on_form_feed(text);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], "page two");
    }

    #[test]
    fn equal_chunking_produces_requested_page_count() {
        let text = "a".repeat(100);
        let chunks = split_equal_chunks(&text, 4);
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn build_page_marks_short_text_as_empty() {
        let page = build_page(1, "ok".to_string(), ExtractionMethod::FastParsePoppler, 50);
        assert!(page.empty);
        assert_eq!(page.confidence, 0.0);
    }
}
