//! OCR extraction: rasterize, recognize, post-process, and retry rotated
//! when the result looks like garbage.

use super::capability::Capabilities;
use super::postprocess;
use crate::config::PipelineConfig;
use crate::profiler::word_garbage_score;
use crate::types::{ExtractionMethod, Page};
use std::path::Path;
use std::time::Duration;

const ROTATIONS: [u16; 3] = [180, 90, 270];

/// One OCR pass over a single page: rasterize at the requested DPI, run
/// Tesseract in Portuguese with Sauvola binarization, then clean the result.
pub fn ocr_single_page(pdf: &Path, page_number: u32, enhanced: bool, caps: &Capabilities, cfg: &PipelineConfig) -> Page {
    let dpi = if enhanced { cfg.ocr_dpi_enhanced } else { cfg.ocr_dpi_standard };
    let confidence = if enhanced { 0.80 } else { 0.85 };
    let method = if enhanced { ExtractionMethod::OcrEnhanced } else { ExtractionMethod::OcrStandard };

    let raster_timeout = Duration::from_millis(cfg.rasterize_timeout_ms);
    let ocr_timeout = Duration::from_millis(cfg.ocr_timeout_ms);

    let image_path = match caps.raster.rasterize_page(pdf, page_number, dpi, raster_timeout) {
        Ok(path) => path,
        Err(_) => return empty_page(page_number, method),
    };

    let text = match caps.ocr.recognize(&image_path, 3, ocr_timeout) {
        Ok(raw) => postprocess::clean(&raw),
        Err(_) => {
            let _ = std::fs::remove_file(&image_path);
            return empty_page(page_number, method);
        }
    };
    let _ = std::fs::remove_file(&image_path);

    let empty = Page::compute_empty(&text, cfg.empty_page_char_threshold);
    Page {
        page_number,
        text,
        confidence: if empty { 0.0 } else { confidence },
        empty,
        method,
        rotation_applied: None,
        word_garbage_score: None,
        ocr_replaced: None,
        ocr_fallback_to_fp: None,
    }
}

fn empty_page(page_number: u32, method: ExtractionMethod) -> Page {
    Page {
        page_number,
        text: String::new(),
        confidence: 0.0,
        empty: true,
        method,
        rotation_applied: None,
        word_garbage_score: None,
        ocr_replaced: None,
        ocr_fallback_to_fp: None,
    }
}

/// Runs [`ocr_single_page`], then retries with the image rotated through
/// {180, 90, 270} degrees when the garbage score is at or above the rotation
/// gate, keeping whichever rotation (including the original) scored lowest.
/// Exits early once a rotation drops below the early-exit threshold.
pub fn ocr_single_page_with_retry(
    pdf: &Path,
    page_number: u32,
    enhanced: bool,
    caps: &Capabilities,
    cfg: &PipelineConfig,
) -> Page {
    let mut best = ocr_single_page(pdf, page_number, enhanced, caps, cfg);
    let mut best_garbage = word_garbage_score(&best.text);
    best.word_garbage_score = Some(best_garbage);

    if best_garbage < cfg.rotation_garbage_gate {
        return best;
    }

    let dpi = if enhanced { cfg.ocr_dpi_enhanced } else { cfg.ocr_dpi_standard };
    let raster_timeout = Duration::from_millis(cfg.rasterize_timeout_ms);
    let ocr_timeout = Duration::from_millis(cfg.ocr_timeout_ms);
    let rotate_timeout = Duration::from_millis(cfg.rotate_timeout_ms);

    for degrees in ROTATIONS {
        let Ok(image_path) = caps.raster.rasterize_page(pdf, page_number, dpi, raster_timeout) else {
            continue;
        };
        let rotated = match caps.rotate.rotate(&image_path, degrees, rotate_timeout) {
            Ok(path) => path,
            Err(_) => {
                let _ = std::fs::remove_file(&image_path);
                continue;
            }
        };

        let candidate_text = caps
            .ocr
            .recognize(&rotated, 3, ocr_timeout)
            .map(|raw| postprocess::clean(&raw))
            .unwrap_or_default();
        let _ = std::fs::remove_file(&image_path);
        if rotated != image_path {
            let _ = std::fs::remove_file(&rotated);
        }

        let candidate_garbage = word_garbage_score(&candidate_text);
        if candidate_garbage < best_garbage {
            let empty = Page::compute_empty(&candidate_text, cfg.empty_page_char_threshold);
            best = Page {
                page_number,
                text: candidate_text,
                confidence: best.confidence,
                empty,
                method: best.method,
                rotation_applied: Some(degrees),
                word_garbage_score: Some(candidate_garbage),
                ocr_replaced: None,
                ocr_fallback_to_fp: None,
            };
            best_garbage = candidate_garbage;
        }

        if best_garbage < cfg.rotation_early_exit {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::capability::{CapabilityFailure, CapabilityResult, OcrCapability, RasterCapability, RotateCapability, TextCapability};
    use std::path::PathBuf;

    struct FakeText;
    impl TextCapability for FakeText {
        fn is_available(&self) -> bool { true }
        fn extract_page(&self, _: &Path, _: u32, _: Duration) -> CapabilityResult<String> { Ok(String::new()) }
        fn extract_document(&self, _: &Path, _: Duration) -> CapabilityResult<String> { Ok(String::new()) }
        fn page_count(&self, _: &Path, _: Duration) -> CapabilityResult<u32> { Ok(1) }
    }

    struct FakeRaster;
    impl RasterCapability for FakeRaster {
        fn is_available(&self) -> bool { true }
        fn rasterize_page(&self, _: &Path, _: u32, _: u32, _: Duration) -> CapabilityResult<PathBuf> {
            Ok(PathBuf::from("/tmp/fake-page.png"))
        }
    }

    struct FakeOcr {
        text: String,
    }
    impl OcrCapability for FakeOcr {
        fn is_available(&self) -> bool { true }
        fn recognize(&self, _: &Path, _: u8, _: Duration) -> CapabilityResult<String> {
            Ok(self.text.clone())
        }
    }

    struct FailingRotate;
    impl RotateCapability for FailingRotate {
        fn is_available(&self) -> bool { false }
        fn rotate(&self, _: &Path, _: u16, _: Duration) -> CapabilityResult<PathBuf> {
            Err(CapabilityFailure::Unavailable)
        }
    }

    fn caps_with_text(text: &str) -> Capabilities {
        Capabilities {
            text: Box::new(FakeText),
            raster: Box::new(FakeRaster),
            ocr: Box::new(FakeOcr { text: text.to_string() }),
            rotate: Box::new(FailingRotate),
        }
    }

    #[test]
    fn clean_ocr_text_skips_rotation_retry() {
        let cfg = PipelineConfig::default();
        let caps = caps_with_text(
            "Vistos. Ante o exposto, julgo procedente o pedido formulado pelo autor na \
             presente ação, condenando o réu ao pagamento da indenização por danos morais.",
        );
        let page = ocr_single_page_with_retry(Path::new("/tmp/doesnotmatter.pdf"), 1, false, &caps, &cfg);
        assert!(page.rotation_applied.is_none());
    }

    #[test]
    fn missing_raster_capability_yields_empty_page() {
        struct UnavailableRaster;
        impl RasterCapability for UnavailableRaster {
            fn is_available(&self) -> bool { false }
            fn rasterize_page(&self, _: &Path, _: u32, _: u32, _: Duration) -> CapabilityResult<PathBuf> {
                Err(CapabilityFailure::Unavailable)
            }
        }
        let cfg = PipelineConfig::default();
        let caps = Capabilities {
            text: Box::new(FakeText),
            raster: Box::new(UnavailableRaster),
            ocr: Box::new(FakeOcr { text: "anything".to_string() }),
            rotate: Box::new(FailingRotate),
        };
        let page = ocr_single_page(Path::new("/tmp/x.pdf"), 1, false, &caps, &cfg);
        assert!(page.empty);
        assert_eq!(page.confidence, 0.0);
    }
}
