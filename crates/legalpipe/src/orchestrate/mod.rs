//! Orchestrator (C10): sequences a single PDF through all six stages,
//! checkpointing atomically after each one, and folds per-PDF reports into a
//! batch report when the source is a directory.
//!
//! Stages run strictly in order for a given PDF: intake (1) -> bootstrap
//! extraction/profiling/classification (2) -> routing (3) -> hybrid
//! extraction (4) -> segmentation and per-segment reclassification (5) ->
//! export and QC (6). A resumed run reuses stage 4's and stage 5's persisted
//! JSON artifacts instead of recomputing them; stages 1-3 are cheap and
//! deterministic enough to simply redo. Between every stage boundary the
//! orchestrator polls a single interrupt flag: on a graceful shutdown request
//! it finishes the stage in flight, persists the checkpoint, and returns
//! without starting the next one.

mod checkpoint_io;
mod decisions_log;
pub mod layout;

use crate::classifier::classify;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::export;
use crate::extract::{self, Capabilities};
use crate::intake;
use crate::profiler;
use crate::qc;
use crate::reclassify;
use crate::router;
use crate::segmenter;
use crate::types::{
    BatchReport, Checkpoint, DocumentProfile, ExtractSummary, ExtractedDocument, Manifest, Page, PageProfile, PageRoute,
    PipelineReport, ProfilingSummary, Segment, SegmentSummary, SourceFile, StageResult, StageStatus,
};
use chrono::Utc;
use decisions_log::DecisionsLog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// What happened to a single PDF's run.
pub enum RunOutcome {
    Completed(PipelineReport),
    Interrupted,
}

/// Persisted alongside a PDF's own profile/classification, bundling the
/// document aggregate with its per-page detail for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileArtifact {
    document: DocumentProfile,
    pages: Vec<PageProfile>,
}

/// `pdfinfo`-backed page count, falling back to a form-feed count over a
/// full-document parse when `pdfinfo` is unavailable or fails, and finally to
/// a single page so the pipeline still produces something.
fn determine_page_count(pdf: &Path, caps: &Capabilities, cfg: &PipelineConfig) -> u32 {
    let timeout = Duration::from_millis(cfg.text_extract_timeout_ms);
    if let Ok(count) = caps.text.page_count(pdf, timeout) {
        if count > 0 {
            return count;
        }
    }
    if let Ok(full_text) = caps.text.extract_document(pdf, timeout) {
        let count = full_text.matches('\x0c').count() as u32 + 1;
        if count > 0 {
            return count;
        }
    }
    1
}

fn mark_stage(checkpoint: &mut Checkpoint, stage: u8, duration_ms: u64, output_path: Option<PathBuf>) {
    if !checkpoint.completed_stages.contains(&stage) {
        checkpoint.completed_stages.push(stage);
        checkpoint.completed_stages.sort_unstable();
    }
    checkpoint.current_stage = stage;
    checkpoint
        .stage_results
        .insert(stage.to_string(), StageResult { status: StageStatus::Completed, duration_ms, output_path });
    checkpoint.reseal();
}

/// Marks `stage` complete, persists the checkpoint, and reports whether the
/// caller should stop before starting the next stage.
fn finish_stage(
    checkpoint: &mut Checkpoint,
    subfolder: &Path,
    stage: u8,
    elapsed: Duration,
    output_path: Option<PathBuf>,
    interrupted: &AtomicBool,
) -> Result<bool> {
    mark_stage(checkpoint, stage, elapsed.as_millis() as u64, output_path);
    checkpoint_io::persist_checkpoint(subfolder, checkpoint)?;
    Ok(interrupted.load(Ordering::SeqCst))
}

fn segment_text(segment: &Segment, pages: &[Page]) -> String {
    pages
        .iter()
        .filter(|p| p.page_number >= segment.page_start && p.page_number <= segment.page_end)
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pages in `1..=page_count` not covered by any non-separator segment.
fn coverage_gaps(segments: &[Segment], page_count: u32) -> Vec<u32> {
    let mut covered: HashSet<u32> = HashSet::new();
    for segment in segments.iter().filter(|s| !s.is_separator()) {
        for page in segment.page_start..=segment.page_end {
            covered.insert(page);
        }
    }
    (1..=page_count).filter(|p| !covered.contains(p)).collect()
}

/// Runs every stage for one PDF, checkpointing after each. Reuses stage 4's
/// and stage 5's persisted artifacts on a valid resume instead of recomputing
/// them; every other stage always runs fresh since it is cheap and
/// deterministic.
fn run_single_pdf(file: &SourceFile, subfolder: &Path, cfg: &PipelineConfig, caps: &Capabilities, interrupted: &AtomicBool) -> Result<RunOutcome> {
    layout::ensure_skeleton(subfolder)?;
    let decisions = DecisionsLog::open(subfolder)?;
    let base = layout::base_name(&file.name);
    let pipeline_version = crate::PIPELINE_VERSION;
    let pdf_path = &file.source_path;

    let checkpoint_existed = subfolder.join(".checkpoint.json").is_file();
    let mut checkpoint = checkpoint_io::load_resumable_checkpoint(subfolder, pipeline_version, pdf_path).unwrap_or_else(|| {
        if checkpoint_existed {
            warn!(file = %file.name, "existing checkpoint is stale, corrupt, or from a different pipeline version; restarting from stage 1");
        }
        Checkpoint::new(pipeline_version, pdf_path.clone(), Utc::now())
    });

    let mut limitations: Vec<String> = Vec::new();
    let missing = caps.missing();
    if !missing.is_empty() {
        limitations.push(format!("missing capabilities: {}", missing.join(", ")));
    }

    // Stage 1: intake
    let t0 = Instant::now();
    let file_manifest = intake::ingest(pdf_path, false)?;
    let intake_path = layout::intake_dir(subfolder).join(Manifest::filename(file_manifest.generated_at));
    checkpoint_io::atomic_write_json(&intake_path, &file_manifest)?;
    decisions.record(Utc::now(), &format!("stage 1: registered {} ({} bytes, sha256 {})", file.name, file.size, file.sha256))?;
    if finish_stage(&mut checkpoint, subfolder, 1, t0.elapsed(), Some(intake_path), interrupted)? {
        return Ok(RunOutcome::Interrupted);
    }

    // Stage 2: bootstrap extraction, per-page profiling, document classification
    let t1 = Instant::now();
    let page_count = determine_page_count(pdf_path, caps, cfg);
    let bootstrap_pages = extract::fast_parse_per_page(pdf_path, page_count, caps, cfg);
    let page_profiles = profiler::profile_pages(&bootstrap_pages, cfg);
    let doc_profile = profiler::aggregate_document(&page_profiles, cfg);
    let bootstrap_text = bootstrap_pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\x0c\n");
    let doc_classification = classify(&bootstrap_text);

    let profile_path = layout::profiles_dir(subfolder).join(format!("{base}-profile.json"));
    checkpoint_io::atomic_write_json(
        &profile_path,
        &ProfileArtifact { document: doc_profile.clone(), pages: page_profiles.clone() },
    )?;
    let classification_path = layout::profiles_dir(subfolder).join(format!("{base}-classification.json"));
    checkpoint_io::atomic_write_json(&classification_path, &doc_classification)?;
    decisions.record(
        Utc::now(),
        &format!(
            "stage 2: median readability {:.1}, doc_type {} ({:.2} confidence)",
            doc_profile.median_readability, doc_classification.primary_type, doc_classification.confidence
        ),
    )?;
    if finish_stage(&mut checkpoint, subfolder, 2, t1.elapsed(), Some(profile_path), interrupted)? {
        return Ok(RunOutcome::Interrupted);
    }

    // Stage 3: routing
    let t2 = Instant::now();
    let route_decision = router::route_document(&file.name, &doc_profile, false, false);
    let page_routes: Vec<PageRoute> = page_profiles.iter().map(router::route_page).collect();
    let route_path = layout::routes_dir(subfolder).join(format!("{base}-route.json"));
    checkpoint_io::atomic_write_json(&route_path, &route_decision)?;
    let page_routes_path = layout::routes_dir(subfolder).join(format!("{base}-page-routes.json"));
    checkpoint_io::atomic_write_json(&page_routes_path, &page_routes)?;
    decisions.record(
        Utc::now(),
        &format!("stage 3: routed {:?} via {} ({})", route_decision.method, route_decision.engine, route_decision.rationale),
    )?;
    if finish_stage(&mut checkpoint, subfolder, 3, t2.elapsed(), Some(route_path), interrupted)? {
        return Ok(RunOutcome::Interrupted);
    }

    // Stage 4: hybrid extraction. Reused from disk on a valid resume.
    let t3 = Instant::now();
    let extracted_path = layout::extracted_dir(subfolder).join(format!("{base}-extracted.json"));
    let extracted: ExtractedDocument = if checkpoint.completed_stages.contains(&4) && extracted_path.is_file() {
        checkpoint_io::read_json(&extracted_path)?
    } else {
        let result = extract::extract_hybrid(pdf_path, &bootstrap_pages, &page_routes, caps, cfg);
        checkpoint_io::atomic_write_json(&extracted_path, &result)?;
        result
    };
    decisions.record(
        Utc::now(),
        &format!(
            "stage 4: extraction confidence {:.2}, {} OCR page(s)",
            extracted.overall_confidence,
            extracted.ocr_pages.as_ref().map(|v| v.len()).unwrap_or(0)
        ),
    )?;
    if finish_stage(&mut checkpoint, subfolder, 4, t3.elapsed(), Some(extracted_path), interrupted)? {
        return Ok(RunOutcome::Interrupted);
    }

    // Repetitive-chrome stripping sits between extraction and segmentation;
    // it is cheap and deterministic, so it is not its own checkpointed stage.
    let page_texts: Vec<String> = extracted.pages.iter().map(|p| p.text.clone()).collect();
    let stripped = profiler::strip_repetitive_content(&page_texts, cfg.header_lines, cfg.footer_lines, cfg.repetitive_threshold);
    let cleaned_pages: Vec<Page> = extracted
        .pages
        .iter()
        .cloned()
        .zip(stripped)
        .map(|(mut page, text)| {
            page.text = text;
            page
        })
        .collect();

    // Stage 5: segmentation, per-segment L1, contextual L2. Reused from disk
    // on a valid resume.
    let t4 = Instant::now();
    let segments_path = layout::segments_dir(subfolder).join(format!("{base}-segments.json"));
    let segments: Vec<Segment> = if checkpoint.completed_stages.contains(&5) && segments_path.is_file() {
        checkpoint_io::read_json(&segments_path)?
    } else {
        let mut segments = segmenter::segment_pages(&cleaned_pages, Some(&doc_classification));
        segmenter::renumber_segments(&mut segments);
        let segment_texts: Vec<(usize, String)> = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| (i, segment_text(segment, &cleaned_pages)))
            .collect();
        reclassify::run_l1_pass(&mut segments, &segment_texts);
        reclassify::run_l2_pass(&mut segments, Some(&doc_classification.primary_type), doc_classification.confidence);
        checkpoint_io::atomic_write_json(&segments_path, &segments)?;
        segments
    };

    let gaps = coverage_gaps(&segments, page_count);
    if !gaps.is_empty() {
        warn!(file = %file.name, ?gaps, "page coverage gap: pages not covered by any segment");
        limitations.push(format!("orphan pages not covered by any segment: {gaps:?}"));
    }

    decisions.record(Utc::now(), &format!("stage 5: produced {} segment(s)", segments.len()))?;
    if finish_stage(&mut checkpoint, subfolder, 5, t4.elapsed(), Some(segments_path), interrupted)? {
        return Ok(RunOutcome::Interrupted);
    }

    // Stage 6: export and QC. Terminal stage, so no skip-ahead check needed.
    let t5 = Instant::now();
    let markdown_dir = layout::markdown_dir(subfolder);
    let review_dir = layout::review_dir(subfolder);
    let index = export::export_document(
        &segments,
        &cleaned_pages,
        &file.name,
        &pdf_path.to_string_lossy(),
        &extracted,
        &markdown_dir,
        pipeline_version,
        Utc::now(),
    )?;
    let qc_outcome = qc::validate_document(&index, &markdown_dir, &review_dir, &file.name, cfg)?;
    for warning in &qc_outcome.coverage_warnings {
        limitations.push(warning.clone());
    }

    let mut type_histogram: BTreeMap<String, usize> = BTreeMap::new();
    for segment in segments.iter().filter(|s| !s.is_separator()) {
        *type_histogram.entry(segment.doc_type.clone()).or_insert(0) += 1;
    }

    let mut review_reasons = Vec::new();
    if qc_outcome.summary.rejected > 0 {
        review_reasons.push(format!("{} file(s) rejected by QC", qc_outcome.summary.rejected));
    }
    if !gaps.is_empty() {
        review_reasons.push("page coverage gap".to_string());
    }
    let review_needed = !review_reasons.is_empty();

    let report = PipelineReport {
        source: file.name.clone(),
        page_count: page_count as usize,
        intake_registered: file_manifest.summary.registered,
        intake_duplicates: file_manifest.summary.duplicates,
        profiling: ProfilingSummary {
            median_readability: doc_profile.median_readability,
            quality_tier: format!("{:?}", doc_profile.quality_tier),
            degraded_count: doc_profile.degraded_count,
            clean_count: doc_profile.clean_count,
        },
        route_method: format!("{:?}", route_decision.method),
        extract: ExtractSummary {
            method: extracted.method.as_str().to_string(),
            overall_confidence: extracted.overall_confidence,
            ocr_pages: extracted.ocr_pages.clone(),
        },
        segments: SegmentSummary { total: segments.iter().filter(|s| !s.is_separator()).count(), type_histogram },
        export_count: index.entries.len(),
        qc: qc_outcome.summary,
        limitations,
        review_needed,
        review_reasons,
    };

    let report_path = subfolder.join("pipeline-report.json");
    checkpoint_io::atomic_write_json(&report_path, &report)?;
    decisions.record(
        Utc::now(),
        &format!(
            "stage 6: exported {} file(s); qc passed={} flagged={} rejected={}",
            index.entries.len(),
            report.qc.passed,
            report.qc.flagged,
            report.qc.rejected
        ),
    )?;
    mark_stage(&mut checkpoint, 6, t5.elapsed(), Some(report_path));
    checkpoint_io::persist_checkpoint(subfolder, &checkpoint)?;

    Ok(RunOutcome::Completed(report))
}

fn subfolder_for(output_base: &Path, is_batch: bool, base_name: &str) -> PathBuf {
    if is_batch {
        output_base.join(base_name)
    } else {
        output_base.to_path_buf()
    }
}

/// Runs the pipeline over `source` (a single PDF or a directory of them),
/// writing every artifact under `output_base`. Returns the folded batch
/// report and whether the run stopped early because `interrupted` was set.
pub fn run(source: &Path, output_base: &Path, cfg: &PipelineConfig, caps: &Capabilities, interrupted: &AtomicBool) -> Result<(BatchReport, bool)> {
    std::fs::create_dir_all(output_base).map_err(|e| PipelineError::Io {
        path: output_base.to_path_buf(),
        message: e.to_string(),
    })?;

    let missing = caps.missing();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "starting with degraded capabilities");
    }

    let manifest = intake::ingest(source, true)?;
    let is_batch = source.is_dir();

    let mut reports = Vec::new();
    let mut was_interrupted = false;

    for file in &manifest.files {
        if interrupted.load(Ordering::SeqCst) {
            was_interrupted = true;
            break;
        }
        let subfolder = subfolder_for(output_base, is_batch, &layout::base_name(&file.name));
        match run_single_pdf(file, &subfolder, cfg, caps, interrupted)? {
            RunOutcome::Completed(report) => reports.push(report),
            RunOutcome::Interrupted => {
                was_interrupted = true;
                break;
            }
        }
    }

    let batch_report = BatchReport::from_reports(reports);
    if is_batch {
        checkpoint_io::atomic_write_json(&output_base.join("batch-report.json"), &batch_report)?;
    }
    Ok((batch_report, was_interrupted))
}

/// Resumes a previously started single-PDF run from an explicit checkpoint
/// file. A malformed or missing file is a hard error (there is no source to
/// fall back to); a checksum mismatch is not — the checkpoint still names a
/// `source`, so the file restarts from stage 1 with a warning, same as the
/// auto-discovery inside [`run_single_pdf`] does for a fresh batch run.
pub fn resume(checkpoint_path: &Path, cfg: &PipelineConfig, caps: &Capabilities, interrupted: &AtomicBool) -> Result<(BatchReport, bool)> {
    // Parsed only to recover `source`; a checksum mismatch is not an error
    // here, run_single_pdf's own auto-discovery re-reads and warns about it.
    let checkpoint = checkpoint_io::parse_checkpoint_at(checkpoint_path)?;
    let subfolder = checkpoint_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    layout::ensure_skeleton(&subfolder)?;

    let source = checkpoint.source.clone();
    let manifest = intake::ingest(&source, false)?;
    let file = manifest.files.into_iter().next().ok_or_else(|| PipelineError::InvalidCheckpoint {
        path: checkpoint_path.to_path_buf(),
        message: format!("source {} referenced by the checkpoint no longer exists", source.display()),
    })?;

    match run_single_pdf(&file, &subfolder, cfg, caps, interrupted)? {
        RunOutcome::Completed(report) => Ok((BatchReport::from_reports(vec![report]), false)),
        RunOutcome::Interrupted => Ok((BatchReport::default(), true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::capability::{CapabilityResult, OcrCapability, RasterCapability, RotateCapability, TextCapability};
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;

    struct FakeText {
        text: String,
    }
    impl TextCapability for FakeText {
        fn is_available(&self) -> bool {
            true
        }
        fn extract_page(&self, _: &Path, page: u32, _: Duration) -> CapabilityResult<String> {
            let _ = page;
            Ok(self.text.clone())
        }
        fn extract_document(&self, _: &Path, _: Duration) -> CapabilityResult<String> {
            Ok(self.text.clone())
        }
        fn page_count(&self, _: &Path, _: Duration) -> CapabilityResult<u32> {
            Ok(2)
        }
    }

    struct UnavailableRaster;
    impl RasterCapability for UnavailableRaster {
        fn is_available(&self) -> bool {
            false
        }
        fn rasterize_page(&self, _: &Path, _: u32, _: u32, _: Duration) -> CapabilityResult<PathBuf> {
            Err(crate::extract::capability::CapabilityFailure::Unavailable)
        }
    }

    struct UnavailableOcr;
    impl OcrCapability for UnavailableOcr {
        fn is_available(&self) -> bool {
            false
        }
        fn recognize(&self, _: &Path, _: u8, _: Duration) -> CapabilityResult<String> {
            Err(crate::extract::capability::CapabilityFailure::Unavailable)
        }
    }

    struct UnavailableRotate;
    impl RotateCapability for UnavailableRotate {
        fn is_available(&self) -> bool {
            false
        }
        fn rotate(&self, _: &Path, _: u16, _: Duration) -> CapabilityResult<PathBuf> {
            Err(crate::extract::capability::CapabilityFailure::Unavailable)
        }
    }

    fn fast_path_caps() -> Capabilities {
        Capabilities {
            text: Box::new(FakeText {
                text: "EXCELENTÍSSIMO SENHOR DOUTOR JUIZ\nVem o autor propor a presente ação \
                       com fundamento nos fatos e argumentos a seguir articulados."
                    .to_string(),
            }),
            raster: Box::new(UnavailableRaster),
            ocr: Box::new(UnavailableOcr),
            rotate: Box::new(UnavailableRotate),
        }
    }

    fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 fake content for a test fixture").unwrap();
        path
    }

    #[test]
    fn a_clean_run_produces_a_report_and_markdown() {
        let source_dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(source_dir.path(), "Inicial.pdf");
        let output_dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::default();
        let caps = fast_path_caps();
        let interrupted = AtomicBool::new(false);

        let (batch, stopped) = run(&pdf, output_dir.path(), &cfg, &caps, &interrupted).unwrap();
        assert!(!stopped);
        assert_eq!(batch.reports.len(), 1);
        assert!(output_dir.path().join("pipeline-report.json").is_file());
        assert!(output_dir.path().join("markdown").join("index.json").is_file());
    }

    #[test]
    fn an_already_interrupted_flag_stops_before_any_work() {
        let source_dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(source_dir.path(), "Inicial.pdf");
        let output_dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::default();
        let caps = fast_path_caps();
        let interrupted = AtomicBool::new(true);

        let (batch, stopped) = run(&pdf, output_dir.path(), &cfg, &caps, &interrupted).unwrap();
        assert!(stopped);
        assert!(batch.reports.is_empty());
    }

    #[test]
    fn resuming_a_completed_checkpoint_reproduces_the_same_report() {
        let source_dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(source_dir.path(), "Inicial.pdf");
        let output_dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::default();
        let caps = fast_path_caps();
        let interrupted = AtomicBool::new(false);

        let (first, _) = run(&pdf, output_dir.path(), &cfg, &caps, &interrupted).unwrap();
        let checkpoint_path = output_dir.path().join(".checkpoint.json");
        let (second, stopped) = resume(&checkpoint_path, &cfg, &caps, &interrupted).unwrap();

        assert!(!stopped);
        assert_eq!(first.reports[0].export_count, second.reports[0].export_count);
    }

    #[test]
    fn resuming_a_missing_checkpoint_is_an_error() {
        let output_dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::default();
        let caps = fast_path_caps();
        let interrupted = AtomicBool::new(false);
        let result = resume(&output_dir.path().join(".checkpoint.json"), &cfg, &caps, &interrupted);
        assert!(result.is_err());
    }
}
