use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QcSummary {
    pub passed: usize,
    pub flagged: usize,
    pub rejected: usize,
    pub mislabels_caught: usize,
}

impl QcSummary {
    pub fn merge(&self, other: &QcSummary) -> QcSummary {
        QcSummary {
            passed: self.passed + other.passed,
            flagged: self.flagged + other.flagged,
            rejected: self.rejected + other.rejected,
            mislabels_caught: self.mislabels_caught + other.mislabels_caught,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilingSummary {
    pub median_readability: f64,
    pub quality_tier: String,
    pub degraded_count: usize,
    pub clean_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractSummary {
    pub method: String,
    pub overall_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_pages: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub total: usize,
    pub type_histogram: BTreeMap<String, usize>,
}

/// Compact per-PDF record. Kept under 5 KB for a 100+ page input by
/// summarizing rather than embedding full per-page or per-segment detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub source: String,
    pub page_count: usize,
    pub intake_registered: usize,
    pub intake_duplicates: usize,
    pub profiling: ProfilingSummary,
    pub route_method: String,
    pub extract: ExtractSummary,
    pub segments: SegmentSummary,
    pub export_count: usize,
    pub qc: QcSummary,
    pub limitations: Vec<String>,
    pub review_needed: bool,
    pub review_reasons: Vec<String>,
}

/// Sums every per-PDF [`QcSummary`] across the batch. The merge is additive
/// by construction: folding never replaces an accumulator with the latest
/// report, only adds to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub reports: Vec<PipelineReport>,
    pub summary: QcSummary,
}

impl BatchReport {
    pub fn from_reports(reports: Vec<PipelineReport>) -> Self {
        let summary = reports
            .iter()
            .fold(QcSummary::default(), |acc, report| acc.merge(&report.qc));
        Self { reports, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_qc(qc: QcSummary) -> PipelineReport {
        PipelineReport {
            qc,
            ..Default::default()
        }
    }

    #[test]
    fn batch_summary_sums_every_report_not_just_the_last() {
        let reports = vec![
            report_with_qc(QcSummary { passed: 3, flagged: 1, rejected: 0, mislabels_caught: 0 }),
            report_with_qc(QcSummary { passed: 2, flagged: 0, rejected: 1, mislabels_caught: 1 }),
            report_with_qc(QcSummary { passed: 5, flagged: 2, rejected: 0, mislabels_caught: 0 }),
        ];
        let batch = BatchReport::from_reports(reports);
        assert_eq!(batch.summary, QcSummary { passed: 10, flagged: 3, rejected: 1, mislabels_caught: 1 });
    }

    #[test]
    fn empty_batch_has_zeroed_summary() {
        let batch = BatchReport::from_reports(Vec::new());
        assert_eq!(batch.summary, QcSummary::default());
    }
}
