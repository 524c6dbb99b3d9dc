//! Structured diffing of two replay result documents
//!
//! Takes two result files (typically one recorded from the GPU pipeline
//! and one produced by this reference), aligns them frame-by-frame and
//! metric-by-key, and grades every metric against the validation
//! tolerance: within 1% relative difference is acceptable, up to 5% is
//! suspicious, beyond that the pipelines have diverged.
//!
//! This module only computes; it renders nothing. Terminal presentation
//! lives in the comparison binary, keyed off [`Severity`], so color and
//! layout never leak into the validation logic.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::capture::CaptureError;

/// Relative difference below which a metric counts as matching (percent)
pub const OK_THRESHOLD_PCT: f64 = 1.0;
/// Relative difference above which a metric counts as diverged (percent)
pub const FAIL_THRESHOLD_PCT: f64 = 5.0;

/// Verdict for one compared metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Relative difference within the acceptance tolerance
    Ok,
    /// Noticeable difference, below the failure threshold
    Warning,
    /// Difference beyond the failure threshold
    Fail,
    /// One side is missing or not a number; nothing to grade
    NotApplicable,
}

impl Severity {
    fn from_relative_pct(pct: f64) -> Self {
        if pct.abs() > FAIL_THRESHOLD_PCT {
            Severity::Fail
        } else if pct.abs() > OK_THRESHOLD_PCT {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

/// One metric of one frame, compared across both documents
#[derive(Debug, Clone)]
pub struct MetricComparison {
    /// Flattened metric key, e.g. `pass4_water.sum`
    pub key: String,
    /// Value from the reference document, when numeric
    pub reference: Option<f64>,
    /// Value from the candidate document, when numeric
    pub candidate: Option<f64>,
    /// `reference - candidate`
    pub absolute_diff: Option<f64>,
    /// Difference relative to the reference value, in percent
    pub relative_pct: Option<f64>,
    pub severity: Severity,
}

impl MetricComparison {
    fn evaluate(key: String, reference: Option<&Value>, candidate: Option<&Value>) -> Self {
        match (
            reference.and_then(Value::as_f64),
            candidate.and_then(Value::as_f64),
        ) {
            (Some(a), Some(b)) => {
                let diff = a - b;
                // A reference near zero makes the relative measure
                // meaningless; treat those metrics as matching.
                let rel = if a.abs() > 1e-9 { diff / a * 100.0 } else { 0.0 };
                Self {
                    key,
                    reference: Some(a),
                    candidate: Some(b),
                    absolute_diff: Some(diff),
                    relative_pct: Some(rel),
                    severity: Severity::from_relative_pct(rel),
                }
            }
            (a, b) => Self {
                key,
                reference: a,
                candidate: b,
                absolute_diff: None,
                relative_pct: None,
                severity: Severity::NotApplicable,
            },
        }
    }
}

/// All metric comparisons of one aligned frame
#[derive(Debug, Clone)]
pub struct FrameComparison {
    /// Positional frame index shared by both documents
    pub frame: usize,
    pub metrics: Vec<MetricComparison>,
}

/// Full comparison of two result documents
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    /// Frame count of the reference document
    pub reference_frames: usize,
    /// Frame count of the candidate document
    pub candidate_frames: usize,
    /// One entry per aligned frame, up to the shorter document
    pub frames: Vec<FrameComparison>,
}

impl ComparisonReport {
    /// Whether the documents disagree on frame count.
    #[must_use]
    pub fn frame_count_mismatch(&self) -> bool {
        self.reference_frames != self.candidate_frames
    }

    /// The worst graded severity in the report.
    ///
    /// Ungradeable metrics do not participate: a missing key is reported
    /// per-metric but cannot fail a run on its own.
    #[must_use]
    pub fn worst_severity(&self) -> Severity {
        let mut worst = Severity::Ok;
        for frame in &self.frames {
            for metric in &frame.metrics {
                match metric.severity {
                    Severity::Fail => return Severity::Fail,
                    Severity::Warning => worst = Severity::Warning,
                    Severity::Ok | Severity::NotApplicable => {}
                }
            }
        }
        worst
    }
}

/// A result document as the comparison sees it: frame records only.
///
/// Records stay raw JSON so a document produced by any pipeline version
/// can be compared; absent or extra keys degrade to per-metric
/// "not applicable" entries instead of parse failures.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsDocument {
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Load a result document for comparison.
///
/// # Errors
///
/// Returns [`CaptureError::LoadFailed`] when the file cannot be read and
/// [`CaptureError::ParseFailed`] when it is not valid JSON.
pub fn load_metrics_document<P: AsRef<Path>>(path: P) -> Result<MetricsDocument, CaptureError> {
    let contents =
        fs::read_to_string(path).map_err(|e| CaptureError::LoadFailed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CaptureError::ParseFailed(e.to_string()))
}

fn collect_metric_keys(frames: &[Value], keys: &mut BTreeSet<String>) {
    for record in frames {
        let Some(data) = record.get("data").and_then(Value::as_object) else {
            continue;
        };
        for (pass, stats) in data {
            match stats.as_object() {
                Some(obj) => {
                    for stat in obj.keys() {
                        keys.insert(format!("{pass}.{stat}"));
                    }
                }
                None => {
                    keys.insert(pass.clone());
                }
            }
        }
    }
}

fn lookup<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    let data = record.get("data")?;
    match key.split_once('.') {
        Some((pass, stat)) => data.get(pass)?.get(stat),
        None => data.get(key),
    }
}

/// Compare two result documents frame-by-frame.
///
/// The metric key set is the sorted union over every frame of both
/// documents, so a key present on only one side still shows up in the
/// report (as ungradeable) instead of being silently dropped. On a frame
/// count mismatch the comparison covers the shorter document.
#[must_use]
pub fn compare_documents(
    reference: &MetricsDocument,
    candidate: &MetricsDocument,
) -> ComparisonReport {
    let mut keys = BTreeSet::new();
    collect_metric_keys(&reference.data, &mut keys);
    collect_metric_keys(&candidate.data, &mut keys);

    let reference_frames = reference.data.len();
    let candidate_frames = candidate.data.len();
    if reference_frames != candidate_frames {
        warn!(
            "Frame counts differ ({} vs {}), comparing up to the shorter run",
            reference_frames, candidate_frames
        );
    }

    let aligned = reference_frames.min(candidate_frames);
    let frames = (0..aligned)
        .map(|i| FrameComparison {
            frame: i,
            metrics: keys
                .iter()
                .map(|key| {
                    MetricComparison::evaluate(
                        key.clone(),
                        lookup(&reference.data[i], key),
                        lookup(&candidate.data[i], key),
                    )
                })
                .collect(),
        })
        .collect();

    ComparisonReport {
        reference_frames,
        candidate_frames,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn document(frames: Vec<Value>) -> MetricsDocument {
        serde_json::from_value(json!({ "history": [], "data": frames })).unwrap()
    }

    fn water_frame(frame: u64, sum: f64) -> Value {
        json!({ "frame": frame, "data": { "pass1_water": { "sum": sum } } })
    }

    fn find<'a>(report: &'a ComparisonReport, key: &str) -> &'a MetricComparison {
        report.frames[0]
            .metrics
            .iter()
            .find(|m| m.key == key)
            .unwrap()
    }

    #[test]
    fn test_identical_documents_grade_ok() {
        let doc = document(vec![water_frame(0, 1.6)]);
        let report = compare_documents(&doc, &doc);

        assert_eq!(report.frames.len(), 1);
        let metric = find(&report, "pass1_water.sum");
        assert_eq!(metric.severity, Severity::Ok);
        assert_relative_eq!(metric.relative_pct.unwrap(), 0.0);
        assert_eq!(report.worst_severity(), Severity::Ok);
    }

    #[test]
    fn test_severity_thresholds() {
        let reference = document(vec![water_frame(0, 100.0)]);

        let half_pct = document(vec![water_frame(0, 100.5)]);
        let report = compare_documents(&reference, &half_pct);
        assert_eq!(find(&report, "pass1_water.sum").severity, Severity::Ok);

        let three_pct = document(vec![water_frame(0, 103.0)]);
        let report = compare_documents(&reference, &three_pct);
        let metric = find(&report, "pass1_water.sum");
        assert_eq!(metric.severity, Severity::Warning);
        assert_relative_eq!(metric.relative_pct.unwrap(), -3.0, epsilon = 1e-9);

        let ten_pct = document(vec![water_frame(0, 110.0)]);
        let report = compare_documents(&reference, &ten_pct);
        assert_eq!(find(&report, "pass1_water.sum").severity, Severity::Fail);
        assert_eq!(report.worst_severity(), Severity::Fail);
    }

    #[test]
    fn test_near_zero_reference_counts_as_match() {
        let reference = document(vec![water_frame(0, 0.0)]);
        let candidate = document(vec![water_frame(0, 5.0)]);
        let report = compare_documents(&reference, &candidate);

        let metric = find(&report, "pass1_water.sum");
        assert_eq!(metric.severity, Severity::Ok);
        assert_relative_eq!(metric.relative_pct.unwrap(), 0.0);
    }

    #[test]
    fn test_non_numeric_value_is_not_applicable() {
        let reference = document(vec![json!({
            "frame": 0,
            "data": { "pass1_water": { "sum": "corrupt" } }
        })]);
        let candidate = document(vec![water_frame(0, 1.0)]);
        let report = compare_documents(&reference, &candidate);

        let metric = find(&report, "pass1_water.sum");
        assert_eq!(metric.severity, Severity::NotApplicable);
        assert_eq!(metric.reference, None);
        assert_eq!(metric.candidate, Some(1.0));
        assert_eq!(report.worst_severity(), Severity::Ok);
    }

    #[test]
    fn test_one_sided_key_is_reported_not_dropped() {
        let reference = document(vec![json!({
            "frame": 0,
            "data": {
                "pass1_water": { "sum": 1.0 },
                "pass2_velocity": { "max": 0.5 }
            }
        })]);
        let candidate = document(vec![water_frame(0, 1.0)]);
        let report = compare_documents(&reference, &candidate);

        let metric = find(&report, "pass2_velocity.max");
        assert_eq!(metric.severity, Severity::NotApplicable);
        assert_eq!(metric.reference, Some(0.5));
        assert_eq!(metric.candidate, None);
    }

    #[test]
    fn test_metric_keys_are_sorted_union() {
        let reference = document(vec![json!({
            "frame": 0,
            "data": { "pass6_water": { "sum": 1.0 }, "pass1_water": { "sum": 1.0 } }
        })]);
        let candidate = document(vec![json!({
            "frame": 0,
            "data": { "pass3_terrain": { "min": 0.0 } }
        })]);
        let report = compare_documents(&reference, &candidate);

        let keys: Vec<&str> = report.frames[0]
            .metrics
            .iter()
            .map(|m| m.key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec!["pass1_water.sum", "pass3_terrain.min", "pass6_water.sum"]
        );
    }

    #[test]
    fn test_frame_count_mismatch_compares_shorter() {
        let reference = document(vec![water_frame(0, 1.0), water_frame(1, 2.0)]);
        let candidate = document(vec![
            water_frame(0, 1.0),
            water_frame(1, 2.0),
            water_frame(2, 3.0),
        ]);
        let report = compare_documents(&reference, &candidate);

        assert!(report.frame_count_mismatch());
        assert_eq!(report.frames.len(), 2);
        assert_eq!(report.reference_frames, 2);
        assert_eq!(report.candidate_frames, 3);
    }

    #[test]
    fn test_missing_data_array_means_zero_frames() {
        let empty: MetricsDocument = serde_json::from_value(json!({ "history": [] })).unwrap();
        let candidate = document(vec![water_frame(0, 1.0)]);
        let report = compare_documents(&empty, &candidate);
        assert_eq!(report.frames.len(), 0);
        assert!(report.frame_count_mismatch());
    }
}
