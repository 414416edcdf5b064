use pcd_core::pointcloud::point::PointCloud;
use serde::Serialize;

use crate::segmentation::Window;
use crate::statistics::SegmentStatistics;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentOutcome {
    Bump,
    Clear,
    /// The segment could not be evaluated; its points pass through unchanged.
    Skipped { reason: String },
}

impl SegmentOutcome {
    pub fn is_bump(&self) -> bool {
        matches!(self, SegmentOutcome::Bump)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub window: Window,
    /// `[a, b, c, d]` of the fitted plane.
    pub plane: Option<[f64; 4]>,
    pub statistics: Option<SegmentStatistics>,
    #[serde(flatten)]
    pub outcome: SegmentOutcome,
}

#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Merged cloud, flagged points carry the marker intensity.
    pub cloud: PointCloud,
    pub flagged_segments: usize,
    pub segments: Vec<SegmentReport>,
}

impl DetectionReport {
    pub fn skipped_segments(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s.outcome, SegmentOutcome::Skipped { .. }))
            .count()
    }

    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            point_count: self.cloud.len(),
            flagged_points: self.cloud.flagged_count(),
            flagged_segments: self.flagged_segments,
            skipped_segments: self.skipped_segments(),
            segments: &self.segments,
        }
    }
}

/// Serializable view of a [`DetectionReport`] without the point data.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub point_count: usize,
    pub flagged_points: usize,
    pub flagged_segments: usize,
    pub skipped_segments: usize,
    pub segments: &'a [SegmentReport],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: SegmentOutcome) -> SegmentReport {
        SegmentReport {
            window: Window {
                index: 0,
                start: 0,
                end: 3,
            },
            plane: None,
            statistics: None,
            outcome,
        }
    }

    #[test]
    fn summary_counts_skipped_segments() {
        let detection = DetectionReport {
            cloud: PointCloud::default(),
            flagged_segments: 1,
            segments: vec![
                report(SegmentOutcome::Bump),
                report(SegmentOutcome::Skipped {
                    reason: "collinear".to_string(),
                }),
                report(SegmentOutcome::Clear),
            ],
        };
        let summary = detection.summary();
        assert_eq!(summary.skipped_segments, 1);
        assert_eq!(summary.flagged_segments, 1);
        assert_eq!(summary.segments.len(), 3);
    }

    #[test]
    fn outcome_is_tagged_in_json() {
        let json = serde_json::to_value(report(SegmentOutcome::Skipped {
            reason: "too few points".to_string(),
        }))
        .unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "too few points");
        assert_eq!(json["window"]["end"], 3);
    }
}
