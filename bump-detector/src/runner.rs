use pcd_core::geometry::Plane;
use pcd_core::pointcloud::normal::{KdTreeNormalEstimator, NormalEstimator};
use pcd_core::pointcloud::outlier::{OutlierFilter, StatisticalOutlierFilter};
use pcd_core::pointcloud::point::{Point, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::classify::{annotate, ThresholdBands};
use crate::config::DetectorConfig;
use crate::error::DetectorError;
use crate::merge::merge_segments;
use crate::plane::{PlaneEstimator, RansacPlaneEstimator};
use crate::report::{DetectionReport, SegmentOutcome, SegmentReport};
use crate::segmentation::{plan_windows, Window};
use crate::statistics::{compute_statistics, SegmentStatistics};
use crate::transform::Transform;

pub trait Transformer {
    fn execute(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError>;
}

pub struct PointCloudTransformer {
    transform: Box<dyn Transform>,
}

impl PointCloudTransformer {
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Self { transform }
    }
}

impl Transformer for PointCloudTransformer {
    fn execute(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError> {
        self.transform.transform(point_cloud)
    }
}

pub trait Detector {
    fn execute(&self, point_cloud: &PointCloud) -> Result<DetectionReport, DetectorError>;
}

/// Windowed plane-fit detector.
///
/// Every window is fitted and classified independently on the rayon pool; results
/// are merged in window order so the output does not depend on scheduling.
pub struct BumpDetector {
    config: DetectorConfig,
    bands: ThresholdBands,
    plane_estimator: Box<dyn PlaneEstimator>,
    normal_estimator: Box<dyn NormalEstimator + Send + Sync>,
    segment_filter: Option<Box<dyn OutlierFilter + Send + Sync>>,
}

impl BumpDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        config.validate()?;

        let plane_estimator = Box::new(RansacPlaneEstimator::from_config(&config));
        let normal_estimator = Box::new(KdTreeNormalEstimator {
            radius: config.normal_search_radius,
            max_neighbours: config.normal_max_neighbours,
        });
        let segment_filter = config.segment_outlier_removal.map(|outlier| {
            Box::new(StatisticalOutlierFilter {
                neighbours: outlier.neighbours,
                std_ratio: outlier.std_ratio,
            }) as Box<dyn OutlierFilter + Send + Sync>
        });

        Ok(Self {
            bands: ThresholdBands::from_config(&config),
            config,
            plane_estimator,
            normal_estimator,
            segment_filter,
        })
    }

    pub fn with_plane_estimator(mut self, plane_estimator: Box<dyn PlaneEstimator>) -> Self {
        self.plane_estimator = plane_estimator;
        self
    }

    pub fn with_normal_estimator(
        mut self,
        normal_estimator: Box<dyn NormalEstimator + Send + Sync>,
    ) -> Self {
        self.normal_estimator = normal_estimator;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn base_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::thread_rng().gen();
                log::info!("no seed configured, using {}", seed);
                seed
            }
        }
    }

    fn process_window(
        &self,
        point_cloud: &PointCloud,
        window: &Window,
        base_seed: u64,
    ) -> (PointCloud, SegmentReport) {
        let segment = point_cloud.slice(window.range());
        let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(window.index as u64));

        match self.evaluate(segment.points(), &mut rng) {
            Ok((plane, statistics)) => {
                let is_bump = self.bands.is_bump(&statistics);
                log::debug!(
                    "window {} [{}, {}]: distance std {:.3}, angle deviation {:.3} -> {}",
                    window.index,
                    window.start,
                    window.end,
                    statistics.distance_std,
                    statistics.mean_angle_deviation,
                    if is_bump { "bump" } else { "clear" }
                );
                let report = SegmentReport {
                    window: *window,
                    plane: Some(plane.coefficients()),
                    statistics: Some(statistics),
                    outcome: if is_bump {
                        SegmentOutcome::Bump
                    } else {
                        SegmentOutcome::Clear
                    },
                };
                (annotate(segment, is_bump), report)
            }
            Err(e) => {
                log::warn!(
                    "skipping window {} [{}, {}]: {}",
                    window.index,
                    window.start,
                    window.end,
                    e
                );
                let report = SegmentReport {
                    window: *window,
                    plane: None,
                    statistics: None,
                    outcome: SegmentOutcome::Skipped {
                        reason: e.to_string(),
                    },
                };
                (segment, report)
            }
        }
    }

    // The segment filter only shapes the fit; the whole window is still emitted.
    fn evaluate(
        &self,
        points: &[Point],
        rng: &mut StdRng,
    ) -> Result<(Plane, SegmentStatistics), DetectorError> {
        let filtered: Vec<Point>;
        let points = match &self.segment_filter {
            Some(filter) => {
                let kept = filter.inlier_indices(points)?;
                filtered = kept.iter().map(|&i| points[i]).collect();
                &filtered[..]
            }
            None => points,
        };

        let plane = self.plane_estimator.estimate(points, rng)?;
        let statistics = compute_statistics(points, &plane, self.normal_estimator.as_ref())?;
        Ok((plane, statistics))
    }
}

impl Detector for BumpDetector {
    fn execute(&self, point_cloud: &PointCloud) -> Result<DetectionReport, DetectorError> {
        if point_cloud.is_empty() {
            return Err(DetectorError::InvalidInput(
                "cannot detect bumps in an empty point cloud".to_string(),
            ));
        }

        let windows = plan_windows(
            point_cloud.len(),
            self.config.segment_count,
            self.config.overlap_fraction,
        )?;
        log::info!(
            "evaluating {} windows over {} points",
            windows.len(),
            point_cloud.len()
        );

        let base_seed = self.base_seed();
        let (segments, reports): (Vec<PointCloud>, Vec<SegmentReport>) = windows
            .par_iter()
            .map(|window| self.process_window(point_cloud, window, base_seed))
            .collect::<Vec<_>>()
            .into_iter()
            .unzip();

        let flagged_segments = reports.iter().filter(|r| r.outcome.is_bump()).count();
        let cloud = merge_segments(segments);
        log::info!(
            "{} of {} windows flagged, {} points marked",
            flagged_segments,
            reports.len(),
            cloud.flagged_count()
        );

        Ok(DetectionReport {
            cloud,
            flagged_segments,
            segments: reports,
        })
    }
}
