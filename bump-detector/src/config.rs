use serde::{Deserialize, Serialize};

use crate::classify::BoundMode;
use crate::error::DetectorError;

/// Everything the `bumpfinder` pipeline can be tuned with, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub detector: DetectorConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        self.preprocess.validate()?;
        self.detector.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    pub neighbours: usize,
    pub std_ratio: f64,
}

impl OutlierConfig {
    fn validate(&self, context: &str) -> Result<(), DetectorError> {
        if self.neighbours == 0 {
            return Err(config_error(format!("{}.neighbours must be positive", context)));
        }
        if !(self.std_ratio.is_finite() && self.std_ratio > 0.0) {
            return Err(config_error(format!(
                "{}.std_ratio must be a positive number, got {}",
                context, self.std_ratio
            )));
        }
        Ok(())
    }
}

/// Cleaning applied to the raw cloud before segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Keep every k-th point.
    pub uniform_every_k: Option<usize>,
    pub voxel_size: Option<f64>,
    pub outlier: Option<OutlierConfig>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            uniform_every_k: Some(5),
            voxel_size: None,
            outlier: Some(OutlierConfig {
                neighbours: 5,
                std_ratio: 0.3,
            }),
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.uniform_every_k == Some(0) {
            return Err(config_error("preprocess.uniform_every_k must be positive"));
        }
        if let Some(voxel_size) = self.voxel_size {
            if !(voxel_size.is_finite() && voxel_size > 0.0) {
                return Err(config_error(format!(
                    "preprocess.voxel_size must be positive, got {}",
                    voxel_size
                )));
            }
        }
        if let Some(outlier) = &self.outlier {
            outlier.validate("preprocess.outlier")?;
        }
        Ok(())
    }
}

/// Segmentation, plane fitting and classification parameters.
///
/// Defaults are the survey calibration, expressed in LAS integer
/// record units (millimetres for a 0.001 scale). The `dist_std` band was
/// calibrated with a per-segment statistical outlier pass (5 neighbours, ratio
/// 0.3); set `segment_outlier_removal` to that to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub segment_count: usize,
    pub overlap_fraction: f64,

    pub ransac_sample_size: usize,
    pub ransac_iterations: usize,
    pub ransac_inlier_threshold: f64,
    /// Wall-clock limit per segment fit, in milliseconds.
    pub ransac_time_budget_ms: Option<u64>,
    /// Re-fit the best plane by least squares over its inliers.
    pub ransac_refine: bool,

    pub normal_search_radius: f64,
    pub normal_max_neighbours: usize,

    pub min_dist_std: f64,
    pub max_dist_std: f64,
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
    pub bound_mode: BoundMode,

    /// Base seed for the per-segment random generators. `None` draws one per run.
    pub seed: Option<u64>,
    /// Outlier removal applied to each segment before the plane fit and statistics.
    /// `None` by default; see the type docs for the calibrated setting.
    pub segment_outlier_removal: Option<OutlierConfig>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            segment_count: 300,
            overlap_fraction: 0.4,
            ransac_sample_size: 3,
            ransac_iterations: 250,
            ransac_inlier_threshold: 68.0,
            ransac_time_budget_ms: None,
            ransac_refine: true,
            normal_search_radius: 5.0,
            normal_max_neighbours: 20,
            min_dist_std: 14.78,
            max_dist_std: 17.71,
            min_angle_deg: 0.0,
            max_angle_deg: 3.67,
            bound_mode: BoundMode::Exclusive,
            seed: None,
            segment_outlier_removal: None,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.segment_count == 0 {
            return Err(config_error("segment_count must be positive"));
        }
        if !(self.overlap_fraction.is_finite() && (0.0..1.0).contains(&self.overlap_fraction)) {
            return Err(config_error(format!(
                "overlap_fraction must be in [0, 1), got {}",
                self.overlap_fraction
            )));
        }
        if self.ransac_sample_size < 3 {
            return Err(config_error(format!(
                "ransac_sample_size must be at least 3, got {}",
                self.ransac_sample_size
            )));
        }
        if self.ransac_iterations == 0 {
            return Err(config_error("ransac_iterations must be positive"));
        }
        if !(self.ransac_inlier_threshold.is_finite() && self.ransac_inlier_threshold > 0.0) {
            return Err(config_error(format!(
                "ransac_inlier_threshold must be positive, got {}",
                self.ransac_inlier_threshold
            )));
        }
        if self.ransac_time_budget_ms == Some(0) {
            return Err(config_error("ransac_time_budget_ms must be positive"));
        }
        if !(self.normal_search_radius.is_finite() && self.normal_search_radius > 0.0) {
            return Err(config_error(format!(
                "normal_search_radius must be positive, got {}",
                self.normal_search_radius
            )));
        }
        if self.normal_max_neighbours == 0 {
            return Err(config_error("normal_max_neighbours must be positive"));
        }
        self.validate_band("dist_std", self.min_dist_std, self.max_dist_std)?;
        self.validate_band("angle_deg", self.min_angle_deg, self.max_angle_deg)?;
        if let Some(outlier) = &self.segment_outlier_removal {
            outlier.validate("segment_outlier_removal")?;
        }
        Ok(())
    }

    fn validate_band(&self, name: &str, min: f64, max: f64) -> Result<(), DetectorError> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(config_error(format!(
                "min_{0} and max_{0} must be finite, got {1} and {2}",
                name, min, max
            )));
        }
        let empty = match self.bound_mode {
            BoundMode::Exclusive => min >= max,
            BoundMode::Inclusive => min > max,
        };
        if empty {
            return Err(config_error(format!(
                "band {} ({}, {}) cannot contain any value",
                name, min, max
            )));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> DetectorError {
    DetectorError::Configuration(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PipelineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases: Vec<Box<dyn Fn(&mut DetectorConfig)>> = vec![
            Box::new(|c| c.segment_count = 0),
            Box::new(|c| c.overlap_fraction = -0.1),
            Box::new(|c| c.overlap_fraction = 1.0),
            Box::new(|c| c.overlap_fraction = f64::NAN),
            Box::new(|c| c.ransac_sample_size = 2),
            Box::new(|c| c.ransac_iterations = 0),
            Box::new(|c| c.ransac_inlier_threshold = 0.0),
            Box::new(|c| c.ransac_time_budget_ms = Some(0)),
            Box::new(|c| c.normal_search_radius = -1.0),
            Box::new(|c| c.normal_max_neighbours = 0),
            Box::new(|c| c.min_dist_std = c.max_dist_std),
            Box::new(|c| c.max_angle_deg = f64::INFINITY),
            Box::new(|c| {
                c.segment_outlier_removal = Some(OutlierConfig {
                    neighbours: 0,
                    std_ratio: 1.0,
                })
            }),
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut config = DetectorConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(DetectorError::Configuration(_))),
                "case {} was accepted",
                i
            );
        }
    }

    #[test]
    fn inclusive_mode_accepts_single_value_band() {
        let config = DetectorConfig {
            min_angle_deg: 2.0,
            max_angle_deg: 2.0,
            bound_mode: BoundMode::Inclusive,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn segment_outlier_removal_is_opt_in() {
        assert_eq!(DetectorConfig::default().segment_outlier_removal, None);

        let json = r#"{ "segment_outlier_removal": { "neighbours": 5, "std_ratio": 0.3 } }"#;
        let config: DetectorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.segment_outlier_removal,
            Some(OutlierConfig {
                neighbours: 5,
                std_ratio: 0.3
            })
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn preprocess_rejects_zero_step() {
        let config = PreprocessConfig {
            uniform_every_k: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "detector": { "segment_count": 12, "bound_mode": "inclusive" } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detector.segment_count, 12);
        assert_eq!(config.detector.bound_mode, BoundMode::Inclusive);
        assert_eq!(config.detector.ransac_iterations, 250);
        assert_eq!(config.preprocess, PreprocessConfig::default());
    }
}
