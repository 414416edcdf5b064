use pcd_core::pointcloud::point::PointCloud;
use serde::{Deserialize, Serialize};

use crate::config::DetectorConfig;
use crate::statistics::SegmentStatistics;

/// Whether values equal to a band limit are inside the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundMode {
    /// `min < value < max`
    #[default]
    Exclusive,
    /// `min <= value <= max`
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn contains(&self, value: f64, mode: BoundMode) -> bool {
        match mode {
            BoundMode::Exclusive => self.min < value && value < self.max,
            BoundMode::Inclusive => self.min <= value && value <= self.max,
        }
    }
}

/// Calibrated bands a segment's statistics must fall into to be reported as a bump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBands {
    pub distance_std: Band,
    pub angle_deviation: Band,
    pub mode: BoundMode,
}

impl ThresholdBands {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            distance_std: Band {
                min: config.min_dist_std,
                max: config.max_dist_std,
            },
            angle_deviation: Band {
                min: config.min_angle_deg,
                max: config.max_angle_deg,
            },
            mode: config.bound_mode,
        }
    }

    pub fn is_bump(&self, statistics: &SegmentStatistics) -> bool {
        self.distance_std.contains(statistics.distance_std, self.mode)
            && self
                .angle_deviation
                .contains(statistics.mean_angle_deviation, self.mode)
    }
}

/// Points to emit for a segment: marked when it holds a bump, untouched otherwise.
pub fn annotate(segment: PointCloud, is_bump: bool) -> PointCloud {
    if is_bump {
        segment.mark_all()
    } else {
        segment
    }
}
