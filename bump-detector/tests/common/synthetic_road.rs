use std::ops::Range;

use pcd_core::pointcloud::point::{Point, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A straight road scanned row by row along `x`, with one raised strip across it.
pub struct SyntheticRoad {
    pub rows: usize,
    pub columns: usize,
    pub row_spacing: f64,
    pub column_spacing: f64,
    pub bump_rows: Range<usize>,
    pub bump_height: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticRoad {
    fn default() -> Self {
        Self {
            rows: 1000,
            columns: 9,
            row_spacing: 0.1,
            column_spacing: 0.25,
            bump_rows: 500..505,
            bump_height: 0.1,
            noise: 0.002,
            seed: 3,
        }
    }
}

impl SyntheticRoad {
    pub fn flat() -> Self {
        Self {
            bump_rows: 0..0,
            ..Default::default()
        }
    }

    pub fn build(&self) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::with_capacity(self.rows * self.columns);
        for row in 0..self.rows {
            let raised = if self.bump_rows.contains(&row) {
                self.bump_height
            } else {
                0.0
            };
            for column in 0..self.columns {
                let z = raised + rng.gen_range(-self.noise..=self.noise);
                let intensity = rng.gen_range(0.3..0.9);
                points.push(
                    Point::new(
                        row as f64 * self.row_spacing,
                        column as f64 * self.column_spacing,
                        z,
                        intensity,
                    )
                    .unwrap(),
                );
            }
        }
        PointCloud::new(points)
    }

    /// Whether `point` lies on the raised strip.
    pub fn is_raised(&self, point: &Point) -> bool {
        point.z() > self.bump_height / 2.0
    }
}
