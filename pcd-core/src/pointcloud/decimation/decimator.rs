use std::collections::HashMap;

use crate::pointcloud::point::Point;

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point>;
}

/// Keeps every `every_k`-th point, starting with the first one.
pub struct UniformDecimator {
    pub every_k: usize,
}

impl PointCloudDecimator for UniformDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        let step = self.every_k.max(1);
        points.iter().step_by(step).copied().collect()
    }
}

/// Keeps, per voxel, the point closest to the voxel center.
///
/// Output follows the order in which voxels are first seen in the input, so the
/// sequence order used by windowing survives decimation.
pub struct VoxelDecimator {
    pub voxel_size: f64,
}

impl PointCloudDecimator for VoxelDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        let voxel_size = self.voxel_size;
        let mut cells: HashMap<(i64, i64, i64), usize> = HashMap::new();
        let mut selected: Vec<(Point, (f64, f64, f64))> = Vec::new();

        for point in points {
            let index = self.get_voxel_index(point, voxel_size);
            let voxel_center = self.get_voxel_center(index, voxel_size);
            match cells.get(&index) {
                Some(&slot) => {
                    let (current, center) = selected[slot];
                    if self.squared_distance(point, center) < self.squared_distance(&current, center) {
                        selected[slot].0 = *point;
                    }
                }
                None => {
                    cells.insert(index, selected.len());
                    selected.push((*point, voxel_center));
                }
            }
        }

        log::debug!("  Number of cells: {}", cells.len());

        selected.into_iter().map(|(point, _)| point).collect()
    }
}

impl VoxelDecimator {
    fn get_voxel_index(&self, point: &Point, voxel_size: f64) -> (i64, i64, i64) {
        let x_idx = (point.x() / voxel_size).floor() as i64;
        let y_idx = (point.y() / voxel_size).floor() as i64;
        let z_idx = (point.z() / voxel_size).floor() as i64;
        (x_idx, y_idx, z_idx)
    }

    fn get_voxel_center(&self, index: (i64, i64, i64), voxel_size: f64) -> (f64, f64, f64) {
        let (x_idx, y_idx, z_idx) = index;
        (
            (x_idx as f64 + 0.5) * voxel_size,
            (y_idx as f64 + 0.5) * voxel_size,
            (z_idx as f64 + 0.5) * voxel_size,
        )
    }

    fn squared_distance(&self, a: &Point, b: (f64, f64, f64)) -> f64 {
        (a.x() - b.0).powi(2) + (a.y() - b.1).powi(2) + (a.z() - b.2).powi(2)
    }
}
