use pcd_core::geometry::{fit_plane_least_squares, Plane, Vector3};
use pcd_core::pointcloud::point::Point;
use rand::rngs::StdRng;

use crate::error::DetectorError;

pub mod exhaustive;
pub mod ransac;

pub use exhaustive::ExhaustivePlaneEstimator;
pub use ransac::RansacPlaneEstimator;

pub trait PlaneEstimator: Send + Sync {
    /// Best plane for `points`; the returned plane carries its inlier indices.
    fn estimate(&self, points: &[Point], rng: &mut StdRng) -> Result<Plane, DetectorError>;
}

/// Plane through a minimal (3 points) or over-determined (least squares) sample.
fn plane_through(sample: &[usize], coords: &[Vector3]) -> Result<Plane, DetectorError> {
    let plane = if let [i, j, k] = sample {
        Plane::from_three_points(&coords[*i], &coords[*j], &coords[*k])?
    } else {
        let selected: Vec<Vector3> = sample.iter().map(|&i| coords[i]).collect();
        fit_plane_least_squares(&selected)?
    };
    Ok(plane)
}
