use pcd_core::geometry::{Plane, Vector3};
use pcd_core::pointcloud::point::Point;
use rand::rngs::StdRng;

use super::{plane_through, PlaneEstimator};
use crate::error::DetectorError;

/// Brute-force reference: tries the plane through every point triple.
///
/// Cubic in the number of points, meant for small inputs and for checking
/// [`RansacPlaneEstimator`](super::RansacPlaneEstimator) against a deterministic answer.
#[derive(Debug, Clone)]
pub struct ExhaustivePlaneEstimator {
    pub distance_threshold: f64,
}

impl PlaneEstimator for ExhaustivePlaneEstimator {
    fn estimate(&self, points: &[Point], _rng: &mut StdRng) -> Result<Plane, DetectorError> {
        let n = points.len();
        if n < 3 {
            return Err(DetectorError::InsufficientPoints {
                required: 3,
                actual: n,
            });
        }

        let coords: Vec<Vector3> = points.iter().map(Point::coords).collect();
        let mut best: Option<(Plane, Vec<usize>)> = None;
        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    let Ok(candidate) = plane_through(&[i, j, k], &coords) else {
                        continue;
                    };
                    let inliers = candidate.inliers_within(points, self.distance_threshold);
                    if best.as_ref().map_or(true, |(_, b)| inliers.len() > b.len()) {
                        best = Some((candidate, inliers));
                    }
                }
            }
        }

        best.map(|(plane, inliers)| plane.with_inliers(inliers))
            .ok_or_else(|| {
                DetectorError::DegenerateGeometry("every point triple is collinear".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::plane::RansacPlaneEstimator;

    fn tilted_with_outliers() -> Vec<Point> {
        // z = 0.1x - 0.2y + 3
        let mut points: Vec<Point> = (0..6)
            .flat_map(|i| (0..6).map(move |j| (i as f64, j as f64)))
            .map(|(x, y)| Point::new(x, y, 0.1 * x - 0.2 * y + 3.0, 0.5).unwrap())
            .collect();
        points.push(Point::new(2.0, 2.0, 9.0, 0.5).unwrap());
        points.push(Point::new(4.0, 1.0, -4.0, 0.5).unwrap());
        points
    }

    #[test]
    fn finds_dominant_plane() {
        let points = tilted_with_outliers();
        let mut rng = StdRng::seed_from_u64(0);
        let plane = ExhaustivePlaneEstimator {
            distance_threshold: 0.01,
        }
        .estimate(&points, &mut rng)
        .unwrap();
        assert_eq!(plane.inliers().len(), 36);
    }

    #[test]
    fn ransac_agrees_with_reference() {
        let points = tilted_with_outliers();
        let mut rng = StdRng::seed_from_u64(1);
        let reference = ExhaustivePlaneEstimator {
            distance_threshold: 0.01,
        }
        .estimate(&points, &mut rng)
        .unwrap();
        let ransac = RansacPlaneEstimator {
            sample_size: 3,
            max_iterations: 100,
            distance_threshold: 0.01,
            time_budget: None,
            refine: true,
        }
        .estimate(&points, &mut rng)
        .unwrap();

        assert_eq!(ransac.inliers(), reference.inliers());
        for (a, b) in ransac.coefficients().iter().zip(reference.coefficients()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
