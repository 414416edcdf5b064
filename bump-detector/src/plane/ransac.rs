use std::time::{Duration, Instant};

use pcd_core::geometry::{fit_plane_least_squares, Plane, Vector3};
use pcd_core::pointcloud::point::Point;
use rand::rngs::StdRng;
use rand::seq::index;

use super::{plane_through, PlaneEstimator};
use crate::config::DetectorConfig;
use crate::error::DetectorError;

/// Random sample consensus plane fit.
///
/// Each iteration draws `sample_size` distinct points, builds the plane through them
/// and counts the points within `distance_threshold`. The plane with the most inliers
/// wins; ties keep the first one found. Degenerate samples still use up an
/// iteration, so `max_iterations` and `time_budget` are hard bounds.
#[derive(Debug, Clone)]
pub struct RansacPlaneEstimator {
    pub sample_size: usize,
    pub max_iterations: usize,
    pub distance_threshold: f64,
    pub time_budget: Option<Duration>,
    pub refine: bool,
}

impl RansacPlaneEstimator {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            sample_size: config.ransac_sample_size,
            max_iterations: config.ransac_iterations,
            distance_threshold: config.ransac_inlier_threshold,
            time_budget: config.ransac_time_budget_ms.map(Duration::from_millis),
            refine: config.ransac_refine,
        }
    }

    // Least-squares fit over the consensus set, kept only when it does not lose inliers.
    fn refine(&self, plane: Plane, inliers: Vec<usize>, points: &[Point]) -> (Plane, Vec<usize>) {
        let coords: Vec<Vector3> = inliers.iter().map(|&i| points[i].coords()).collect();
        match fit_plane_least_squares(&coords) {
            Ok(refined) => {
                let refined_inliers = refined.inliers_within(points, self.distance_threshold);
                if refined_inliers.len() >= inliers.len() {
                    (refined, refined_inliers)
                } else {
                    (plane, inliers)
                }
            }
            Err(_) => (plane, inliers),
        }
    }
}

impl PlaneEstimator for RansacPlaneEstimator {
    fn estimate(&self, points: &[Point], rng: &mut StdRng) -> Result<Plane, DetectorError> {
        let n = points.len();
        if n < self.sample_size {
            return Err(DetectorError::InsufficientPoints {
                required: self.sample_size,
                actual: n,
            });
        }

        let coords: Vec<Vector3> = points.iter().map(Point::coords).collect();
        let started = Instant::now();
        let mut best: Option<(Plane, Vec<usize>)> = None;
        let mut degenerate_samples = 0;
        let mut iterations = 0;
        let mut exhausted = None;

        while iterations < self.max_iterations {
            if let Some(budget) = self.time_budget {
                if started.elapsed() >= budget {
                    log::debug!(
                        "RANSAC time budget of {:?} reached after {} iterations",
                        budget,
                        iterations
                    );
                    exhausted = Some(budget);
                    break;
                }
            }
            iterations += 1;

            let sample = index::sample(rng, n, self.sample_size).into_vec();
            let candidate = match plane_through(&sample, &coords) {
                Ok(plane) => plane,
                Err(_) => {
                    degenerate_samples += 1;
                    continue;
                }
            };

            let inliers = candidate.inliers_within(points, self.distance_threshold);
            let improves = best
                .as_ref()
                .map_or(true, |(_, best_inliers)| inliers.len() > best_inliers.len());
            if improves {
                let complete = inliers.len() == n;
                best = Some((candidate, inliers));
                if complete {
                    break;
                }
            }
        }

        let (plane, inliers) = match (best, exhausted) {
            (Some(best), _) => best,
            (None, Some(budget)) if iterations == 0 => {
                return Err(DetectorError::BudgetExhausted(budget));
            }
            (None, _) => {
                return Err(DetectorError::DegenerateGeometry(format!(
                    "no valid plane after {} iterations ({} degenerate samples)",
                    iterations, degenerate_samples
                )));
            }
        };

        let (plane, inliers) = if self.refine {
            self.refine(plane, inliers, points)
        } else {
            (plane, inliers)
        };

        log::trace!(
            "RANSAC: {} of {} points are inliers after {} iterations",
            inliers.len(),
            n,
            iterations
        );
        Ok(plane.with_inliers(inliers))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use super::*;

    fn estimator() -> RansacPlaneEstimator {
        RansacPlaneEstimator {
            sample_size: 3,
            max_iterations: 200,
            distance_threshold: 0.05,
            time_budget: None,
            refine: true,
        }
    }

    // 400 points on z = 5 followed by 40 points well above or below it.
    fn plane_with_outliers(rng: &mut StdRng) -> Vec<Point> {
        let mut points: Vec<Point> = (0..20)
            .flat_map(|i| (0..20).map(move |j| (i as f64 * 0.5, j as f64 * 0.5)))
            .map(|(x, y)| Point::new(x, y, 5.0, 0.5).unwrap())
            .collect();
        for _ in 0..40 {
            let x = rng.gen_range(0.0..10.0);
            let y = rng.gen_range(0.0..10.0);
            let offset = rng.gen_range(1.0..4.0) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            points.push(Point::new(x, y, 5.0 + offset, 0.5).unwrap());
        }
        points
    }

    #[test]
    fn recovers_known_plane_under_outliers() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = plane_with_outliers(&mut rng);
        let plane = estimator().estimate(&points, &mut rng).unwrap();

        let [a, b, c, d] = plane.coefficients();
        assert!(a.abs() < 1e-3 && b.abs() < 1e-3, "{:?}", plane.coefficients());
        assert!((c - 1.0).abs() < 1e-3);
        assert!((d + 5.0).abs() < 1e-3);

        let true_inliers = plane.inliers().iter().filter(|&&i| i < 400).count();
        assert!(true_inliers as f64 >= 0.9 * 400.0);
        assert!(plane.inliers().iter().all(|&i| i < 400));
    }

    #[test]
    fn larger_samples_use_least_squares() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = plane_with_outliers(&mut rng);
        let estimator = RansacPlaneEstimator {
            sample_size: 5,
            max_iterations: 400,
            ..estimator()
        };
        let plane = estimator.estimate(&points, &mut rng).unwrap();
        assert!((plane.d() + 5.0).abs() < 1e-3);
    }

    #[test]
    fn too_few_points_fail() {
        let mut rng = StdRng::seed_from_u64(0);
        let points = vec![
            Point::new(0.0, 0.0, 0.0, 0.5).unwrap(),
            Point::new(1.0, 0.0, 0.0, 0.5).unwrap(),
        ];
        assert_eq!(
            estimator().estimate(&points, &mut rng),
            Err(DetectorError::InsufficientPoints {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn collinear_input_terminates_with_degenerate_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let points: Vec<Point> = (0..50)
            .map(|i| Point::new(i as f64, 2.0 * i as f64, 0.0, 0.5).unwrap())
            .collect();
        let result = RansacPlaneEstimator {
            max_iterations: 1000,
            ..estimator()
        }
        .estimate(&points, &mut rng);
        assert!(matches!(result, Err(DetectorError::DegenerateGeometry(_))));
    }

    #[test]
    fn same_seed_gives_same_plane() {
        let mut data_rng = StdRng::seed_from_u64(5);
        let points = plane_with_outliers(&mut data_rng);
        let estimator = RansacPlaneEstimator {
            refine: false,
            max_iterations: 20,
            ..estimator()
        };
        let first = estimator
            .estimate(&points, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let second = estimator
            .estimate(&points, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn time_budget_bounds_an_unbounded_iteration_count() {
        // dense grid plus scattered outliers, so no sample ever covers every point
        let mut rng = StdRng::seed_from_u64(17);
        let mut points: Vec<Point> = (0..150)
            .flat_map(|i| (0..150).map(move |j| (i as f64 * 0.1, j as f64 * 0.1)))
            .map(|(x, y)| Point::new(x, y, 0.0, 0.5).unwrap())
            .collect();
        for _ in 0..500 {
            let x = rng.gen_range(0.0..15.0);
            let y = rng.gen_range(0.0..15.0);
            points.push(Point::new(x, y, rng.gen_range(1.0..3.0), 0.5).unwrap());
        }

        let budget = Duration::from_millis(5);
        let estimator = RansacPlaneEstimator {
            max_iterations: usize::MAX,
            time_budget: Some(budget),
            ..estimator()
        };
        let started = Instant::now();
        let plane = estimator.estimate(&points, &mut rng).unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed < budget * 40, "took {:?}", elapsed);
        assert!(plane.d().abs() < 1e-3);
    }

    #[test]
    fn budget_from_config_is_in_milliseconds() {
        let config = DetectorConfig {
            ransac_time_budget_ms: Some(3),
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(
            RansacPlaneEstimator::from_config(&config).time_budget,
            Some(Duration::from_millis(3))
        );
    }

    #[test]
    fn spent_budget_is_reported_as_such() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = plane_with_outliers(&mut rng);
        let estimator = RansacPlaneEstimator {
            time_budget: Some(Duration::ZERO),
            ..estimator()
        };
        assert_eq!(
            estimator.estimate(&points, &mut rng),
            Err(DetectorError::BudgetExhausted(Duration::ZERO))
        );
    }
}
