use pcd_core::geometry::{dot, negate, point_plane_distance, vector_angle, Plane, Vector3};
use pcd_core::pointcloud::normal::NormalEstimator;
use pcd_core::pointcloud::point::Point;
use serde::Serialize;

use crate::error::DetectorError;

/// Summary of how far a segment departs from its fitted plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentStatistics {
    pub point_count: usize,
    pub inlier_count: usize,
    pub mean_distance: f64,
    pub distance_std: f64,
    pub mean_angle_deviation: f64,
    /// Points for which a local normal could be estimated.
    pub normal_count: usize,
}

pub fn distances(points: &[Point], plane: &Plane) -> Vec<f64> {
    points
        .iter()
        .map(|point| point_plane_distance(point, plane))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation.
pub fn standard_deviation(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Angle in degrees between the plane normal and each estimated point normal.
///
/// Point normals have no meaningful sign, so each one is flipped into the
/// hemisphere of the plane normal first; the result lies in `[0, 90]`.
pub fn angle_deviations(
    plane_normal: &Vector3,
    normals: &[Option<Vector3>],
) -> Result<Vec<f64>, DetectorError> {
    normals
        .iter()
        .flatten()
        .map(|normal| {
            let oriented = if dot(plane_normal, normal) < 0.0 {
                negate(normal)
            } else {
                *normal
            };
            Ok(vector_angle(plane_normal, &oriented)?)
        })
        .collect()
}

/// Distance and normal statistics of every point in a segment against its plane.
pub fn compute_statistics(
    points: &[Point],
    plane: &Plane,
    normal_estimator: &dyn NormalEstimator,
) -> Result<SegmentStatistics, DetectorError> {
    if points.len() < 2 {
        return Err(DetectorError::InsufficientPoints {
            required: 2,
            actual: points.len(),
        });
    }

    let distances = distances(points, plane);
    let mean_distance = mean(&distances).unwrap_or_default();
    let distance_std = standard_deviation(&distances).unwrap_or_default();

    let normals = normal_estimator.estimate_normals(points)?;
    let deviations = angle_deviations(&plane.normal(), &normals)?;
    let mean_angle_deviation = mean(&deviations).ok_or_else(|| {
        DetectorError::DegenerateGeometry(format!(
            "no surface normal could be estimated for any of {} points",
            points.len()
        ))
    })?;

    if !(mean_distance.is_finite() && distance_std.is_finite() && mean_angle_deviation.is_finite())
    {
        return Err(DetectorError::DegenerateGeometry(
            "segment statistics are not finite".to_string(),
        ));
    }

    Ok(SegmentStatistics {
        point_count: points.len(),
        inlier_count: plane.inliers().len(),
        mean_distance,
        distance_std,
        mean_angle_deviation,
        normal_count: deviations.len(),
    })
}
