use nalgebra::{Matrix3, SymmetricEigen, Vector3 as NVector3};

use super::{Plane, Vector3};
use crate::error::GeometryError;

// Ratio between the middle and largest covariance eigenvalue below which the
// points are considered to lie on a line.
const LINEARITY_EPSILON: f64 = 1e-12;

/// Total least-squares plane through a set of points.
///
/// The normal is the eigenvector of the covariance matrix with the smallest
/// eigenvalue, the plane passes through the centroid.
pub fn fit_plane_least_squares(points: &[Vector3]) -> Result<Plane, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::InsufficientPoints {
            required: 3,
            actual: points.len(),
        });
    }

    let n = points.len() as f64;
    let centroid = points
        .iter()
        .fold(NVector3::<f64>::zeros(), |acc, p| acc + NVector3::new(p[0], p[1], p[2]))
        / n;

    let mut covariance = Matrix3::<f64>::zeros();
    for p in points {
        let centered = NVector3::new(p[0], p[1], p[2]) - centroid;
        covariance += centered * centered.transpose();
    }
    covariance /= n;

    let eigen = SymmetricEigen::new(covariance);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| {
        eigen.eigenvalues[i]
            .partial_cmp(&eigen.eigenvalues[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let middle = eigen.eigenvalues[order[1]];
    let largest = eigen.eigenvalues[order[2]];
    if largest <= 0.0 || middle <= LINEARITY_EPSILON * largest {
        return Err(GeometryError::Degenerate(
            "points are collinear or coincident".to_string(),
        ));
    }

    let normal = eigen.eigenvectors.column(order[0]);
    let d = -normal.dot(&centroid);
    Plane::new(normal[0], normal[1], normal[2], d, vec![])
}
