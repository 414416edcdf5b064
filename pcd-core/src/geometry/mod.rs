pub mod fit;
pub mod plane;

pub use fit::fit_plane_least_squares;
pub use plane::Plane;

use crate::error::GeometryError;
use crate::pointcloud::point::Point;

pub type Vector3 = [f64; 3];

pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(v: &Vector3) -> f64 {
    dot(v, v).sqrt()
}

pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn negate(v: &Vector3) -> Vector3 {
    [-v[0], -v[1], -v[2]]
}

/// Perpendicular distance between a point and a plane.
///
/// The normal of a [`Plane`] is never zero, so this cannot divide by zero.
pub fn point_plane_distance(point: &Point, plane: &Plane) -> f64 {
    let [a, b, c, d] = plane.coefficients();
    (a * point.x() + b * point.y() + c * point.z() + d).abs() / (a * a + b * b + c * c).sqrt()
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// The cosine is clamped to `[-1, 1]` before `acos` so that floating-point drift on
/// (anti-)parallel vectors does not produce NaN.
pub fn vector_angle(v1: &Vector3, v2: &Vector3) -> Result<f64, GeometryError> {
    let lengths = norm(v1) * norm(v2);
    if lengths == 0.0 || !lengths.is_finite() {
        return Err(GeometryError::Degenerate(format!(
            "angle undefined for vectors {:?} and {:?}",
            v1, v2
        )));
    }
    let cosine = (dot(v1, v2) / lengths).clamp(-1.0, 1.0);
    Ok(cosine.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_point(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z, 0.5).unwrap()
    }

    #[test]
    fn distance_is_zero_on_plane() {
        let plane = Plane::new(0.0, 0.0, 1.0, -5.0, vec![]).unwrap();
        assert_eq!(point_plane_distance(&make_point(3.0, -7.0, 5.0), &plane), 0.0);
    }

    #[test]
    fn distance_is_non_negative_on_both_sides() {
        let plane = Plane::new(0.0, 0.0, 1.0, -5.0, vec![]).unwrap();
        assert!((point_plane_distance(&make_point(0.0, 0.0, 7.5), &plane) - 2.5).abs() < 1e-12);
        assert!((point_plane_distance(&make_point(0.0, 0.0, 1.0), &plane) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn distance_uses_normalized_coefficients() {
        // x + y + z - 3 = 0 scaled by 10
        let plane = Plane::new(10.0, 10.0, 10.0, -30.0, vec![]).unwrap();
        let d = point_plane_distance(&make_point(0.0, 0.0, 0.0), &plane);
        assert!((d - 3.0 / 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn angle_of_vector_with_itself_is_zero() {
        let v = [0.3, -1.7, 2.2];
        assert_eq!(vector_angle(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn angle_of_vector_with_opposite_is_180() {
        let v = [0.3, -1.7, 2.2];
        assert_eq!(vector_angle(&v, &negate(&v)).unwrap(), 180.0);
    }

    #[test]
    fn angle_of_orthogonal_vectors() {
        let angle = vector_angle(&[1.0, 0.0, 0.0], &[0.0, 3.0, 0.0]).unwrap();
        assert!((angle - 90.0).abs() < 1e-12);
    }

    #[test]
    fn angle_with_zero_vector_is_rejected() {
        assert!(matches!(
            vector_angle(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]),
            Err(GeometryError::Degenerate(_))
        ));
    }
}
