use serde::Serialize;

use super::{cross, norm, point_plane_distance, sub, Vector3};
use crate::error::GeometryError;
use crate::pointcloud::point::Point;

/// Plane `a·x + b·y + c·z + d = 0` together with the indices of the points it was
/// accepted for.
///
/// `(a, b, c)` is stored as a unit vector whose first non-zero component among
/// `c`, `b`, `a` is positive, so the same geometric plane always has the same
/// coefficients regardless of how it was constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plane {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    inliers: Vec<usize>,
}

// Relative tolerance under which three samples are treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-12;

impl Plane {
    pub fn new(a: f64, b: f64, c: f64, d: f64, inliers: Vec<usize>) -> Result<Self, GeometryError> {
        if ![a, b, c, d].iter().all(|v| v.is_finite()) {
            return Err(GeometryError::Degenerate(format!(
                "non-finite plane coefficients ({}, {}, {}, {})",
                a, b, c, d
            )));
        }
        let length = norm(&[a, b, c]);
        if length == 0.0 {
            return Err(GeometryError::Degenerate(
                "plane normal (a, b, c) is zero".to_string(),
            ));
        }

        let sign = if c != 0.0 {
            c.signum()
        } else if b != 0.0 {
            b.signum()
        } else {
            a.signum()
        };
        let scale = sign / length;

        Ok(Plane {
            a: a * scale,
            b: b * scale,
            c: c * scale,
            d: d * scale,
            inliers,
        })
    }

    /// Unique plane through three points.
    pub fn from_three_points(p1: &Vector3, p2: &Vector3, p3: &Vector3) -> Result<Self, GeometryError> {
        let e1 = sub(p2, p1);
        let e2 = sub(p3, p1);
        let normal = cross(&e1, &e2);
        let scale = norm(&e1) * norm(&e2);
        if scale == 0.0 || norm(&normal) <= COLLINEAR_EPSILON * scale {
            return Err(GeometryError::Degenerate(
                "sample points are collinear or coincident".to_string(),
            ));
        }
        let d = -(normal[0] * p1[0] + normal[1] * p1[1] + normal[2] * p1[2]);
        Plane::new(normal[0], normal[1], normal[2], d, vec![])
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Unit normal `(a, b, c)`.
    pub fn normal(&self) -> Vector3 {
        [self.a, self.b, self.c]
    }

    pub fn inliers(&self) -> &[usize] {
        &self.inliers
    }

    pub fn with_inliers(self, inliers: Vec<usize>) -> Self {
        Plane { inliers, ..self }
    }

    pub fn distance_to(&self, point: &Point) -> f64 {
        point_plane_distance(point, self)
    }

    /// Indices of the points lying within `threshold` of the plane.
    pub fn inliers_within(&self, points: &[Point], threshold: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.distance_to(p) <= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Height of the plane above `(x, y)`, `None` for vertical planes.
    pub fn z_at(&self, x: f64, y: f64) -> Option<f64> {
        if self.c == 0.0 {
            None
        } else {
            Some((-self.a * x - self.b * y - self.d) / self.c)
        }
    }
}
