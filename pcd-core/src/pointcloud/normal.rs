use crate::error::GeometryError;
use crate::geometry::{fit_plane_least_squares, Vector3};
use crate::pointcloud::neighbours::PointIndex;
use crate::pointcloud::point::Point;

pub trait NormalEstimator {
    /// Unit surface normal per point, `None` where the neighbourhood cannot define one.
    /// Normals are unoriented: the sign of each vector is arbitrary.
    fn estimate_normals(&self, points: &[Point]) -> Result<Vec<Option<Vector3>>, GeometryError>;
}

/// Normal estimation from a local plane fit over the neighbours found with a
/// radius-bounded k-nearest search.
pub struct KdTreeNormalEstimator {
    pub radius: f64,
    pub max_neighbours: usize,
}

impl NormalEstimator for KdTreeNormalEstimator {
    fn estimate_normals(&self, points: &[Point]) -> Result<Vec<Option<Vector3>>, GeometryError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let index = PointIndex::build(points)?;

        let mut normals = Vec::with_capacity(points.len());
        for point in points {
            let neighbours = index.nearest_within(&point.coords(), self.radius, self.max_neighbours)?;
            let coords: Vec<Vector3> = neighbours.iter().map(|(_, i)| points[*i].coords()).collect();
            let normal = match fit_plane_least_squares(&coords) {
                Ok(plane) => Some(plane.normal()),
                Err(GeometryError::Degenerate(_)) | Err(GeometryError::InsufficientPoints { .. }) => None,
                Err(e) => return Err(e),
            };
            normals.push(normal);
        }

        Ok(normals)
    }
}
