use kdtree::distance::squared_euclidean;
use kdtree::KdTree;

use crate::error::GeometryError;
use crate::pointcloud::point::Point;

const DIMENSIONS: usize = 3;
const CAPACITY_PER_NODE: usize = 64;

/// 3D kd-tree over a slice of points, answering queries with indices into that slice.
pub struct PointIndex {
    tree: KdTree<f64, usize, [f64; 3]>,
    len: usize,
}

impl PointIndex {
    pub fn build(points: &[Point]) -> Result<Self, GeometryError> {
        let mut tree = KdTree::with_capacity(DIMENSIONS, CAPACITY_PER_NODE);
        for (i, point) in points.iter().enumerate() {
            tree.add(point.coords(), i)
                .map_err(|e| GeometryError::Index(format!("{:?}", e)))?;
        }
        Ok(PointIndex {
            tree,
            len: points.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `k` nearest points as `(squared distance, index)`, closest first.
    /// The query point itself is included when it belongs to the index.
    pub fn nearest(&self, query: &[f64; 3], k: usize) -> Result<Vec<(f64, usize)>, GeometryError> {
        if k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }
        let found = self
            .tree
            .nearest(query, k.min(self.len), &squared_euclidean)
            .map_err(|e| GeometryError::Index(format!("{:?}", e)))?;
        Ok(found.into_iter().map(|(d, &i)| (d, i)).collect())
    }

    /// Hybrid search: at most `max_neighbours` nearest points that also lie within `radius`.
    pub fn nearest_within(
        &self,
        query: &[f64; 3],
        radius: f64,
        max_neighbours: usize,
    ) -> Result<Vec<(f64, usize)>, GeometryError> {
        let radius_squared = radius * radius;
        let mut found = self.nearest(query, max_neighbours)?;
        found.retain(|(d, _)| *d <= radius_squared);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::new(i as f64, 0.0, 0.0, 0.5).unwrap())
            .collect()
    }

    #[test]
    fn nearest_returns_closest_first() {
        let points = line(10);
        let index = PointIndex::build(&points).unwrap();
        let found = index.nearest(&[4.1, 0.0, 0.0], 3).unwrap();
        let indices: Vec<usize> = found.iter().map(|(_, i)| *i).collect();
        assert_eq!(indices, vec![4, 5, 3]);
    }

    #[test]
    fn nearest_caps_at_index_size() {
        let index = PointIndex::build(&line(3)).unwrap();
        assert_eq!(index.nearest(&[0.0, 0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn hybrid_search_respects_radius_and_cap() {
        let index = PointIndex::build(&line(20)).unwrap();
        assert_eq!(index.nearest_within(&[10.0, 0.0, 0.0], 2.5, 100).unwrap().len(), 5);
        assert_eq!(index.nearest_within(&[10.0, 0.0, 0.0], 2.5, 3).unwrap().len(), 3);
    }
}
