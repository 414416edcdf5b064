use crate::error::GeometryError;
use crate::pointcloud::neighbours::PointIndex;
use crate::pointcloud::point::Point;

pub trait OutlierFilter {
    /// Indices of the points to keep, in ascending order.
    fn inlier_indices(&self, points: &[Point]) -> Result<Vec<usize>, GeometryError>;
}

/// Statistical outlier removal.
///
/// For every point the mean distance to its `neighbours` nearest neighbours is
/// computed. Points whose mean distance exceeds `mean + std_ratio * std` of those
/// values over the whole cloud are dropped.
pub struct StatisticalOutlierFilter {
    pub neighbours: usize,
    pub std_ratio: f64,
}

impl OutlierFilter for StatisticalOutlierFilter {
    fn inlier_indices(&self, points: &[Point]) -> Result<Vec<usize>, GeometryError> {
        if points.len() <= 1 || self.neighbours == 0 {
            return Ok((0..points.len()).collect());
        }

        let index = PointIndex::build(points)?;
        let mut mean_distances = Vec::with_capacity(points.len());
        for point in points {
            // +1 because the query point is its own nearest neighbour
            let found = index.nearest(&point.coords(), self.neighbours + 1)?;
            let others: Vec<f64> = found.iter().skip(1).map(|(d, _)| d.sqrt()).collect();
            let mean = if others.is_empty() {
                0.0
            } else {
                others.iter().sum::<f64>() / others.len() as f64
            };
            mean_distances.push(mean);
        }

        let n = mean_distances.len() as f64;
        let mean = mean_distances.iter().sum::<f64>() / n;
        let variance = mean_distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        let max_distance = mean + self.std_ratio * variance.sqrt();

        let kept: Vec<usize> = mean_distances
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= max_distance)
            .map(|(i, _)| i)
            .collect();

        log::debug!(
            "statistical outlier removal kept {} of {} points",
            kept.len(),
            points.len()
        );
        Ok(kept)
    }
}
