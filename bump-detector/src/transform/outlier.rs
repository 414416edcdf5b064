use pcd_core::pointcloud::outlier::{OutlierFilter, StatisticalOutlierFilter};
use pcd_core::pointcloud::point::PointCloud;

use super::Transform;
use crate::config::OutlierConfig;
use crate::error::DetectorError;

/// Drops the points an [`OutlierFilter`] rejects, keeping the order of the rest.
pub struct OutlierRemovalTransform {
    filter: Box<dyn OutlierFilter + Send + Sync>,
}

impl OutlierRemovalTransform {
    pub fn new(filter: Box<dyn OutlierFilter + Send + Sync>) -> Self {
        Self { filter }
    }

    pub fn statistical(config: &OutlierConfig) -> Self {
        Self::new(Box::new(StatisticalOutlierFilter {
            neighbours: config.neighbours,
            std_ratio: config.std_ratio,
        }))
    }
}

impl Transform for OutlierRemovalTransform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError> {
        let kept = self.filter.inlier_indices(point_cloud.points())?;
        log::info!(
            "outlier removal kept {} of {} points",
            kept.len(),
            point_cloud.len()
        );
        Ok(point_cloud.select(&kept))
    }
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::point::Point;

    use super::*;

    #[test]
    fn removes_isolated_point() {
        let mut points: Vec<Point> = (0..10)
            .flat_map(|i| (0..10).map(move |j| Point::new(i as f64, j as f64, 0.0, 0.5).unwrap()))
            .collect();
        points.push(Point::new(100.0, 100.0, 50.0, 0.5).unwrap());
        let cloud = PointCloud::new(points);

        let transform = OutlierRemovalTransform::statistical(&OutlierConfig {
            neighbours: 5,
            std_ratio: 1.0,
        });
        let result = transform.transform(cloud).unwrap();

        assert_eq!(result.len(), 100);
        assert!(result.points().iter().all(|p| p.x() < 50.0));
    }
}
