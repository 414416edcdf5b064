use pcd_core::pointcloud::decimation::decimator::{PointCloudDecimator, UniformDecimator, VoxelDecimator};
use pcd_core::pointcloud::point::PointCloud;

use super::Transform;
use crate::error::DetectorError;

/// Down-samples the cloud with a [`PointCloudDecimator`].
///
/// Labels are reset: preprocessing runs before any point has been classified.
pub struct DecimationTransform {
    decimator: Box<dyn PointCloudDecimator + Send + Sync>,
}

impl DecimationTransform {
    pub fn new(decimator: Box<dyn PointCloudDecimator + Send + Sync>) -> Self {
        Self { decimator }
    }

    pub fn uniform(every_k: usize) -> Self {
        Self::new(Box::new(UniformDecimator { every_k }))
    }

    pub fn voxel(voxel_size: f64) -> Self {
        Self::new(Box::new(VoxelDecimator { voxel_size }))
    }
}

impl Transform for DecimationTransform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError> {
        let before = point_cloud.len();
        let decimated = self.decimator.decimate(point_cloud.points());
        log::info!("down-sampled {} points to {}", before, decimated.len());
        Ok(PointCloud::new(decimated))
    }
}
