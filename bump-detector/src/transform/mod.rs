use pcd_core::pointcloud::point::PointCloud;

use crate::error::DetectorError;

pub mod decimate;
pub mod outlier;

pub use decimate::DecimationTransform;
pub use outlier::OutlierRemovalTransform;

/// One preprocessing stage applied to the whole cloud.
pub trait Transform: Send + Sync {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError>;
}

pub struct CompositeTransform {
    transforms: Vec<Box<dyn Transform>>,
}

impl CompositeTransform {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for CompositeTransform {
    fn transform(&self, point_cloud: PointCloud) -> Result<PointCloud, DetectorError> {
        let mut intermediate = point_cloud;

        for transform in &self.transforms {
            intermediate = transform.transform(intermediate)?;
        }

        Ok(intermediate)
    }
}
