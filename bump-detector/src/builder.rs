use crate::config::PreprocessConfig;
use crate::transform::{CompositeTransform, DecimationTransform, OutlierRemovalTransform, Transform};

pub trait TransformBuilder {
    fn build(&self) -> Box<dyn Transform>;
}

/// Down-sampling followed by outlier removal, as configured.
///
/// Stage order: uniform step, voxel grid, statistical outlier removal. Disabled
/// stages are left out of the chain.
pub struct PreprocessTransformBuilder {
    config: PreprocessConfig,
}

impl PreprocessTransformBuilder {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }
}

impl TransformBuilder for PreprocessTransformBuilder {
    fn build(&self) -> Box<dyn Transform> {
        let mut stages: Vec<Box<dyn Transform>> = Vec::new();

        if let Some(every_k) = self.config.uniform_every_k {
            stages.push(Box::new(DecimationTransform::uniform(every_k)));
        }
        if let Some(voxel_size) = self.config.voxel_size {
            stages.push(Box::new(DecimationTransform::voxel(voxel_size)));
        }
        if let Some(outlier) = &self.config.outlier {
            stages.push(Box::new(OutlierRemovalTransform::statistical(outlier)));
        }

        Box::new(CompositeTransform::new(stages))
    }
}
