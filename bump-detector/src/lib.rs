pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod merge;
pub mod plane;
pub mod report;
pub mod runner;
pub mod segmentation;
pub mod statistics;
pub mod transform;

pub use builder::{PreprocessTransformBuilder, TransformBuilder};
pub use config::{DetectorConfig, OutlierConfig, PipelineConfig, PreprocessConfig};
pub use error::DetectorError;
pub use report::{DetectionReport, SegmentOutcome, SegmentReport};
pub use runner::{BumpDetector, Detector, PointCloudTransformer, Transformer};
