pub mod error;
pub mod geometry;
pub mod pointcloud;

pub use error::GeometryError;
