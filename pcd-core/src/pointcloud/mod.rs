pub mod decimation;
pub mod neighbours;
pub mod normal;
pub mod outlier;
pub mod point;
