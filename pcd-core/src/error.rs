use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("insufficient points: {required} required, {actual} given")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("spatial index error: {0}")]
    Index(String),
}
