use std::time::Duration;

use pcd_core::GeometryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("insufficient points: {required} required, {actual} given")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("time budget of {0:?} used up before any sample was drawn")]
    BudgetExhausted(Duration),
}

impl From<GeometryError> for DetectorError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::Degenerate(message) => DetectorError::DegenerateGeometry(message),
            GeometryError::InsufficientPoints { required, actual } => {
                DetectorError::InsufficientPoints { required, actual }
            }
            GeometryError::InvalidPoint(message) | GeometryError::Index(message) => {
                DetectorError::InvalidInput(message)
            }
        }
    }
}
