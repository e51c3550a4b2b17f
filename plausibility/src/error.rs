use thiserror::Error;

/// Errors returned by plausibility operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlausibilityError {
    #[error("plausibility: invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("plausibility: invalid event date {0:?}")]
    InvalidDate(String),

    #[error("plausibility: invalid thresholds: {0}")]
    InvalidThresholds(String),
}
