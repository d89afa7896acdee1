//! Error types for Synheart Gaze

use crate::types::RegionId;
use thiserror::Error;

/// Errors that can occur while building or driving the attention pipeline.
///
/// Degraded runtime conditions (outlier samples, missing layout, too little
/// data for a metric) are never reported through this type; they resolve to
/// inert outputs instead.
#[derive(Debug, Error)]
pub enum GazeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate region id: {0}")]
    DuplicateRegion(RegionId),

    #[error("Unknown region id: {0}")]
    UnknownRegion(RegionId),

    #[error("Gaze provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Session task failed: {0}")]
    SessionFailed(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
