//! gaze.sample.v1 schema
//!
//! One provider prediction per record: `{"x": .., "y": .., "t": ..}` where `t`
//! is the provider clock in milliseconds.

use crate::error::GazeError;
use crate::types::RawSample;
use thiserror::Error;

/// Current input schema version
pub const SCHEMA_VERSION: &str = "gaze.sample.v1";

/// One recorded provider prediction
pub type SampleRecord = RawSample;

/// Validation errors for recorded samples
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Non-finite value in field {field}")]
    NonFinite { field: &'static str },

    #[error("Timestamp went backwards: {current} after {previous}")]
    TimeWentBackwards { previous: f64, current: f64 },
}

/// Result of validating one sample of a stream
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub error: ValidationError,
}

/// Check a single sample in isolation
pub fn validate_sample(sample: &RawSample) -> Result<(), ValidationError> {
    for (field, value) in [("x", sample.x), ("y", sample.y), ("t", sample.t)] {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
    }
    Ok(())
}

/// Parser and validator for recorded sample streams
pub struct SampleAdapter;

impl SampleAdapter {
    /// Parse a JSON array of samples
    pub fn parse_array(json: &str) -> Result<Vec<RawSample>, GazeError> {
        let samples: Vec<RawSample> = serde_json::from_str(json)?;
        Ok(samples)
    }

    /// Parse NDJSON (newline-delimited JSON) samples
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawSample>, GazeError> {
        let mut samples = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawSample>(trimmed) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    return Err(GazeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(samples)
    }

    /// Validate a whole stream, returning only the failures.
    ///
    /// Besides per-sample checks, timestamps must never decrease.
    pub fn validate_stream(samples: &[RawSample]) -> Vec<ValidationResult> {
        let mut failures = Vec::new();
        let mut previous_t: Option<f64> = None;
        for (index, sample) in samples.iter().enumerate() {
            if let Err(error) = validate_sample(sample) {
                failures.push(ValidationResult { index, error });
                continue;
            }
            if let Some(previous) = previous_t {
                if sample.t < previous {
                    failures.push(ValidationResult {
                        index,
                        error: ValidationError::TimeWentBackwards {
                            previous,
                            current: sample.t,
                        },
                    });
                    continue;
                }
            }
            previous_t = Some(sample.t);
        }
        failures
    }
}
