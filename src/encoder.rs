//! Snapshot encoding
//!
//! This module wraps attention snapshots into versioned JSON payloads with
//! producer metadata for consumers outside the process.

use crate::error::GazeError;
use crate::types::AttentionSnapshot;
use crate::{GAZE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current output schema version
pub const OUTPUT_SCHEMA_VERSION: &str = "gaze.attention.v1";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete output payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionPayload {
    pub schema_version: String,
    pub producer: Producer,
    pub computed_at_utc: String,
    pub snapshot: AttentionSnapshot,
}

/// Encoder for producing output payloads
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, snapshot: &AttentionSnapshot) -> AttentionPayload {
        AttentionPayload {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: GAZE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            snapshot: snapshot.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, snapshot: &AttentionSnapshot) -> Result<String, GazeError> {
        serde_json::to_string(&self.encode(snapshot))
            .map_err(|e| GazeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GazeProcessor;
    use crate::types::{RawSample, Rect, Region, RegionCategory};

    fn snapshot() -> AttentionSnapshot {
        let mut processor = GazeProcessor::with_regions(vec![Region::new(
            3,
            "STAIRCASE",
            RegionCategory::Transit,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )])
        .unwrap();
        processor.on_sample(RawSample::new(50.0, 50.0, 0.0));
        processor.tick().snapshot
    }

    #[test]
    fn test_payload_fields() {
        let encoder = SnapshotEncoder::with_instance_id("instance-1".to_string());
        let json = encoder.encode_to_json(&snapshot()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["schema_version"], "gaze.attention.v1");
        assert_eq!(payload["producer"]["name"], "synheart-gaze");
        assert_eq!(payload["producer"]["instance_id"], "instance-1");
        assert_eq!(payload["snapshot"]["focused_region"], 3);
        assert_eq!(payload["snapshot"]["focused_label"], "STAIRCASE");
        assert_eq!(payload["snapshot"]["stability"]["status"], "insufficient");
        assert_eq!(payload["snapshot"]["profile"]["status"], "insufficient");
        assert!(payload["snapshot"].get("logical_position").is_none());
    }

    #[test]
    fn test_payload_roundtrip() {
        let encoder = SnapshotEncoder::new();
        let json = encoder.encode_to_json(&snapshot()).unwrap();
        let payload: AttentionPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload.producer.instance_id, encoder.instance_id());
        assert_eq!(payload.snapshot, snapshot());
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(
            SnapshotEncoder::new().instance_id(),
            SnapshotEncoder::new().instance_id()
        );
    }
}
