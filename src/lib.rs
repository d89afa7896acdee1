//! Synheart Gaze - Gaze-driven attention engine for surveillance-wall experiences
//!
//! Gaze turns a noisy stream of predicted gaze coordinates into per-region
//! attention signals through a deterministic pipeline: outlier filtering →
//! temporal smoothing → region snapping → fixation accrual → staged
//! reactions → session aggregation (stability, profile, score).
//!
//! ## Modules
//!
//! - **Pipeline**: [`GazeProcessor`] owns every stage and advances on a fixed tick
//! - **Session**: [`GazeSession`] runs a provider and the tick loop on tokio
//! - **Schema**: recorded sample streams and region layout files
//! - **FFI**: C ABI over the stateful processor

pub mod aggregator;
pub mod config;
pub mod display;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod fixation;
pub mod pipeline;
pub mod reaction;
pub mod region;
pub mod schema;
pub mod session;
pub mod stability;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{GazeConfig, ReactionThresholds};
pub use encoder::{AttentionPayload, SnapshotEncoder, OUTPUT_SCHEMA_VERSION};
pub use error::GazeError;
pub use pipeline::{replay, GazeProcessor};
pub use session::{GazeProvider, GazeSession, SampleSink};
pub use types::*;

// Schema exports
pub use schema::{LayoutFile, SampleAdapter, ValidationError, SCHEMA_VERSION};

/// Gaze version embedded in all output payloads
pub const GAZE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for output payloads
pub const PRODUCER_NAME: &str = "synheart-gaze";
