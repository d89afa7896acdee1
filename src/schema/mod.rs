//! Input schemas
//!
//! Recorded gaze sample streams (`gaze.sample.v1`) and region layout files
//! consumed by the replay tooling and the FFI layer.

mod layout;
mod sample;

pub use layout::*;
pub use sample::*;
