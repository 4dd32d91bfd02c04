//! Audio capture for journal entries.
//!
//! The capture controller owns the session state machine and chunk
//! accumulation, the level meter derives a per-frame loudness value from
//! the live stream, and the encoder packages a finished recording into
//! the upload format.

pub mod controller;
pub mod encode;
pub mod meter;

pub use controller::{AudioPayload, CaptureController, CaptureError, CaptureState};
pub use meter::LevelMeter;
