//! Media capability provider abstraction.
//!
//! Device enumeration and microphone stream acquisition live behind the
//! `MediaProvider` trait so the capture controller and level meter can be
//! driven by a fake provider in tests instead of real hardware.

pub mod system;

use anyhow::Result;
use std::sync::{Arc, Mutex};

pub use system::SystemMediaProvider;

/// An audio input device as presented to the user for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Stable identifier used to request the device (enumeration index).
    pub id: String,
    /// Human-readable device name.
    pub label: String,
    /// Whether this is the system default input device.
    pub is_default: bool,
    /// Native capture configuration, e.g. "48000Hz, 2 channels".
    pub native_config: Option<String>,
}

/// Fixed constraints applied when acquiring a microphone stream.
///
/// Echo cancellation and noise suppression are requested from the platform
/// input path; mono is enforced by downmixing in the capture callback.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConstraints {
    /// Requested sample rate in Hz. The device's native rate wins if they
    /// differ; the stream reports the actual rate.
    pub sample_rate: u32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

/// Shared sink that an open input stream appends mono i16 PCM samples to.
pub type SampleSink = Arc<Mutex<Vec<i16>>>;

/// A live microphone stream. Dropping the stream stops capture and
/// releases the underlying hardware.
pub trait InputStream {
    /// Actual sample rate of the captured audio.
    fn sample_rate(&self) -> u32;
}

/// Platform media capabilities: device inventory and stream acquisition.
pub trait MediaProvider {
    /// Enumerates available audio input devices.
    ///
    /// # Errors
    /// - If the platform audio host cannot enumerate devices. Callers
    ///   treat this as non-fatal and degrade to an empty list.
    fn list_input_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Acquires exclusive access to an input device and starts capture.
    ///
    /// `device_id` is an id from `list_input_devices`, a device name, or
    /// `None` for the system default. Captured samples are downmixed to
    /// mono and appended to `sink` until the returned stream is dropped.
    ///
    /// # Errors
    /// - If the device is unavailable or permission is denied
    /// - If the stream cannot be configured or started
    fn open_input_stream(
        &self,
        device_id: Option<&str>,
        constraints: &CaptureConstraints,
        sink: SampleSink,
    ) -> Result<Box<dyn InputStream>>;
}
