//! Capture session state machine.
//!
//! Owns the live microphone stream, the accumulating chunk sequence, and
//! the running elapsed-time counter. At most one session is active at a
//! time; the guard is the state machine itself, not a lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::capture::meter::LevelMeter;
use crate::media::{CaptureConstraints, InputStream, MediaProvider, SampleSink};

/// Interval at which accumulated samples are sealed into a chunk.
pub const CHUNK_INTERVAL: Duration = Duration::from_secs(1);

/// Capture lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Waiting for the provider to hand over the microphone stream.
    Requesting,
    Recording,
    /// Finalizing chunks and releasing the stream.
    Stopping,
}

/// Errors produced at the capture operation boundary.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("a recording is already in progress")]
    SessionActive,
    #[error("could not start recording: {0}")]
    StreamAcquisition(anyhow::Error),
    #[error("unsupported file type '{0}': please drop a .wav file")]
    UnsupportedFileType(String),
}

/// A finished audio payload, consumed exactly once by the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    /// Concatenated chunks from a live capture session.
    Recording { samples: Vec<i16>, sample_rate: u32 },
    /// A user-supplied WAV file, uploaded as-is.
    File(PathBuf),
}

/// Controls microphone capture for one session at a time.
///
/// While `Recording`, incoming samples accumulate in a shared sink that
/// is sealed into a chunk once per second (empty chunks are discarded).
/// Stopping concatenates the chunks into a single [`AudioPayload`] and
/// releases the hardware stream.
pub struct CaptureController<P: MediaProvider> {
    provider: P,
    constraints: CaptureConstraints,
    state: CaptureState,
    /// Live stream; `Some` exactly while recording.
    stream: Option<Box<dyn InputStream>>,
    sink: SampleSink,
    chunks: Vec<Vec<i16>>,
    sample_rate: u32,
    /// Armed while recording; dropped on stop so no metering can outlive
    /// the stream.
    meter: Option<LevelMeter>,
    elapsed_secs: u64,
    last_boundary: Instant,
}

impl<P: MediaProvider> CaptureController<P> {
    pub fn new(provider: P, constraints: CaptureConstraints) -> Self {
        Self {
            provider,
            constraints,
            state: CaptureState::Idle,
            stream: None,
            sink: Arc::new(Mutex::new(Vec::new())),
            chunks: Vec::new(),
            sample_rate: constraints.sample_rate,
            meter: None,
            elapsed_secs: 0,
            last_boundary: Instant::now(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Elapsed whole seconds in the current recording session.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Actual sample rate of the active (or last) session.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Requests the microphone and transitions to `Recording`.
    ///
    /// `device_id` is a device id/name or `None` for the system default.
    ///
    /// # Errors
    /// - [`CaptureError::SessionActive`] if a session is already running
    /// - [`CaptureError::StreamAcquisition`] if the stream cannot be
    ///   acquired; the controller is back in `Idle` with no partial state
    pub fn start_capture(&mut self, device_id: Option<&str>) -> Result<(), CaptureError> {
        if self.state != CaptureState::Idle {
            return Err(CaptureError::SessionActive);
        }

        self.state = CaptureState::Requesting;
        self.sink.lock().unwrap().clear();
        self.chunks.clear();
        self.elapsed_secs = 0;

        let sink = Arc::clone(&self.sink);
        match self
            .provider
            .open_input_stream(device_id, &self.constraints, sink)
        {
            Ok(stream) => {
                self.sample_rate = stream.sample_rate();
                self.stream = Some(stream);
                self.meter = Some(LevelMeter::new());
                self.last_boundary = Instant::now();
                self.state = CaptureState::Recording;
                tracing::info!("Capture started at {}Hz", self.sample_rate);
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Idle;
                tracing::error!("Failed to acquire microphone stream: {e}");
                Err(CaptureError::StreamAcquisition(e))
            }
        }
    }

    /// Advances chunk and timer bookkeeping. Call once per display frame.
    pub fn poll(&mut self) {
        if self.state != CaptureState::Recording {
            return;
        }
        while self.last_boundary.elapsed() >= CHUNK_INTERVAL {
            self.advance_chunk_boundary();
            self.last_boundary += CHUNK_INTERVAL;
        }
    }

    /// Seals the pending samples into a chunk and ticks the elapsed
    /// counter. Empty chunks are discarded.
    fn advance_chunk_boundary(&mut self) {
        self.seal_chunk();
        self.elapsed_secs += 1;
    }

    fn seal_chunk(&mut self) {
        let pending: Vec<i16> = {
            let mut sink = self.sink.lock().unwrap();
            std::mem::take(&mut *sink)
        };
        if !pending.is_empty() {
            tracing::trace!("Sealed chunk of {} samples", pending.len());
            self.chunks.push(pending);
        }
    }

    /// Current normalized input level in `[0,1]`.
    ///
    /// Returns 0 outside of `Recording`; the meter only ever runs against
    /// the active session's stream.
    pub fn level(&mut self) -> f32 {
        let Some(meter) = self.meter.as_mut() else {
            return 0.0;
        };
        let sink = self.sink.lock().unwrap();
        meter.level(&sink)
    }

    /// Stops the session and finalizes the chunk sequence into a payload.
    ///
    /// A no-op returning `None` when not `Recording`, so a double stop is
    /// harmless. Also returns `None` when the session captured no
    /// samples.
    pub fn stop_capture(&mut self) -> Option<AudioPayload> {
        if self.state != CaptureState::Recording {
            return None;
        }
        self.state = CaptureState::Stopping;

        // Release the hardware before touching the accumulated audio.
        self.stream = None;
        self.meter = None;
        self.seal_chunk();
        self.elapsed_secs = 0;

        let total: usize = self.chunks.iter().map(Vec::len).sum();
        let mut samples = Vec::with_capacity(total);
        for chunk in self.chunks.drain(..) {
            samples.extend_from_slice(&chunk);
        }

        self.state = CaptureState::Idle;

        if samples.is_empty() {
            tracing::warn!("Capture stopped with no samples recorded");
            return None;
        }

        let duration = samples.len() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Capture stopped: {:.2}s ({} samples at {}Hz)",
            duration,
            samples.len(),
            self.sample_rate
        );

        Some(AudioPayload::Recording {
            samples,
            sample_rate: self.sample_rate,
        })
    }

    /// Accepts a user-supplied audio file in place of a live recording.
    ///
    /// # Errors
    /// - [`CaptureError::SessionActive`] while a recording is running
    /// - [`CaptureError::UnsupportedFileType`] for anything but `.wav`
    pub fn accept_dropped_file(&self, path: &Path) -> Result<AudioPayload, CaptureError> {
        if self.state == CaptureState::Recording {
            return Err(CaptureError::SessionActive);
        }

        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);

        if !is_wav {
            return Err(CaptureError::UnsupportedFileType(
                path.display().to_string(),
            ));
        }

        Ok(AudioPayload::File(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Test double for the platform media stack. Hands out the sink it
    /// was given so tests can feed samples into a "live" session.
    #[derive(Default)]
    struct FakeProvider {
        fail_open: bool,
        sample_rate: u32,
        last_sink: Rc<RefCell<Option<SampleSink>>>,
    }

    struct FakeStream {
        sample_rate: u32,
    }

    impl InputStream for FakeStream {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }
    }

    impl MediaProvider for FakeProvider {
        fn list_input_devices(&self) -> anyhow::Result<Vec<crate::media::AudioDevice>> {
            Ok(vec![crate::media::AudioDevice {
                id: "0".into(),
                label: "Fake Microphone".into(),
                is_default: true,
                native_config: None,
            }])
        }

        fn open_input_stream(
            &self,
            _device_id: Option<&str>,
            _constraints: &CaptureConstraints,
            sink: SampleSink,
        ) -> anyhow::Result<Box<dyn InputStream>> {
            if self.fail_open {
                return Err(anyhow!("Permission denied"));
            }
            *self.last_sink.borrow_mut() = Some(sink);
            Ok(Box::new(FakeStream {
                sample_rate: self.sample_rate,
            }))
        }
    }

    fn controller(fail_open: bool) -> (CaptureController<FakeProvider>, Rc<RefCell<Option<SampleSink>>>) {
        let sink_handle = Rc::new(RefCell::new(None));
        let provider = FakeProvider {
            fail_open,
            sample_rate: 48_000,
            last_sink: Rc::clone(&sink_handle),
        };
        (
            CaptureController::new(provider, CaptureConstraints::default()),
            sink_handle,
        )
    }

    fn feed(sink_handle: &Rc<RefCell<Option<SampleSink>>>, samples: &[i16]) {
        let guard = sink_handle.borrow();
        let sink = guard.as_ref().expect("stream not opened");
        sink.lock().unwrap().extend_from_slice(samples);
    }

    #[test]
    fn start_success_enters_recording() {
        let (mut ctl, _) = controller(false);
        ctl.start_capture(None).unwrap();
        assert_eq!(ctl.state(), CaptureState::Recording);
        assert_eq!(ctl.sample_rate(), 48_000);
    }

    #[test]
    fn start_failure_returns_to_idle() {
        let (mut ctl, _) = controller(true);
        let err = ctl.start_capture(Some("0")).unwrap_err();
        assert!(matches!(err, CaptureError::StreamAcquisition(_)));
        assert_eq!(ctl.state(), CaptureState::Idle);
        assert_eq!(ctl.elapsed_secs(), 0);
    }

    #[test]
    fn start_while_recording_is_rejected() {
        let (mut ctl, _) = controller(false);
        ctl.start_capture(None).unwrap();
        assert!(matches!(
            ctl.start_capture(None),
            Err(CaptureError::SessionActive)
        ));
        // The running session is untouched by the rejected start.
        assert_eq!(ctl.state(), CaptureState::Recording);
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let (mut ctl, _) = controller(false);
        assert!(ctl.stop_capture().is_none());
        assert!(ctl.stop_capture().is_none());
        assert_eq!(ctl.state(), CaptureState::Idle);
    }

    #[test]
    fn double_stop_is_idempotent() {
        let (mut ctl, sink) = controller(false);
        ctl.start_capture(None).unwrap();
        feed(&sink, &[1, 2, 3]);
        assert!(ctl.stop_capture().is_some());
        assert!(ctl.stop_capture().is_none());
    }

    #[test]
    fn elapsed_counts_seconds_and_resets_on_stop() {
        let (mut ctl, sink) = controller(false);
        ctl.start_capture(None).unwrap();
        assert_eq!(ctl.elapsed_secs(), 0);

        feed(&sink, &[1; 10]);
        ctl.advance_chunk_boundary();
        assert_eq!(ctl.elapsed_secs(), 1);
        feed(&sink, &[2; 10]);
        ctl.advance_chunk_boundary();
        assert_eq!(ctl.elapsed_secs(), 2);

        ctl.stop_capture();
        assert_eq!(ctl.elapsed_secs(), 0);
    }

    #[test]
    fn chunks_concatenate_into_one_payload() {
        let (mut ctl, sink) = controller(false);
        ctl.start_capture(None).unwrap();

        feed(&sink, &[1, 2]);
        ctl.advance_chunk_boundary();
        feed(&sink, &[3, 4]);
        ctl.advance_chunk_boundary();
        // A silent second produces no chunk.
        ctl.advance_chunk_boundary();
        feed(&sink, &[5]);

        assert_eq!(ctl.chunks.len(), 2);

        let payload = ctl.stop_capture().unwrap();
        assert_eq!(
            payload,
            AudioPayload::Recording {
                samples: vec![1, 2, 3, 4, 5],
                sample_rate: 48_000,
            }
        );
    }

    #[test]
    fn empty_session_yields_no_payload() {
        let (mut ctl, _) = controller(false);
        ctl.start_capture(None).unwrap();
        assert!(ctl.stop_capture().is_none());
        assert_eq!(ctl.state(), CaptureState::Idle);
    }

    #[test]
    fn meter_only_runs_while_recording() {
        let (mut ctl, sink) = controller(false);
        assert_eq!(ctl.level(), 0.0);

        ctl.start_capture(None).unwrap();
        feed(&sink, &[8000; 512]);
        assert!(ctl.level() > 0.0);

        ctl.stop_capture();
        assert!(ctl.meter.is_none());
        assert_eq!(ctl.level(), 0.0);
    }

    #[test]
    fn dropped_wav_is_accepted() {
        let (ctl, _) = controller(false);
        let payload = ctl.accept_dropped_file(Path::new("note.wav")).unwrap();
        assert_eq!(payload, AudioPayload::File(PathBuf::from("note.wav")));
        // Declared type check is case-insensitive.
        assert!(ctl.accept_dropped_file(Path::new("NOTE.WAV")).is_ok());
    }

    #[test]
    fn dropped_non_wav_is_rejected() {
        let (ctl, _) = controller(false);
        for name in ["note.mp3", "note.ogg", "note"] {
            assert!(matches!(
                ctl.accept_dropped_file(Path::new(name)),
                Err(CaptureError::UnsupportedFileType(_))
            ));
        }
    }

    #[test]
    fn dropped_file_rejected_while_recording() {
        let (mut ctl, _) = controller(false);
        ctl.start_capture(None).unwrap();
        assert!(matches!(
            ctl.accept_dropped_file(Path::new("note.wav")),
            Err(CaptureError::SessionActive)
        ));
    }
}
