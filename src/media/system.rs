//! cpal-backed media provider.
//!
//! Captures from a chosen input device (or the system default) at its
//! native sample rate, downmixing multi-channel audio to mono i16 PCM.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{AudioDevice, CaptureConstraints, InputStream, MediaProvider, SampleSink};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Media provider backed by the platform's default cpal host.
pub struct SystemMediaProvider;

impl SystemMediaProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemMediaProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the cpal stream alive; dropping it releases the microphone.
struct SystemInputStream {
    // Held only for its Drop behavior.
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl InputStream for SystemInputStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl MediaProvider for SystemMediaProvider {
    fn list_input_devices(&self) -> Result<Vec<AudioDevice>> {
        suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            let devices = host
                .input_devices()
                .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?;
            let default_name = host.default_input_device().and_then(|d| d.name().ok());

            // Skip devices that cannot even report a name.
            Ok(devices
                .enumerate()
                .filter_map(|(index, device)| {
                    let label = device.name().ok()?;
                    let native_config = device.default_input_config().ok().map(|config| {
                        format!(
                            "{}Hz, {} channels",
                            config.sample_rate().0,
                            config.channels()
                        )
                    });
                    Some(AudioDevice {
                        id: index.to_string(),
                        is_default: default_name.as_ref() == Some(&label),
                        label,
                        native_config,
                    })
                })
                .collect())
        })
    }

    fn open_input_stream(
        &self,
        device_id: Option<&str>,
        constraints: &CaptureConstraints,
        sink: SampleSink,
    ) -> Result<Box<dyn InputStream>> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            match device_id {
                None | Some("default") => host
                    .default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available")),
                Some(spec) => find_device(&host, spec),
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != constraints.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Capturing at device rate.",
                constraints.sample_rate,
                device_sample_rate
            );
        }
        if constraints.echo_cancellation || constraints.noise_suppression {
            // cpal exposes no per-stream switches; the platform input path
            // (PulseAudio/CoreAudio/WASAPI) applies these where supported.
            tracing::debug!("Echo cancellation / noise suppression delegated to platform");
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                append_mono(data, &sink, num_channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Box::new(SystemInputStream {
            _stream: stream,
            sample_rate: device_sample_rate,
        }))
    }
}

/// Downmixes an input buffer to mono and appends it to the sink.
fn append_mono(data: &[i16], sink: &SampleSink, num_channels: usize) {
    let mut samples = sink.lock().unwrap();
    match num_channels {
        0 | 1 => samples.extend_from_slice(data),
        _ => {
            for frame in data.chunks_exact(num_channels) {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                samples.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Finds an input device by enumeration index or by name.
fn find_device(host: &cpal::Host, spec: &str) -> Result<cpal::Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
        .collect();

    if let Ok(index) = spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            )
        });
    }

    devices
        .into_iter()
        .find(|d| d.name().map(|n| n == spec).unwrap_or(false))
        .ok_or_else(|| {
            anyhow!(
                "Audio input device '{spec}' not found. Use 'reflectify list-devices' to see available devices."
            )
        })
}

/// Temporarily redirects stderr to /dev/null to silence ALSA library
/// warnings while touching the audio host. No-op off Linux.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn downmixes_stereo_by_averaging() {
        let sink: SampleSink = Arc::new(Mutex::new(Vec::new()));
        append_mono(&[100, 200, -50, 50], &sink, 2);
        assert_eq!(*sink.lock().unwrap(), vec![150, 0]);
    }

    #[test]
    fn passes_mono_through() {
        let sink: SampleSink = Arc::new(Mutex::new(Vec::new()));
        append_mono(&[1, 2, 3], &sink, 1);
        assert_eq!(*sink.lock().unwrap(), vec![1, 2, 3]);
    }
}
