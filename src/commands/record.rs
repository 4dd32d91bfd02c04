//! Interactive recording session.
//!
//! Records from the configured microphone with live level metering,
//! then encodes and uploads the entry for transcription. The upload runs
//! as a spawned task so the view keeps rendering while it is in flight;
//! the capture session itself is already back in idle by then.

use crate::api::{JournalClient, UploadPayload};
use crate::capture::{encode, AudioPayload, CaptureController};
use crate::config::ReflectifyConfig;
use crate::media::{CaptureConstraints, MediaProvider, SystemMediaProvider};
use crate::ui::{self, RecorderCommand, RecorderTui};

/// Runs a recording session end to end.
///
/// `device` overrides the configured input device for this session.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the microphone stream cannot be acquired
/// - If the terminal UI fails
pub async fn handle_record(device: Option<String>) -> anyhow::Result<()> {
    tracing::info!("=== Recording session started ===");

    let config = match ReflectifyConfig::load_or_init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            ui::error::show(&format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/reflectify/reflectify.toml file."
            ))?;
            return Err(err);
        }
    };

    let provider = SystemMediaProvider::new();

    // Device inventory runs once per session; failure is non-fatal but
    // recording will likely fail until a device is granted.
    let devices = match provider.list_input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            tracing::warn!("Device enumeration failed: {e}");
            Vec::new()
        }
    };
    tracing::debug!("Found {} input device(s)", devices.len());

    let device_id = device
        .or_else(|| match config.audio.device.as_str() {
            "default" => None,
            other => Some(other.to_string()),
        })
        .or_else(|| devices.first().map(|d| d.id.clone()));

    let constraints = CaptureConstraints {
        sample_rate: config.audio.sample_rate,
        ..CaptureConstraints::default()
    };
    let mut controller = CaptureController::new(provider, constraints);

    if let Err(e) = controller.start_capture(device_id.as_deref()) {
        ui::error::show(&format!(
            "Recording Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        ))?;
        return Err(e.into());
    }

    let mut tui = match RecorderTui::new() {
        Ok(tui) => tui,
        Err(e) => {
            controller.stop_capture();
            return Err(anyhow::anyhow!("Failed to initialize UI: {e}"));
        }
    };

    let mut payload = None;
    loop {
        match tui.handle_input() {
            Ok(RecorderCommand::Continue) => {
                controller.poll();
                let level = controller.level();
                let elapsed = controller.elapsed_secs();
                tui.render_recording(level, elapsed)?;
            }
            Ok(RecorderCommand::StopAndUpload) => {
                payload = controller.stop_capture();
                break;
            }
            Ok(RecorderCommand::Cancel) => {
                // Release the stream and discard whatever was captured.
                controller.stop_capture();
                tracing::info!("Recording session canceled");
                break;
            }
            Err(e) => {
                controller.stop_capture();
                tui.cleanup().ok();
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    }

    match payload {
        Some(AudioPayload::Recording {
            samples,
            sample_rate,
        }) => {
            if let Err(e) = upload_recording(&mut tui, &config, &samples, sample_rate).await {
                tracing::warn!("Upload flow failed: {e}");
            }
        }
        Some(AudioPayload::File(_)) => unreachable!("live session produces recordings"),
        None => {}
    }

    tui.cleanup()?;
    tracing::info!("=== Recording session exited ===");
    Ok(())
}

/// Encodes a finished capture and uploads it, reporting status inline.
async fn upload_recording(
    tui: &mut RecorderTui,
    config: &ReflectifyConfig,
    samples: &[i16],
    sample_rate: u32,
) -> anyhow::Result<()> {
    tui.render_status("Encoding recording...", false)?;

    let encoded_path = match encode::encode_recording(samples, sample_rate) {
        Ok(path) => path,
        Err(e) => {
            tui.render_status(&format!("Encoding failed: {e}"), true)?;
            tui.wait_for_key()?;
            return Err(e);
        }
    };

    let bytes = std::fs::read(&encoded_path)?;
    let payload = UploadPayload::recording(bytes);
    let client = JournalClient::new(&config.backend.base_url);

    let upload_handle = tokio::spawn(async move { client.upload(payload).await });

    while !upload_handle.is_finished() {
        tui.render_status("Uploading recording...", false)?;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    match upload_handle.await {
        Ok(Ok(transcription)) => {
            tracing::info!("Entry transcribed: {transcription}");
            tui.render_status(
                &format!("Entry saved.\n\nTranscription:\n{transcription}"),
                false,
            )?;
        }
        Ok(Err(e)) => {
            tracing::error!("Upload failed: {e}");
            tui.render_status(&format!("Upload failed: {e}"), true)?;
        }
        Err(e) => {
            tracing::error!("Upload task failed: {e}");
            tui.render_status(&format!("Upload task failed: {e}"), true)?;
        }
    }

    tui.wait_for_key()?;
    Ok(())
}
