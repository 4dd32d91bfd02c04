//! Upload a pre-recorded audio file.
//!
//! The command-line equivalent of dropping a file onto the recorder:
//! only `.wav` files are accepted, and an accepted file is uploaded
//! exactly once.

use std::path::PathBuf;

use crate::api::{JournalClient, UploadPayload};
use crate::capture::{AudioPayload, CaptureController};
use crate::config::ReflectifyConfig;
use crate::media::{CaptureConstraints, SystemMediaProvider};

/// Validates and uploads an audio file, printing the transcription.
///
/// # Errors
/// - If the file is not a `.wav` file or cannot be read
/// - If the upload fails
pub async fn handle_upload(file: PathBuf) -> anyhow::Result<()> {
    let config = ReflectifyConfig::load_or_init()?;

    let controller = CaptureController::new(
        SystemMediaProvider::new(),
        CaptureConstraints::default(),
    );
    let payload = controller.accept_dropped_file(&file)?;
    let AudioPayload::File(path) = payload else {
        unreachable!("dropped files never produce live recordings")
    };

    let upload = UploadPayload::wav_file(&path)?;
    println!(
        "Uploading {} ({} bytes)...",
        upload.file_name,
        upload.bytes.len()
    );

    let client = JournalClient::new(&config.backend.base_url);
    let transcription = client.upload(upload).await?;

    println!();
    println!("Transcription:");
    println!("{transcription}");
    Ok(())
}
