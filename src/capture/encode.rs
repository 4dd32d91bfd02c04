//! Recording payload encoding.
//!
//! A finished capture is written to an intermediate PCM WAV and encoded
//! with ffmpeg into the fixed upload format: Ogg/Opus, mono, 128 kbit/s.

use anyhow::{anyhow, Result};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Opus bitrate for uploaded recordings.
const OPUS_BITRATE: &str = "128k";

/// Encodes recorded samples into an Ogg/Opus file in the temp directory.
///
/// Returns the path of the encoded file. The intermediate WAV is removed
/// after encoding.
///
/// # Errors
/// - If the WAV intermediate cannot be written
/// - If ffmpeg is missing or the encode fails
pub fn encode_recording(samples: &[i16], sample_rate: u32) -> Result<PathBuf> {
    let temp_dir = std::env::temp_dir();
    let wav_path = temp_dir.join(format!("reflectify_{}.wav", std::process::id()));
    let ogg_path = temp_dir.join("reflectify-recording.ogg");

    write_wav(samples, sample_rate, &wav_path)?;
    let encode_result = encode_opus(&wav_path, &ogg_path);

    if let Err(e) = std::fs::remove_file(&wav_path) {
        tracing::debug!("Failed to remove temp WAV: {}", e);
    }
    encode_result?;

    let file_size = std::fs::metadata(&ogg_path)?.len();
    tracing::info!(
        "Recording encoded: {} ({} bytes, opus {})",
        ogg_path.display(),
        file_size,
        OPUS_BITRATE
    );

    Ok(ogg_path)
}

/// Writes mono i16 PCM samples as a WAV file.
pub fn write_wav(samples: &[i16], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    tracing::debug!("Intermediate WAV created: {}", path.display());
    Ok(())
}

/// Encodes a WAV file to Ogg/Opus at the fixed bitrate.
fn encode_opus(input_wav: &Path, output_ogg: &Path) -> Result<()> {
    let ffmpeg = find_ffmpeg()?;

    let output = Command::new(&ffmpeg)
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input_wav)
        .arg("-acodec")
        .arg("libopus")
        .arg("-b:a")
        .arg(OPUS_BITRATE)
        .arg("-ac")
        .arg("1")
        .arg("-y")
        .arg(output_ogg)
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encode failed: {}", stderr);
        Err(anyhow!("Audio encoding failed: {stderr}"))
    }
}

/// Locates the ffmpeg binary, checking standard install locations before
/// falling back to a PATH search.
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/opt/homebrew/bin/ffmpeg",
            "/usr/local/bin/ffmpeg",
            "/usr/bin/ffmpeg",
        ]
    } else if cfg!(target_os = "linux") {
        &["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg", "/snap/bin/ffmpeg"]
    } else if cfg!(target_os = "windows") {
        &[
            "C:\\ffmpeg\\bin\\ffmpeg.exe",
            "C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe",
        ]
    } else {
        &[]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };
    let output = Command::new(search_cmd)
        .arg("ffmpeg")
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for ffmpeg: {e}"))?;

    if output.status.success() {
        let path = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Please install ffmpeg:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_roundtrip_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples: Vec<i16> = vec![0, 100, -100, i16::MAX, i16::MIN];

        write_wav(&samples, 48_000, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 48_000);
        let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn ffmpeg_lookup_reports_cleanly() {
        // Passes with or without ffmpeg installed; the error path must be
        // a readable message, not a panic.
        match find_ffmpeg() {
            Ok(path) => assert!(!path.as_os_str().is_empty()),
            Err(e) => assert!(e.to_string().contains("ffmpeg")),
        }
    }
}
