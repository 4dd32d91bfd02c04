//! Configuration file management.
//!
//! TOML configuration under the user's config directory. A missing file
//! is created with defaults on first load so the client works out of the
//! box against a local backend.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device: "default", a numeric id from `reflectify
    /// list-devices`, or a device name.
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested sample rate in Hz; the device's native rate wins.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

/// Journal backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the journal backend API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectifyConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl ReflectifyConfig {
    /// Loads the configuration, writing defaults if no file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_init() -> anyhow::Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default configuration at {}", path.display());
            return Ok(config);
        }
        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to the config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Path of the config file, creating the parent directory as needed.
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_dir = home.join(".config").join("reflectify");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("reflectify.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: ReflectifyConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn partial_sections_fill_in() {
        let config: ReflectifyConfig =
            toml::from_str("[backend]\nbase_url = \"https://journal.example.com\"\n").unwrap();
        assert_eq!(config.backend.base_url, "https://journal.example.com");
        assert_eq!(config.audio.device, "default");
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = ReflectifyConfig {
            audio: AudioConfig {
                device: "2".into(),
                sample_rate: 16_000,
            },
            backend: BackendConfig::default(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ReflectifyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.audio.device, "2");
        assert_eq!(parsed.audio.sample_rate, 16_000);
    }
}
