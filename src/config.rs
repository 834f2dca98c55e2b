//! Configuration loaded from `~/.config/reelforge/config.toml`.
//!
//! Every section has working defaults; API keys can also come from the
//! environment (`VENICE_API_KEY`, `PINATA_API_KEY`,
//! `PINATA_SECRET_API_KEY`), which takes precedence over the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Script, speech, and image generation API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VeniceConfig {
    pub api_key: String,
    pub base_url: String,
    pub script_model: String,
    pub tts_model: String,
    pub voice: String,
    pub image_model: String,
}

impl Default for VeniceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.venice.ai/api/v1".to_string(),
            script_model: "llama-3.1-405b".to_string(),
            tts_model: "tts-kokoro".to_string(),
            voice: "am_adam".to_string(),
            image_model: "fluently-xl".to_string(),
        }
    }
}

/// IPFS pinning service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_api_key: String,
    pub base_url: String,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_api_key: String::new(),
            base_url: "https://api.pinata.cloud/pinning".to_string(),
        }
    }
}

/// Local speech-recognition settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Disable to always use estimated caption timing.
    pub enabled: bool,
    /// Path to the whisper executable (or bare name for PATH lookup).
    pub path: String,
    /// Model size (tiny, base, small, medium, large).
    pub model: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self { enabled: true, path: "whisper".to_string(), model: "base".to_string() }
    }
}

/// Video rendering settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Output frame rate.
    pub fps: u32,
    /// Output width (vertical 9:16 by default).
    pub width: u32,
    /// Output height.
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: which::which("ffmpeg").map_or_else(
                |_| "ffmpeg".to_string(),
                |p| p.to_string_lossy().to_string(),
            ),
            fps: 24,
            width: 1080,
            height: 1920,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub venice: VeniceConfig,
    pub pinata: PinataConfig,
    pub whisper: WhisperConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Load the config file if present, then apply environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or invalid file is an
    /// error.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("invalid TOML in {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Location of the config file, if a config directory exists.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("reelforge").join("config.toml"))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("VENICE_API_KEY") {
            self.venice.api_key = key;
        }
        if let Ok(key) = std::env::var("PINATA_API_KEY") {
            self.pinata.api_key = key;
        }
        if let Ok(key) = std::env::var("PINATA_SECRET_API_KEY") {
            self.pinata.secret_api_key = key;
        }
    }
}
