use anyhow::{Context, Result};
use serde::Deserialize;

use crate::audio::{AudioBackendConfig, CAPTURE_SAMPLE_RATE, PLAYBACK_SAMPLE_RATE, SESSION_CHANNELS};

/// Environment variable prefix for overrides, e.g. `VOICE_COACH__PROVIDER__MODEL`
pub const ENV_PREFIX: &str = "VOICE_COACH";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub provider: ProviderConfig,
    pub scoring: ScoringConfig,
    pub tts: TtsConfig,
    /// Whole-session review endpoint; `/session/review` is disabled without it
    #[serde(default)]
    pub review: Option<ReviewConfig>,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Websocket URL of the live conversation endpoint
    pub url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Ephemeral token endpoint; preferred over the API key when set
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: "wss://localhost:8443/live".to_string(),
            model: "gemini-2.5-flash-native-audio-preview-12-2025".to_string(),
            api_key_env: default_api_key_env(),
            token_endpoint: None,
            temperature: default_temperature(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub endpoint: String,
    #[serde(default = "default_scoring_timeout")]
    pub timeout_secs: u64,
}

fn default_scoring_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    pub endpoint: String,
    #[serde(default = "default_voice")]
    pub default_voice: String,
}

fn default_voice() -> String {
    "Kore".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    pub endpoint: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_review_timeout")]
    pub timeout_secs: u64,
}

fn default_review_timeout() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub capture_sample_rate: u32,
    pub playback_sample_rate: u32,
    pub channels: u16,
    pub capture_block_frames: u32,
    #[serde(default)]
    pub input_device: Option<String>,
    #[serde(default)]
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            capture_sample_rate: CAPTURE_SAMPLE_RATE,
            playback_sample_rate: PLAYBACK_SAMPLE_RATE,
            channels: SESSION_CHANNELS,
            capture_block_frames: 4096,
            input_device: None,
            output_device: None,
        }
    }
}

impl AudioConfig {
    pub fn backend(&self) -> AudioBackendConfig {
        AudioBackendConfig {
            capture_sample_rate: self.capture_sample_rate,
            playback_sample_rate: self.playback_sample_rate,
            channels: self.channels,
            capture_block_frames: self.capture_block_frames,
            input_device: self.input_device.clone(),
            output_device: self.output_device.clone(),
        }
    }
}

impl AppConfig {
    /// Load `path` (extension optional) and apply environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        if config.audio.channels == 0 {
            anyhow::bail!("audio.channels must be at least 1");
        }

        Ok(config)
    }
}
