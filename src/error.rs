//! Error types for the practice session engine.
//!
//! Every error is scoped to the current session. Closing and reopening the
//! session recovers from any of them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    // Microphone / speaker unavailable
    #[error("Audio device error: {message}")]
    Device { message: String },

    // Provider unreachable, handshake failed or closed unexpectedly
    #[error("Provider connection error: {message}")]
    Connection { message: String },

    // Transport text was not valid base64
    #[error("Failed to decode audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    // PCM byte layout does not match the declared format
    #[error("Invalid PCM format: {message}")]
    Format { message: String },

    #[error("No active practice session")]
    NoSession,

    #[error("Scoring failed: {message}")]
    Scoring { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoiceError {
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn scoring(message: impl Into<String>) -> Self {
        Self::Scoring {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VoiceError>;
