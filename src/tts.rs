//! Text-to-speech-as-file client, used outside the real-time session
//! (e.g. to listen to a suggested better phrasing).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audio::{codec, wav, AudioChunk};
use crate::error::{Result, VoiceError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechRequest<'a> {
    text: &'a str,
    voice_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
}

/// Synthesized audio file returned by the TTS endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechClip {
    pub audio_base64: String,
    pub mime_type: String,
    pub sample_rate: u32,
    pub channels: u16,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl SpeechClip {
    /// Raw payload bytes (a WAV file for `audio/wav`)
    pub fn bytes(&self) -> Result<Vec<u8>> {
        codec::decode_from_transport(&self.audio_base64)
    }

    /// Decode the payload into PCM16
    ///
    /// WAV payloads are parsed; anything else is treated as raw PCM16 at the
    /// declared rate and channel count.
    pub fn decode(&self) -> Result<AudioChunk> {
        let bytes = self.bytes()?;

        if self.mime_type.contains("wav") {
            wav::wav_to_chunk(&bytes)
        } else {
            Ok(AudioChunk::new(bytes, self.sample_rate, self.channels))
        }
    }
}

/// Client for the TTS-as-file endpoint
pub struct TtsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TtsClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        style: Option<&str>,
    ) -> Result<SpeechClip> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoiceError::Config {
                message: "Nothing to synthesize: text is empty".to_string(),
            });
        }

        info!("Synthesizing {} chars with voice {}", text.chars().count(), voice);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&SpeechRequest {
                text,
                voice_name: voice,
                style: style.map(str::trim).filter(|s| !s.is_empty()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::connection(format!(
                "TTS endpoint returned {}: {}",
                status, body
            )));
        }

        let clip: SpeechClip = response.json().await?;
        info!(
            "Received {} clip ({} Hz, {} ch)",
            clip.mime_type, clip.sample_rate, clip.channels
        );

        Ok(clip)
    }
}
