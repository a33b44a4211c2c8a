use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ProviderEvent;
use crate::audio::{codec, AudioChunk};

/// Format tag for trainee audio
pub const OUTBOUND_FORMAT: &str = "pcm16@16kHz-mono";

/// Encoded media payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub bytes: String, // Base64-encoded PCM16 LE bytes
    pub format: String,
}

/// Frame sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    pub media: Media,
    pub end_of_turn: bool,
}

impl OutboundFrame {
    /// Captured audio block (already base64-encoded)
    pub fn media(bytes: String) -> Self {
        Self {
            media: Media {
                bytes,
                format: OUTBOUND_FORMAT.to_string(),
            },
            end_of_turn: false,
        }
    }

    /// Empty media with the end-of-turn marker
    pub fn end_of_turn() -> Self {
        Self {
            media: Media {
                bytes: String::new(),
                format: OUTBOUND_FORMAT.to_string(),
            },
            end_of_turn: true,
        }
    }
}

/// Session setup sent once, right after the socket opens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupFrame {
    pub setup: SessionSetup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetup {
    pub model: String,
    pub voice_name: String,
    pub system_instruction: String,
    pub response_modalities: Vec<String>,
    pub input_audio_transcription: bool,
    pub output_audio_transcription: bool,
    pub temperature: f32,
}

/// Message received from the provider; any subset of fields may be present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_chunk: Option<String>, // Base64 PCM16 @ 24kHz mono
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_transcript_fragment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_transcript_fragment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InboundMessage {
    /// Expand into events: audio, input transcript, output transcript,
    /// interrupted, turn complete, error
    ///
    /// Audio that is not valid base64 is logged and dropped; the rest of the
    /// message is still delivered.
    pub fn into_events(self) -> Vec<ProviderEvent> {
        let mut events = Vec::new();

        if let Some(encoded) = self.audio_chunk {
            match codec::decode_from_transport(&encoded) {
                Ok(bytes) => events.push(ProviderEvent::Audio(AudioChunk::inbound(bytes))),
                Err(e) => warn!("Dropping inbound audio chunk: {}", e),
            }
        }

        if let Some(text) = self.input_transcript_fragment {
            events.push(ProviderEvent::InputTranscript(text));
        }

        if let Some(text) = self.output_transcript_fragment {
            events.push(ProviderEvent::OutputTranscript(text));
        }

        if self.interrupted == Some(true) {
            events.push(ProviderEvent::Interrupted);
        }

        if self.turn_complete == Some(true) {
            events.push(ProviderEvent::TurnComplete);
        }

        if let Some(error) = self.error {
            events.push(ProviderEvent::Error(error));
        }

        events
    }
}
