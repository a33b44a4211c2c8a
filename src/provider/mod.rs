//! Bidirectional stream to the conversational model provider.
//!
//! The provider is opaque: trainee audio goes up as `OutboundFrame`s, and
//! synthesized audio, transcripts and turn signals come back as
//! `ProviderEvent`s in delivery order.

pub mod client;
pub mod messages;
pub mod token;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::audio::AudioChunk;
use crate::error::Result;
use crate::practice::PracticeConfig;

pub use client::LiveClient;
pub use messages::{InboundMessage, Media, OutboundFrame, OUTBOUND_FORMAT};
pub use token::{EphemeralToken, TokenClient};

/// Inbound provider event, one per field of an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Synthesized customer audio (24kHz mono PCM16)
    Audio(AudioChunk),
    /// Partial transcript of the trainee's speech
    InputTranscript(String),
    /// Partial transcript of the customer's speech
    OutputTranscript(String),
    /// Trainee started speaking over the customer
    Interrupted,
    /// Provider finished the current turn
    TurnComplete,
    /// Provider-reported or transport error
    Error(String),
    /// Stream closed
    Closed,
}

/// Live connection endpoints handed to the session
pub struct ProviderStream {
    pub outbound: mpsc::Sender<OutboundFrame>,
    pub events: mpsc::Receiver<ProviderEvent>,
}

/// Opens provider streams
///
/// Implementations stop their background tasks when `cancel` fires or when
/// the outbound sender is dropped.
#[async_trait::async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(
        &self,
        practice: &PracticeConfig,
        cancel: CancellationToken,
    ) -> Result<ProviderStream>;
}
