use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::messages::{InboundMessage, OutboundFrame, SessionSetup, SetupFrame};
use super::token::TokenClient;
use super::{ProviderConnector, ProviderEvent, ProviderStream};
use crate::config::ProviderConfig;
use crate::error::{Result, VoiceError};
use crate::practice::{system_instruction, PracticeConfig};

/// Websocket client for the conversational provider
pub struct LiveClient {
    config: ProviderConfig,
    tokens: Option<TokenClient>,
}

impl LiveClient {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        let tokens = config
            .token_endpoint
            .clone()
            .map(|endpoint| TokenClient::new(http, endpoint));

        Self { config, tokens }
    }

    /// Stream URL with credentials attached
    ///
    /// Prefers an ephemeral token; falls back to the API key from the
    /// configured environment variable.
    async fn authorized_url(&self) -> Result<String> {
        let separator = if self.config.url.contains('?') { '&' } else { '?' };

        if let Some(tokens) = &self.tokens {
            let token = tokens
                .issue(&self.config.model, self.config.temperature)
                .await?;
            return Ok(format!(
                "{}{}access_token={}",
                self.config.url, separator, token.token
            ));
        }

        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(format!("{}{}key={}", self.config.url, separator, key)),
            _ => Err(VoiceError::connection(format!(
                "No token endpoint configured and {} is not set",
                self.config.api_key_env
            ))),
        }
    }

    fn setup_frame(&self, practice: &PracticeConfig) -> SetupFrame {
        SetupFrame {
            setup: SessionSetup {
                model: self.config.model.clone(),
                voice_name: practice.voice_name.clone(),
                system_instruction: system_instruction(practice),
                response_modalities: vec!["AUDIO".to_string()],
                input_audio_transcription: true,
                output_audio_transcription: true,
                temperature: self.config.temperature,
            },
        }
    }
}

/// Parse one provider payload into events; malformed payloads are dropped
pub fn parse_events(payload: &str) -> Vec<ProviderEvent> {
    match serde_json::from_str::<InboundMessage>(payload) {
        Ok(message) => message.into_events(),
        Err(e) => {
            warn!("Failed to parse provider message: {}", e);
            Vec::new()
        }
    }
}

async fn forward(events: &mpsc::Sender<ProviderEvent>, payload: &str) -> bool {
    for event in parse_events(payload) {
        if events.send(event).await.is_err() {
            return false;
        }
    }
    true
}

#[async_trait::async_trait]
impl ProviderConnector for LiveClient {
    async fn connect(
        &self,
        practice: &PracticeConfig,
        cancel: CancellationToken,
    ) -> Result<ProviderStream> {
        info!("Connecting to provider at {}", self.config.url);

        let url = self.authorized_url().await?;
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| VoiceError::connection(format!("Failed to connect to provider: {}", e)))?;

        let (mut writer, mut reader) = socket.split();

        let setup = serde_json::to_string(&self.setup_frame(practice))?;
        writer
            .send(Message::text(setup))
            .await
            .map_err(|e| VoiceError::connection(format!("Failed to send session setup: {}", e)))?;

        info!(
            "Connected to provider (model={}, voice={})",
            self.config.model, practice.voice_name
        );

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundFrame>(64);
        let (event_tx, event_rx) = mpsc::channel::<ProviderEvent>(256);

        // Uplink: outbound frames → socket
        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_cancel.cancelled() => break,
                    frame = outbound_rx.recv() => {
                        let Some(frame) = frame else { break };
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("Failed to serialize outbound frame: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = writer.send(Message::text(json)).await {
                            error!("Failed to send frame to provider: {}", e);
                            break;
                        }
                    }
                }
            }

            if let Err(e) = writer.send(Message::Close(None)).await {
                debug!("Close frame not delivered: {}", e);
            }
            info!("Provider uplink stopped");
        });

        // Downlink: socket → provider events
        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    _ = cancel.cancelled() => break,
                    message = reader.next() => message,
                };

                match message {
                    Some(Ok(Message::Text(text))) => {
                        if !forward(&event_tx, text.as_str()).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            if !forward(&event_tx, text).await {
                                break;
                            }
                        }
                        Err(e) => warn!("Dropping non-UTF-8 binary frame: {}", e),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        info!("Provider closed the stream: {:?}", frame);
                        let _ = event_tx.send(ProviderEvent::Closed).await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Provider stream error: {}", e);
                        let _ = event_tx.send(ProviderEvent::Error(e.to_string())).await;
                        break;
                    }
                    None => {
                        let _ = event_tx.send(ProviderEvent::Closed).await;
                        break;
                    }
                }
            }

            info!("Provider downlink stopped");
        });

        Ok(ProviderStream {
            outbound: outbound_tx,
            events: event_rx,
        })
    }
}
