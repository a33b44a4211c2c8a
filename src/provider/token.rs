use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VoiceError};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    model: &'a str,
    temperature: f32,
}

/// Short-lived credential for opening one provider stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralToken {
    pub token: String,
    pub expire_time: String,
    #[serde(default)]
    pub new_session_expire_time: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Client for the credential issuance endpoint
///
/// Keeps long-lived provider keys out of the capture/playback process.
pub struct TokenClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TokenClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub async fn issue(&self, model: &str, temperature: f32) -> Result<EphemeralToken> {
        info!("Requesting ephemeral token for {}", model);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&TokenRequest { model, temperature })
            .send()
            .await
            .map_err(|e| VoiceError::connection(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::connection(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: EphemeralToken = response
            .json()
            .await
            .map_err(|e| VoiceError::connection(format!("Malformed token response: {}", e)))?;

        info!("Ephemeral token issued (expires {})", token.expire_time);

        Ok(token)
    }
}
