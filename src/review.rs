//! Whole-session review: the full transcript is sent to a coaching endpoint
//! that grades the conversation and suggests what to practise next.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoiceError};
use crate::practice::PracticeConfig;
use crate::turn::{Message, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub scenario: String,
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Six 0-5 grades over the whole conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewDimensionScores {
    pub explore: u8,
    pub suggest: u8,
    pub act: u8,
    pub confirm: u8,
    pub empathy: u8,
    pub clarity: u8,
}

/// A moment of the conversation worth coaching on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMoment {
    /// 探索 / 提议 / 行动 / 确认 / 其他
    pub step: String,
    pub user_said: String,
    pub coach_response_ideal: String,
    pub what_went_well: String,
    pub improve: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPractice {
    pub focus: String,
    #[serde(default)]
    pub micro_script: Vec<String>,
    pub next_user_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReview {
    /// 0-100
    pub overall_score: u8,
    pub dimension_scores: ReviewDimensionScores,
    #[serde(default)]
    pub key_moments: Vec<KeyMoment>,
    #[serde(default)]
    pub top3_fixes: Vec<String>,
    #[serde(default)]
    pub next_practice: NextPractice,
    #[serde(default)]
    pub summary: String,
}

/// Scenario line the reviewer grades against
pub fn scenario_label(config: &PracticeConfig) -> String {
    format!(
        "{}场景 · {}客户 · {}阶段",
        config.industry, config.persona, config.stage
    )
}

/// Render the conversation as one speaker-tagged line per message
pub fn transcript_text(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| !m.text.trim().is_empty())
        .map(|m| {
            let speaker = match m.role {
                Role::Trainee => "我",
                Role::Customer => "客户",
            };
            format!("{}：{}", speaker, m.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Client for the session review endpoint
pub struct ReviewClient {
    http: reqwest::Client,
    endpoint: String,
    model: Option<String>,
    timeout: Duration,
}

impl ReviewClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        model: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model,
            timeout,
        }
    }

    pub fn request(&self, scenario: &str, transcript: &str) -> ReviewRequest {
        ReviewRequest {
            scenario: scenario.to_string(),
            transcript: transcript.to_string(),
            model: self.model.clone(),
        }
    }

    pub async fn review(&self, scenario: &str, transcript: &str) -> Result<SessionReview> {
        if transcript.trim().is_empty() {
            return Err(VoiceError::scoring("Nothing to review: transcript is empty"));
        }

        info!(
            "Requesting session review for {} ({} lines)",
            scenario,
            transcript.lines().count()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&self.request(scenario, transcript))
            .send()
            .await
            .map_err(|e| VoiceError::scoring(format!("Review endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Review endpoint returned {}", status);
            return Err(VoiceError::scoring(format!(
                "Review endpoint returned {}: {}",
                status, body
            )));
        }

        response
            .json::<SessionReview>()
            .await
            .map_err(|e| VoiceError::scoring(format!("Malformed review response: {}", e)))
    }
}
