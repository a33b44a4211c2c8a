use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoiceError};
use crate::practice::{PracticeConfig, Stage};

/// Per-dimension scores on a 0-5 scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    #[serde(rename = "倾听与复述", default)]
    pub listening: f64,
    #[serde(rename = "澄清与提问", default)]
    pub clarifying: f64,
    #[serde(rename = "共情与态度", default)]
    pub empathy: f64,
    #[serde(rename = "方案与承诺清晰", default)]
    pub solution_clarity: f64,
    #[serde(rename = "确认闭环", default)]
    pub confirmation: f64,
}

impl DimensionScores {
    /// Dimension labels, in the order of `values()`
    pub const NAMES: [&'static str; 5] = [
        "倾听与复述",
        "澄清与提问",
        "共情与态度",
        "方案与承诺清晰",
        "确认闭环",
    ];

    pub fn values(&self) -> [f64; 5] {
        [
            self.listening,
            self.clarifying,
            self.empathy,
            self.solution_clarity,
            self.confirmation,
        ]
    }
}

/// Coaching feedback for one completed turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub stage: String,
    /// Goal hit ratio in percent
    pub stage_goal_hit: f64,
    pub dimension_scores: DimensionScores,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub better_script: String,
    #[serde(default)]
    pub next_move: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_alert: Option<String>,
}

/// Input to the scoring collaborator, captured when the turn completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    pub stage: Stage,
    pub trainee_text: String,
    pub customer_text: String,
    pub scenario_config: PracticeConfig,
}

/// Scores one completed turn
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult>;
}

/// Scorer backed by an HTTP endpoint
pub struct HttpScorer {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpScorer {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Scorer for HttpScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult> {
        info!("Scoring {} turn", request.stage);

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| VoiceError::scoring(format!("Scoring endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Scoring endpoint returned {}", status);
            return Err(VoiceError::scoring(format!(
                "Scoring endpoint returned {}: {}",
                status, body
            )));
        }

        response
            .json::<ScoringResult>()
            .await
            .map_err(|e| VoiceError::scoring(format!("Malformed scoring response: {}", e)))
    }
}
