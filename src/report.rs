//! End-of-session training report.

use serde::{Deserialize, Serialize};

use crate::practice::{Industry, Persona, PracticeConfig};
use crate::turn::{DimensionScores, ScoringResult};

/// Average score of one dimension across all scored turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAverage {
    pub name: String,
    /// Rounded to one decimal, 0-5
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub industry: Industry,
    pub persona: Persona,
    pub turns: usize,
    /// Mean goal hit in percent, rounded
    pub average_goal_hit: u32,
    pub dimensions: Vec<DimensionAverage>,
    /// Copyable plain-text summary
    pub summary: String,
}

impl SessionReport {
    pub fn from_history(config: &PracticeConfig, history: &[ScoringResult]) -> Self {
        let turns = history.len();

        let average_goal_hit = if turns == 0 {
            0
        } else {
            let total: f64 = history.iter().map(|r| r.stage_goal_hit).sum();
            (total / turns as f64).round().max(0.0) as u32
        };

        let mut totals = [0.0f64; 5];
        for result in history {
            for (total, value) in totals.iter_mut().zip(result.dimension_scores.values()) {
                *total += value;
            }
        }

        let dimensions = DimensionScores::NAMES
            .iter()
            .zip(totals)
            .map(|(name, total)| DimensionAverage {
                name: name.to_string(),
                score: if turns == 0 {
                    0.0
                } else {
                    (total / turns as f64 * 10.0).round() / 10.0
                },
            })
            .collect();

        Self {
            industry: config.industry,
            persona: config.persona,
            turns,
            average_goal_hit,
            dimensions,
            summary: summary_text(config, history),
        }
    }
}

fn summary_text(config: &PracticeConfig, history: &[ScoringResult]) -> String {
    let body = history
        .iter()
        .map(|r| {
            format!(
                "[{}] 达成度: {}%\n改进点: {}\n更优脚本: {}",
                r.stage,
                r.stage_goal_hit,
                r.improvements.join(", "),
                r.better_script
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("训练摘要 - {}\n\n{}", config.industry.label(), body)
}
