use std::fmt;

use serde::{Deserialize, Serialize};

/// MOT (moment of truth) training stage
///
/// Opaque to the session engine beyond being passed to the provider prompt
/// and the scoring collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "探索")]
    Explore,
    #[serde(rename = "提议")]
    Propose,
    #[serde(rename = "行动")]
    Act,
    #[serde(rename = "确认")]
    Confirm,
    #[serde(rename = "完整流程")]
    Full,
}

impl Stage {
    /// The four stages of a full exchange, in order
    pub const SEQUENCE: [Stage; 4] = [Stage::Explore, Stage::Propose, Stage::Act, Stage::Confirm];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Explore => "探索",
            Stage::Propose => "提议",
            Stage::Act => "行动",
            Stage::Confirm => "确认",
            Stage::Full => "完整流程",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "餐饮")]
    Catering,
    #[serde(rename = "零售")]
    Retail,
    #[serde(rename = "酒店")]
    Hotel,
    #[serde(rename = "客服")]
    CustomerService,
    #[serde(rename = "售后")]
    AfterSales,
}

impl Industry {
    pub fn label(&self) -> &'static str {
        match self {
            Industry::Catering => "餐饮",
            Industry::Retail => "零售",
            Industry::Hotel => "酒店",
            Industry::CustomerService => "客服",
            Industry::AfterSales => "售后",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Simulated customer temperament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "温和")]
    Gentle,
    #[serde(rename = "挑剔")]
    Picky,
    #[serde(rename = "愤怒")]
    Angry,
    #[serde(rename = "犹豫")]
    Hesitant,
    #[serde(rename = "理性")]
    Rational,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Gentle => "温和",
            Persona::Picky => "挑剔",
            Persona::Angry => "愤怒",
            Persona::Hesitant => "犹豫",
            Persona::Rational => "理性",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prebuilt provider voices offered for the simulated customer
pub const VOICE_NAMES: [&str; 5] = ["Kore", "Puck", "Charon", "Fenrir", "Zephyr"];

/// Configuration for one practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeConfig {
    pub industry: Industry,
    pub persona: Persona,
    pub stage: Stage,
    /// Provider voice for the simulated customer
    pub voice_name: String,
    /// Whether the UI should show live transcripts
    #[serde(default = "default_show_transcription")]
    pub show_transcription: bool,
}

fn default_show_transcription() -> bool {
    true
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            industry: Industry::CustomerService,
            persona: Persona::Gentle,
            stage: Stage::Explore,
            voice_name: "Zephyr".to_string(),
            show_transcription: true,
        }
    }
}
