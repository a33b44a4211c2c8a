//! Turn-state machine: provider events in, transcript, playback and scoring
//! effects out.

mod machine;
mod scoring;
mod transcript;

pub use machine::{TurnState, TurnStateMachine};
pub use scoring::{DimensionScores, HttpScorer, Scorer, ScoringRequest, ScoringResult};
pub use transcript::{Message, MessageList, Role, TranscriptBuffer};
