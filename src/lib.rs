pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod practice;
pub mod provider;
pub mod report;
pub mod review;
pub mod session;
pub mod tts;
pub mod turn;

pub use audio::{
    AudioBackendConfig, AudioBackendFactory, AudioChunk, AudioFrame, AudioOutput, CapturePipeline,
    Microphone, PlanarBuffer, PlaybackScheduler,
};
pub use config::AppConfig;
pub use error::{Result, VoiceError};
pub use http::{create_router, AppState};
pub use practice::{Industry, Persona, PracticeConfig, Stage};
pub use provider::{LiveClient, OutboundFrame, ProviderConnector, ProviderEvent, ProviderStream};
pub use report::SessionReport;
pub use review::{ReviewClient, SessionReview};
pub use session::{SessionManager, SessionStats};
pub use tts::{SpeechClip, TtsClient};
pub use turn::{HttpScorer, Message, Role, Scorer, ScoringResult, TurnState, TurnStateMachine};
