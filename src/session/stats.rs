use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::turn::TurnState;

/// Snapshot of the practice session for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether a provider stream is currently open
    pub is_active: bool,

    /// Identifier of the open session, if any
    pub session_id: Option<String>,

    /// When the open session started
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the session started (0 when inactive)
    pub duration_secs: f64,

    /// Current phase of the turn
    pub turn_state: TurnState,

    /// True between end of trainee speech and the first reply content
    pub awaiting_reply: bool,

    /// Number of transcript messages so far
    pub messages_count: usize,

    /// Number of scored turns so far
    pub scores_count: usize,

    /// Number of customer audio chunks scheduled for playback
    pub chunks_scheduled: usize,

    /// Number of microphone blocks sent to the provider
    pub blocks_sent: usize,
}
