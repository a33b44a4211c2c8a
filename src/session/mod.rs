//! Practice session lifecycle
//!
//! This module provides the `SessionManager` that owns:
//! - The single provider connection (`SessionHandle`)
//! - The capture pipeline (microphone uplink)
//! - The playback scheduler (customer audio)
//! - The turn-state machine and its history
//!
//! Reconfiguring is a close followed by an open; nothing is migrated.

mod handle;
mod manager;
mod stats;

pub use handle::SessionHandle;
pub use manager::SessionManager;
pub use stats::SessionStats;
