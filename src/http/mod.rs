//! HTTP API for driving a practice session from a front end
//!
//! - POST /session/open - Open (or reconfigure) the session with a practice config
//! - POST /session/close - Close the session
//! - POST /session/talk/start - Trainee starts speaking
//! - POST /session/talk/stop - Trainee stops speaking (end of turn)
//! - GET /session/status - Session statistics
//! - GET /session/messages - Conversation transcript
//! - GET /session/scores - Scored turns
//! - GET /session/report - Training report
//! - GET /session/review - Whole-session coaching review
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::AppState;
