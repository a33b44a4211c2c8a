use super::state::AppState;
use crate::error::VoiceError;
use crate::practice::PracticeConfig;
use crate::review;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(e: &VoiceError) -> Response {
    let status = match e {
        VoiceError::NoSession => StatusCode::CONFLICT,
        VoiceError::Connection { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn ok(status: &str, message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: status.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/open
/// Open a session, closing any existing one first
pub async fn open_session(
    State(state): State<AppState>,
    Json(config): Json<PracticeConfig>,
) -> impl IntoResponse {
    info!(
        "Opening practice session: {} / {} / {}",
        config.industry, config.persona, config.stage
    );

    let mut session = state.session.lock().await;
    let reconfiguring = session.is_active();

    let result = if reconfiguring {
        session.reconfigure(config).await
    } else {
        session.open(config).await
    };

    match result {
        Ok(session_id) => (
            StatusCode::OK,
            Json(OpenSessionResponse {
                session_id: session_id.clone(),
                status: "active".to_string(),
                message: if reconfiguring {
                    format!("Session reconfigured as {}", session_id)
                } else {
                    format!("Session {} opened", session_id)
                },
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to open session: {}", e);
            error_response(&e)
        }
    }
}

/// POST /session/close
pub async fn close_session(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match session.close().await {
        Ok(()) => ok("closed", "Session closed"),
        Err(e) => {
            error!("Failed to close session cleanly: {}", e);
            error_response(&e)
        }
    }
}

/// POST /session/talk/start
pub async fn start_talking(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match session.start_talking().await {
        Ok(()) => ok("listening", "Capture started"),
        Err(e) => {
            error!("Failed to start talking: {}", e);
            error_response(&e)
        }
    }
}

/// POST /session/talk/stop
pub async fn stop_talking(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match session.stop_talking().await {
        Ok(true) => ok("awaiting_response", "Capture stopped, end of turn sent"),
        Ok(false) => ok("idle", "Capture was not running, no end of turn sent"),
        Err(e) => {
            error!("Failed to stop talking: {}", e);
            error_response(&e)
        }
    }
}

/// GET /session/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.stats().await))
}

/// GET /session/messages
/// Conversation transcript accumulated so far
pub async fn get_messages(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.messages().await))
}

/// GET /session/scores
pub async fn get_scores(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.scores().await))
}

/// GET /session/report
/// Training report over the current or last session
pub async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;

    match session.report().await {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => error_response(&VoiceError::NoSession),
    }
}

/// GET /session/review
/// Coaching review of the whole conversation so far
pub async fn get_review(State(state): State<AppState>) -> impl IntoResponse {
    let Some(reviewer) = state.reviewer.clone() else {
        return error_response(&VoiceError::Config {
            message: "No review endpoint configured".to_string(),
        });
    };

    // Snapshot under the lock; the review call runs without it
    let (config, messages) = {
        let session = state.session.lock().await;
        match session.practice_config().await {
            Some(config) => (config, session.messages().await),
            None => return error_response(&VoiceError::NoSession),
        }
    };

    let transcript = review::transcript_text(&messages);
    if transcript.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Nothing to review yet: the transcript is empty".to_string(),
            }),
        )
            .into_response();
    }

    match reviewer
        .review(&review::scenario_label(&config), &transcript)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!("Session review failed: {}", e);
            error_response(&e)
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
