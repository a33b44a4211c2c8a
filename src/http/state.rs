use crate::review::ReviewClient;
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The trainee's practice session (one per process)
    pub session: Arc<Mutex<SessionManager>>,
    /// Whole-session reviewer, when configured
    pub reviewer: Option<Arc<ReviewClient>>,
}

impl AppState {
    pub fn new(manager: SessionManager) -> Self {
        Self {
            session: Arc::new(Mutex::new(manager)),
            reviewer: None,
        }
    }

    pub fn with_reviewer(mut self, reviewer: ReviewClient) -> Self {
        self.reviewer = Some(Arc::new(reviewer));
        self
    }
}
