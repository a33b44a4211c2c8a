use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::practice::PracticeConfig;
use crate::provider::OutboundFrame;

/// One live connection to the provider
///
/// Owns no audio resources. Dropping the outbound sender and cancelling the
/// token shuts the transport down.
pub struct SessionHandle {
    pub id: String,
    pub config: PracticeConfig,
    pub started_at: DateTime<Utc>,
    pub(super) outbound: mpsc::Sender<OutboundFrame>,
    pub(super) cancel: CancellationToken,
    pub(super) pump: JoinHandle<()>,
}

impl SessionHandle {
    /// Uplink for captured audio and end-of-turn frames
    pub fn outbound(&self) -> mpsc::Sender<OutboundFrame> {
        self.outbound.clone()
    }

    /// Cancel the transport and wait for the event pump to finish
    ///
    /// No event from this session is applied after this returns.
    pub async fn close(self) {
        info!("Closing session {}", self.id);

        self.cancel.cancel();
        drop(self.outbound);

        self.pump.abort();
        if let Err(e) = self.pump.await {
            if e.is_panic() {
                error!("Session event pump panicked: {}", e);
            }
        }
    }
}
