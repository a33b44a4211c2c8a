use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::handle::SessionHandle;
use super::stats::SessionStats;
use crate::audio::{AudioOutput, CapturePipeline, Microphone, PlaybackScheduler};
use crate::error::{Result, VoiceError};
use crate::practice::PracticeConfig;
use crate::provider::{OutboundFrame, ProviderConnector, ProviderEvent};
use crate::report::SessionReport;
use crate::turn::{Message, Scorer, ScoringRequest, ScoringResult, TurnState, TurnStateMachine};

/// State shared between the manager and the session's event pump
struct SessionCore {
    playback: PlaybackScheduler,
    turn: Option<TurnStateMachine>,
}

impl SessionCore {
    fn dispatch(&mut self, event: ProviderEvent) -> Option<ScoringRequest> {
        match self.turn.as_mut() {
            Some(turn) => turn.handle(event, &mut self.playback),
            None => None,
        }
    }
}

/// Owns the provider connection and the audio resources of one trainee
///
/// At most one `SessionHandle` exists at a time. Opening a new session
/// closes the previous one, stops capture and interrupts playback first.
pub struct SessionManager {
    connector: Arc<dyn ProviderConnector>,
    scorer: Arc<dyn Scorer>,
    capture: CapturePipeline,
    core: Arc<Mutex<SessionCore>>,
    active: Option<SessionHandle>,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn ProviderConnector>,
        scorer: Arc<dyn Scorer>,
        microphone: Box<dyn Microphone>,
        output: Box<dyn AudioOutput>,
        playback_sample_rate: u32,
        channels: u16,
    ) -> Self {
        let playback = PlaybackScheduler::new(output, playback_sample_rate, channels);

        Self {
            connector,
            scorer,
            capture: CapturePipeline::new(microphone),
            core: Arc::new(Mutex::new(SessionCore {
                playback,
                turn: None,
            })),
            active: None,
        }
    }

    /// Open a provider stream for `config`, replacing any open session
    ///
    /// On connection failure no handle is kept and the error is returned.
    /// A capture teardown error from the previous session is logged and does
    /// not block the open; the next `start_talking` retries the release.
    pub async fn open(&mut self, config: PracticeConfig) -> Result<String> {
        if let Err(e) = self.close().await {
            warn!("Previous session closed with an error, opening anyway: {}", e);
        }

        info!(
            "Opening session: {} / {} / {}",
            config.industry, config.persona, config.stage
        );

        let cancel = CancellationToken::new();
        let stream = match self.connector.connect(&config, cancel.clone()).await {
            Ok(stream) => stream,
            Err(e) => {
                cancel.cancel();
                error!("Failed to open session: {}", e);
                return Err(e);
            }
        };

        {
            let mut core = self.core.lock().await;
            core.turn = Some(TurnStateMachine::new(config.clone()));
        }

        let pump = tokio::spawn(pump_events(
            Arc::clone(&self.core),
            stream.events,
            Arc::clone(&self.scorer),
            cancel.clone(),
        ));

        let id = format!("session-{}", Uuid::new_v4());
        info!("Session {} opened", id);

        self.active = Some(SessionHandle {
            id: id.clone(),
            config,
            started_at: Utc::now(),
            outbound: stream.outbound,
            cancel,
            pump,
        });

        Ok(id)
    }

    /// Close the transport, stop capture, then interrupt playback
    ///
    /// Idempotent. Message and score history stay readable until the next
    /// `open`.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.active.take() {
            handle.close().await;
        }

        let stopped = self.capture.stop().await;
        if let Err(e) = &stopped {
            warn!("Capture did not stop cleanly: {}", e);
        }

        {
            let mut core = self.core.lock().await;
            let core = &mut *core;
            core.playback.interrupt();
            if let Some(turn) = core.turn.as_mut() {
                turn.cancel_listening();
                turn.handle(ProviderEvent::Closed, &mut core.playback);
            }
        }

        stopped
    }

    /// Close followed by open with the new configuration
    pub async fn reconfigure(&mut self, config: PracticeConfig) -> Result<String> {
        info!("Reconfiguring session");
        self.open(config).await
    }

    /// Trainee starts speaking: interrupt the customer and start capture
    pub async fn start_talking(&mut self) -> Result<()> {
        let outbound = self.outbound()?;

        {
            let mut core = self.core.lock().await;
            let core = &mut *core;
            core.playback.interrupt();
            if let Some(turn) = core.turn.as_mut() {
                turn.begin_listening();
            }
        }

        if let Err(e) = self.capture.start(outbound).await {
            error!("Failed to start capture: {}", e);
            let mut core = self.core.lock().await;
            if let Some(turn) = core.turn.as_mut() {
                turn.cancel_listening();
            }
            return Err(e);
        }

        Ok(())
    }

    /// Trainee stops speaking: release the microphone and signal end of turn
    ///
    /// Returns whether an end of turn was sent, which happens only when
    /// capture was running.
    pub async fn stop_talking(&mut self) -> Result<bool> {
        let outbound = self.outbound()?;
        let was_capturing = self.capture.is_capturing();

        self.capture.stop().await?;

        let mut core = self.core.lock().await;
        if !was_capturing {
            if let Some(turn) = core.turn.as_mut() {
                turn.cancel_listening();
            }
            return Ok(false);
        }

        outbound
            .send(OutboundFrame::end_of_turn())
            .await
            .map_err(|_| VoiceError::connection("Provider uplink closed"))?;

        if let Some(turn) = core.turn.as_mut() {
            turn.end_listening();
        }

        Ok(true)
    }

    fn outbound(&self) -> Result<mpsc::Sender<OutboundFrame>> {
        self.active
            .as_ref()
            .map(SessionHandle::outbound)
            .ok_or(VoiceError::NoSession)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|handle| handle.id.as_str())
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    pub async fn stats(&self) -> SessionStats {
        let core = self.core.lock().await;
        let turn = core.turn.as_ref();

        SessionStats {
            is_active: self.active.is_some(),
            session_id: self.active.as_ref().map(|h| h.id.clone()),
            started_at: self.active.as_ref().map(|h| h.started_at),
            duration_secs: self
                .active
                .as_ref()
                .map(|h| (Utc::now() - h.started_at).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0),
            turn_state: turn.map(|t| t.state()).unwrap_or(TurnState::Idle),
            awaiting_reply: turn.map(|t| t.awaiting_reply()).unwrap_or(false),
            messages_count: turn.map(|t| t.messages().len()).unwrap_or(0),
            scores_count: turn.map(|t| t.scores().len()).unwrap_or(0),
            chunks_scheduled: core.playback.chunks_scheduled(),
            blocks_sent: self.capture.blocks_sent(),
        }
    }

    pub async fn messages(&self) -> Vec<Message> {
        let core = self.core.lock().await;
        core.turn
            .as_ref()
            .map(|t| t.messages().to_vec())
            .unwrap_or_default()
    }

    pub async fn scores(&self) -> Vec<ScoringResult> {
        let core = self.core.lock().await;
        core.turn
            .as_ref()
            .map(|t| t.scores().to_vec())
            .unwrap_or_default()
    }

    /// Practice configuration of the current (or last closed) session
    pub async fn practice_config(&self) -> Option<PracticeConfig> {
        let core = self.core.lock().await;
        core.turn.as_ref().map(|t| t.config().clone())
    }

    /// Report over the current (or last closed) session's scored turns
    pub async fn report(&self) -> Option<SessionReport> {
        let core = self.core.lock().await;
        core.turn
            .as_ref()
            .map(|t| SessionReport::from_history(t.config(), t.scores()))
    }
}

/// Apply provider events in delivery order until cancelled
///
/// Scoring runs outside the lock; its result is applied only while the
/// session is still live.
async fn pump_events(
    core: Arc<Mutex<SessionCore>>,
    mut events: mpsc::Receiver<ProviderEvent>,
    scorer: Arc<dyn Scorer>,
    cancel: CancellationToken,
) {
    let mut scoring: JoinSet<Result<ScoringResult>> = JoinSet::new();
    let mut stream_open = true;

    info!("Session event pump started");

    loop {
        if !stream_open && scoring.is_empty() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv(), if stream_open => {
                let event = match event {
                    Some(event) => event,
                    None => {
                        stream_open = false;
                        ProviderEvent::Closed
                    }
                };

                let request = {
                    let mut core = core.lock().await;
                    if cancel.is_cancelled() {
                        break;
                    }
                    core.dispatch(event)
                };

                if let Some(request) = request {
                    let scorer = Arc::clone(&scorer);
                    scoring.spawn(async move { scorer.score(&request).await });
                }
            }
            Some(joined) = scoring.join_next(), if !scoring.is_empty() => {
                let outcome = joined.unwrap_or_else(|e| {
                    Err(VoiceError::scoring(format!("Scoring task failed: {}", e)))
                });

                let mut core = core.lock().await;
                if cancel.is_cancelled() {
                    break;
                }
                if let Some(turn) = core.turn.as_mut() {
                    turn.record_score(outcome);
                }
            }
        }
    }

    info!("Session event pump stopped");
}
