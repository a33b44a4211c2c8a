use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::scoring::{Scorer, ScoringRequest, ScoringResult};
use super::transcript::{Message, MessageList, Role, TranscriptBuffer};
use crate::audio::PlaybackScheduler;
use crate::error::Result;
use crate::practice::PracticeConfig;
use crate::provider::ProviderEvent;

/// Phase of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    /// Trainee is speaking (capture running)
    Listening,
    /// Capture stopped, end of turn sent, nothing heard back yet
    AwaitingResponse,
    /// Provider content is arriving
    Responding,
}

/// Drives one session's conversation from provider events
///
/// Owns the per-turn transcript buffers and the session's message and
/// score history. Playback is borrowed per event.
pub struct TurnStateMachine {
    config: PracticeConfig,
    state: TurnState,
    awaiting_reply: bool,
    trainee: TranscriptBuffer,
    customer: TranscriptBuffer,
    /// Trainee text of a turn the trainee talked over before it completed
    held_trainee: Option<TranscriptBuffer>,
    trainee_message: Option<Uuid>,
    customer_message: Option<Uuid>,
    messages: MessageList,
    scores: Vec<ScoringResult>,
}

impl TurnStateMachine {
    pub fn new(config: PracticeConfig) -> Self {
        Self {
            config,
            state: TurnState::Idle,
            awaiting_reply: false,
            trainee: TranscriptBuffer::new(),
            customer: TranscriptBuffer::new(),
            held_trainee: None,
            trainee_message: None,
            customer_message: None,
            messages: MessageList::new(),
            scores: Vec::new(),
        }
    }

    /// Trainee pressed talk
    ///
    /// Talking over a turn that has not completed yet sets that turn's
    /// trainee text aside, so the new utterance starts its own message.
    pub fn begin_listening(&mut self) {
        debug!("Turn: {:?} -> Listening", self.state);
        if self.state != TurnState::Listening && !self.trainee.is_empty() {
            let previous = std::mem::take(&mut self.trainee);
            self.held_trainee
                .get_or_insert_with(TranscriptBuffer::new)
                .extend(previous);
            self.trainee_message = None;
        }
        self.state = TurnState::Listening;
        self.awaiting_reply = false;
    }

    /// Trainee released talk; end of turn has been sent
    pub fn end_listening(&mut self) {
        if self.state != TurnState::Listening {
            debug!("end_listening ignored in {:?}", self.state);
            return;
        }
        self.state = TurnState::AwaitingResponse;
        self.awaiting_reply = true;
    }

    /// Capture stopped without an end of turn; fall back to idle
    pub fn cancel_listening(&mut self) {
        if self.state == TurnState::Listening {
            self.state = TurnState::Idle;
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state == TurnState::Listening
    }

    /// Apply one provider event
    ///
    /// Returns the scoring request when a turn completes with text on both
    /// sides. The buffers are captured by value before being reset.
    pub fn handle(
        &mut self,
        event: ProviderEvent,
        playback: &mut PlaybackScheduler,
    ) -> Option<ScoringRequest> {
        match event {
            ProviderEvent::Audio(chunk) => {
                self.content_arrived();
                playback.enqueue(chunk);
                None
            }
            ProviderEvent::InputTranscript(fragment) => {
                self.content_arrived();
                self.append(Role::Trainee, fragment);
                None
            }
            ProviderEvent::OutputTranscript(fragment) => {
                self.content_arrived();
                self.append(Role::Customer, fragment);
                None
            }
            ProviderEvent::Interrupted => {
                info!("Trainee interrupted playback");
                playback.interrupt();
                None
            }
            ProviderEvent::TurnComplete => self.complete_turn(),
            ProviderEvent::Error(message) => {
                warn!("Provider error: {}", message);
                self.abandon_turn();
                None
            }
            ProviderEvent::Closed => {
                info!("Provider stream closed");
                self.abandon_turn();
                None
            }
        }
    }

    /// Apply an event and score the turn it completes, if any
    pub async fn process(
        &mut self,
        event: ProviderEvent,
        playback: &mut PlaybackScheduler,
        scorer: &dyn Scorer,
    ) {
        if let Some(request) = self.handle(event, playback) {
            let outcome = scorer.score(&request).await;
            self.record_score(outcome);
        }
    }

    /// Append a scoring outcome to history; failures are logged and dropped
    pub fn record_score(&mut self, outcome: Result<ScoringResult>) {
        match outcome {
            Ok(result) => {
                info!(
                    "Turn scored: {} goal hit {}%",
                    result.stage, result.stage_goal_hit
                );
                self.scores.push(result);
            }
            Err(e) => warn!("Scoring failed, turn not recorded: {}", e),
        }
    }

    fn content_arrived(&mut self) {
        if matches!(self.state, TurnState::AwaitingResponse | TurnState::Idle) {
            debug!("Turn: {:?} -> Responding", self.state);
            self.state = TurnState::Responding;
        }
        self.awaiting_reply = false;
    }

    fn append(&mut self, role: Role, fragment: String) {
        let (buffer, message_id) = match role {
            Role::Trainee => (&mut self.trainee, &mut self.trainee_message),
            Role::Customer => (&mut self.customer, &mut self.customer_message),
        };

        buffer.push(fragment);
        let text = buffer.text();

        match *message_id {
            Some(id) => {
                self.messages.update_text(id, text);
            }
            None => {
                *message_id = Some(self.messages.push(Message::new(role, text)));
            }
        }
    }

    /// Close the provider's turn and capture its text by value
    ///
    /// While the trainee is still talking, the live trainee buffer belongs
    /// to the next turn and stays in place; only held text is scored.
    fn complete_turn(&mut self) -> Option<ScoringRequest> {
        let trainee = if self.is_listening() {
            self.held_trainee.take().unwrap_or_default()
        } else {
            let current = std::mem::take(&mut self.trainee);
            self.trainee_message = None;
            match self.held_trainee.take() {
                Some(mut held) => {
                    held.extend(current);
                    held
                }
                None => current,
            }
        };
        let customer = std::mem::take(&mut self.customer);
        self.customer_message = None;
        self.settle();

        let trainee_text = trainee.text().trim().to_string();
        let customer_text = customer.text().trim().to_string();

        if trainee_text.is_empty() || customer_text.is_empty() {
            debug!("Turn complete without text on both sides, skipping scoring");
            return None;
        }

        Some(ScoringRequest {
            stage: self.config.stage,
            trainee_text,
            customer_text,
            scenario_config: self.config.clone(),
        })
    }

    /// Drop the unfinished turn after a provider error or close
    ///
    /// Messages already shown stay in history. An utterance still being
    /// captured keeps its buffer.
    fn abandon_turn(&mut self) {
        self.held_trainee = None;
        self.customer = TranscriptBuffer::new();
        self.customer_message = None;
        if !self.is_listening() {
            self.trainee = TranscriptBuffer::new();
            self.trainee_message = None;
        }
        self.settle();
    }

    /// Return to idle unless the trainee is mid-utterance
    fn settle(&mut self) {
        if !self.is_listening() {
            self.state = TurnState::Idle;
        }
        self.awaiting_reply = false;
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.as_slice()
    }

    pub fn scores(&self) -> &[ScoringResult] {
        &self.scores
    }

    pub fn trainee_buffer(&self) -> &TranscriptBuffer {
        &self.trainee
    }

    pub fn customer_buffer(&self) -> &TranscriptBuffer {
        &self.customer
    }
}
