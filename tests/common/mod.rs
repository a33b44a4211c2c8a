// Test doubles shared by the integration tests.
//
// Each double implements the same trait as the real device or transport and
// records what happened to it.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voice_coach::audio::{AudioFrame, AudioOutput, Microphone, PlanarBuffer, VoiceId};
use voice_coach::practice::PracticeConfig;
use voice_coach::provider::{OutboundFrame, ProviderConnector, ProviderEvent, ProviderStream};
use voice_coach::turn::{DimensionScores, Scorer, ScoringRequest, ScoringResult};
use voice_coach::{Result, VoiceError};

// ============================================================================
// Output clock
// ============================================================================

#[derive(Debug, Default)]
pub struct Clock {
    pub now: f64,
    pub scheduled: Vec<(VoiceId, f64, usize)>,
    pub stopped: Vec<VoiceId>,
    pub finished: Vec<VoiceId>,
}

/// Output whose clock only moves when the test says so
pub struct ManualOutput {
    pub clock: Arc<Mutex<Clock>>,
    next_id: VoiceId,
}

impl ManualOutput {
    pub fn new() -> (Self, Arc<Mutex<Clock>>) {
        let clock = Arc::new(Mutex::new(Clock::default()));
        (
            Self {
                clock: Arc::clone(&clock),
                next_id: 0,
            },
            clock,
        )
    }
}

impl AudioOutput for ManualOutput {
    fn current_time(&self) -> f64 {
        self.clock.lock().unwrap().now
    }

    fn schedule(&mut self, buffer: PlanarBuffer, start_at: f64) -> Result<VoiceId> {
        self.next_id += 1;
        self.clock
            .lock()
            .unwrap()
            .scheduled
            .push((self.next_id, start_at, buffer.frames()));
        Ok(self.next_id)
    }

    fn stop(&mut self, voice: VoiceId) {
        self.clock.lock().unwrap().stopped.push(voice);
    }

    fn drain_finished(&mut self) -> Vec<VoiceId> {
        std::mem::take(&mut self.clock.lock().unwrap().finished)
    }

    fn name(&self) -> &str {
        "manual"
    }
}

// ============================================================================
// Microphone
// ============================================================================

#[derive(Debug, Default)]
pub struct MicStats {
    pub current: AtomicUsize,
    pub max_concurrent: AtomicUsize,
    pub acquisitions: AtomicUsize,
    pub releases: AtomicUsize,
    pub deny: AtomicBool,
    /// Fail the next release, keeping the device held
    pub fail_stop: AtomicBool,
    pub feed: Mutex<Option<mpsc::Sender<AudioFrame>>>,
}

impl MicStats {
    /// Push one captured block, as the device callback would
    pub fn capture(&self, samples: Vec<f32>) -> bool {
        let feed = self.feed.lock().unwrap().clone();
        match feed {
            Some(feed) => feed
                .try_send(AudioFrame {
                    samples,
                    sample_rate: 16000,
                    channels: 1,
                    timestamp_ms: 0,
                })
                .is_ok(),
            None => false,
        }
    }
}

/// Microphone that counts concurrent acquisitions
pub struct CountingMicrophone {
    stats: Arc<MicStats>,
    capturing: bool,
}

impl CountingMicrophone {
    pub fn new() -> (Self, Arc<MicStats>) {
        let stats = Arc::new(MicStats::default());
        (
            Self {
                stats: Arc::clone(&stats),
                capturing: false,
            },
            stats,
        )
    }
}

#[async_trait::async_trait]
impl Microphone for CountingMicrophone {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.stats.deny.load(Ordering::SeqCst) {
            return Err(VoiceError::device("permission denied"));
        }

        let current = self.stats.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .max_concurrent
            .fetch_max(current, Ordering::SeqCst);
        self.stats.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.capturing = true;

        let (tx, rx) = mpsc::channel(16);
        *self.stats.feed.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if self.capturing && self.stats.fail_stop.swap(false, Ordering::SeqCst) {
            return Err(VoiceError::device("device lock poisoned"));
        }
        if self.capturing {
            // Simulate a device that takes a moment to release
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.stats.feed.lock().unwrap().take();
            self.stats.current.fetch_sub(1, Ordering::SeqCst);
            self.stats.releases.fetch_add(1, Ordering::SeqCst);
            self.capturing = false;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "counting-mic"
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Test side of one opened provider stream
pub struct ProviderLink {
    pub config: PracticeConfig,
    pub events: mpsc::Sender<ProviderEvent>,
    pub outbound: Option<mpsc::Receiver<OutboundFrame>>,
    pub cancel: CancellationToken,
}

/// Connector that hands out in-memory streams
#[derive(Default)]
pub struct MemoryConnector {
    pub links: Mutex<Vec<ProviderLink>>,
    pub refuse: AtomicBool,
}

impl MemoryConnector {
    pub fn connections(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn events(&self, index: usize) -> mpsc::Sender<ProviderEvent> {
        self.links.lock().unwrap()[index].events.clone()
    }

    pub fn take_outbound(&self, index: usize) -> mpsc::Receiver<OutboundFrame> {
        self.links.lock().unwrap()[index]
            .outbound
            .take()
            .expect("outbound already taken")
    }

    pub fn is_cancelled(&self, index: usize) -> bool {
        self.links.lock().unwrap()[index].cancel.is_cancelled()
    }
}

#[async_trait::async_trait]
impl ProviderConnector for MemoryConnector {
    async fn connect(
        &self,
        practice: &PracticeConfig,
        cancel: CancellationToken,
    ) -> Result<ProviderStream> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(VoiceError::connection("provider unreachable"));
        }

        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        let (events_tx, events_rx) = mpsc::channel(64);

        self.links.lock().unwrap().push(ProviderLink {
            config: practice.clone(),
            events: events_tx,
            outbound: Some(outbound_rx),
            cancel,
        });

        Ok(ProviderStream {
            outbound: outbound_tx,
            events: events_rx,
        })
    }
}

// ============================================================================
// Scorer
// ============================================================================

/// Scorer returning a fixed result and counting calls
#[derive(Default)]
pub struct CannedScorer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub requests: Mutex<Vec<ScoringRequest>>,
}

#[async_trait::async_trait]
impl Scorer for CannedScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoringResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if self.fail.load(Ordering::SeqCst) {
            return Err(VoiceError::scoring("scoring service unavailable"));
        }

        Ok(sample_result(request.stage.label(), 80.0))
    }
}

pub fn sample_result(stage: &str, goal: f64) -> ScoringResult {
    ScoringResult {
        stage: stage.to_string(),
        stage_goal_hit: goal,
        dimension_scores: DimensionScores {
            listening: 4.0,
            clarifying: 3.0,
            empathy: 4.0,
            solution_clarity: 3.0,
            confirmation: 2.0,
        },
        highlights: vec!["主动问候".to_string()],
        improvements: vec!["复述客户诉求".to_string()],
        better_script: "您是说……对吗？".to_string(),
        next_move: "追问细节".to_string(),
        risk_alert: None,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// 24kHz mono PCM16 silence of the given length
pub fn customer_audio_ms(ms: usize) -> Vec<u8> {
    vec![0u8; 24 * ms * 2]
}

/// Poll `check` until it holds or a second passes
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
