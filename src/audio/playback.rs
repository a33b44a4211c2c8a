//! Gapless playback scheduling for streamed provider audio.
//!
//! The scheduler keeps a virtual timeline on the output device clock. Each
//! chunk starts at `max(now, next_free_slot)` so chunks that arrive ahead of
//! real time queue back-to-back, and chunks that arrive late start
//! immediately. Streaming ahead is what absorbs network jitter.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::chunk::{AudioChunk, PlanarBuffer};
use super::codec;
use crate::error::Result;

/// Identifies one scheduled buffer on an output device
pub type VoiceId = u64;

/// Speaker output with its own clock
///
/// The clock is in seconds and only moves forward while the device renders.
pub trait AudioOutput: Send {
    /// Current position of the output clock in seconds
    fn current_time(&self) -> f64;

    /// Schedule `buffer` to start at `start_at` seconds on the output clock
    fn schedule(&mut self, buffer: PlanarBuffer, start_at: f64) -> Result<VoiceId>;

    /// Stop a voice immediately (no-op if already finished)
    fn stop(&mut self, voice: VoiceId);

    /// Voices that ended naturally since the previous call
    fn drain_finished(&mut self) -> Vec<VoiceId>;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// Where a chunk landed on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledChunk {
    pub voice: VoiceId,
    pub start_at: f64,
    pub duration: f64,
}

/// Orders inbound chunks on the output timeline
pub struct PlaybackScheduler {
    output: Box<dyn AudioOutput>,
    sample_rate: u32,
    channels: u16,
    next_free_slot: f64,
    /// Voices scheduled or playing, with their scheduled end time
    active: HashMap<VoiceId, f64>,
    chunks_scheduled: usize,
}

impl PlaybackScheduler {
    pub fn new(output: Box<dyn AudioOutput>, sample_rate: u32, channels: u16) -> Self {
        info!(
            "Playback scheduler initialized on {} ({}Hz, {} channels)",
            output.name(),
            sample_rate,
            channels
        );

        Self {
            output,
            sample_rate,
            channels,
            next_free_slot: 0.0,
            active: HashMap::new(),
            chunks_scheduled: 0,
        }
    }

    /// Decode and schedule a chunk right after everything already queued
    ///
    /// A chunk that fails to decode is logged and dropped; the timeline is
    /// left untouched.
    pub fn enqueue(&mut self, chunk: AudioChunk) -> Option<ScheduledChunk> {
        self.reap();

        if chunk.sample_rate != self.sample_rate || chunk.channels != self.channels {
            warn!(
                "Dropping chunk with unexpected format {}Hz/{}ch (expected {}Hz/{}ch)",
                chunk.sample_rate, chunk.channels, self.sample_rate, self.channels
            );
            return None;
        }

        let buffer = match codec::pcm16_to_samples(&chunk.data, self.sample_rate, self.channels) {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("Dropping undecodable audio chunk: {}", e);
                return None;
            }
        };

        if buffer.is_empty() {
            debug!("Skipping empty audio chunk");
            return None;
        }

        let duration = buffer.duration_secs();
        let start_at = self.output.current_time().max(self.next_free_slot);

        let voice = match self.output.schedule(buffer, start_at) {
            Ok(voice) => voice,
            Err(e) => {
                warn!("Failed to schedule audio chunk on {}: {}", self.output.name(), e);
                return None;
            }
        };

        self.next_free_slot = start_at + duration;
        self.active.insert(voice, self.next_free_slot);
        self.chunks_scheduled += 1;

        debug!(
            "Scheduled voice {} at {:.3}s ({:.3}s long)",
            voice, start_at, duration
        );

        Some(ScheduledChunk {
            voice,
            start_at,
            duration,
        })
    }

    /// Stop everything immediately and reset the timeline
    ///
    /// The next enqueued chunk starts at "now".
    pub fn interrupt(&mut self) {
        if !self.active.is_empty() {
            info!("Interrupting playback ({} active voices)", self.active.len());
        }

        for (voice, _) in self.active.drain() {
            self.output.stop(voice);
        }
        // Anything that finished while we were stopping is no longer interesting
        self.output.drain_finished();
        self.next_free_slot = 0.0;
    }

    /// Forget voices that finished naturally
    pub fn reap(&mut self) {
        for voice in self.output.drain_finished() {
            self.active.remove(&voice);
        }
    }

    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    pub fn is_playing(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn next_free_slot(&self) -> f64 {
        self.next_free_slot
    }

    pub fn chunks_scheduled(&self) -> usize {
        self.chunks_scheduled
    }
}
