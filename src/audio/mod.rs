pub mod backend;
pub mod capture;
pub mod chunk;
pub mod codec;
pub mod playback;
pub mod wav;

#[cfg(feature = "cpal-audio")]
pub mod cpal;

pub use backend::{AudioBackendConfig, AudioBackendFactory, AudioFrame, Microphone};
pub use capture::CapturePipeline;
pub use chunk::{AudioChunk, PlanarBuffer, CAPTURE_SAMPLE_RATE, PLAYBACK_SAMPLE_RATE, SESSION_CHANNELS};
pub use playback::{AudioOutput, PlaybackScheduler, ScheduledChunk, VoiceId};
