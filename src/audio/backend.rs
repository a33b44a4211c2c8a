use tokio::sync::mpsc;

use super::chunk::{CAPTURE_SAMPLE_RATE, PLAYBACK_SAMPLE_RATE, SESSION_CHANNELS};
use super::playback::AudioOutput;
use crate::error::{Result, VoiceError};

/// One block of captured microphone samples
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Float samples in [-1, 1], interleaved
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio devices
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Capture sample rate (fixed per session)
    pub capture_sample_rate: u32,
    /// Playback sample rate (fixed per session)
    pub playback_sample_rate: u32,
    /// Channel count for both directions
    pub channels: u16,
    /// Frames per captured block handed to the encoder
    pub capture_block_frames: u32,
    /// Input device name (None = system default)
    pub input_device: Option<String>,
    /// Output device name (None = system default)
    pub output_device: Option<String>,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            capture_sample_rate: CAPTURE_SAMPLE_RATE,
            playback_sample_rate: PLAYBACK_SAMPLE_RATE,
            channels: SESSION_CHANNELS,
            capture_block_frames: 4096,
            input_device: None,
            output_device: None,
        }
    }
}

/// Microphone capture trait
///
/// Implementations:
/// - cpal input stream (feature `cpal-audio`)
/// - test doubles that count acquisitions
#[async_trait::async_trait]
pub trait Microphone: Send + Sync {
    /// Acquire the device and start capturing
    ///
    /// Returns a channel receiver that will receive sample blocks.
    /// Fails with `VoiceError::Device` when the device cannot be acquired.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing and release the device before returning
    async fn stop(&mut self) -> Result<()>;

    /// Check if the device is currently held
    fn is_capturing(&self) -> bool;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// Audio device factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create the platform microphone
    pub fn microphone(config: &AudioBackendConfig) -> Result<Box<dyn Microphone>> {
        #[cfg(feature = "cpal-audio")]
        {
            let mic = super::cpal::CpalMicrophone::new(config.clone())?;
            Ok(Box::new(mic))
        }

        #[cfg(not(feature = "cpal-audio"))]
        {
            let _ = config;
            Err(VoiceError::device(
                "microphone capture requires the `cpal-audio` feature",
            ))
        }
    }

    /// Create the platform speaker output
    pub fn output(config: &AudioBackendConfig) -> Result<Box<dyn AudioOutput>> {
        #[cfg(feature = "cpal-audio")]
        {
            let output = super::cpal::CpalOutput::new(config.clone())?;
            Ok(Box::new(output))
        }

        #[cfg(not(feature = "cpal-audio"))]
        {
            let _ = config;
            Err(VoiceError::device(
                "audio playback requires the `cpal-audio` feature",
            ))
        }
    }
}
