/// Sample rate of trainee audio sent to the provider
pub const CAPTURE_SAMPLE_RATE: u32 = 16000;

/// Sample rate of synthesized customer audio received from the provider
pub const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Both directions are mono
pub const SESSION_CHANNELS: u16 = 1;

/// A bounded unit of 16-bit little-endian PCM audio
///
/// Owned by whichever stage is processing it; moved, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// Raw PCM16 LE bytes (interleaved when multi-channel)
    pub data: Vec<u8>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl AudioChunk {
    pub fn new(data: Vec<u8>, sample_rate: u32, channels: u16) -> Self {
        Self {
            data,
            sample_rate,
            channels,
        }
    }

    /// Inbound provider audio (24kHz mono)
    pub fn inbound(data: Vec<u8>) -> Self {
        Self::new(data, PLAYBACK_SAMPLE_RATE, SESSION_CHANNELS)
    }

    /// Duration in seconds, assuming a well-formed payload
    pub fn duration_secs(&self) -> f64 {
        let bytes_per_frame = self.channels as usize * 2;
        if bytes_per_frame == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        (self.data.len() / bytes_per_frame) as f64 / self.sample_rate as f64
    }
}

/// Decoded audio, one `Vec<f32>` per channel, samples in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl PlanarBuffer {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}
