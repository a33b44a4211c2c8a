//! Stateless conversion between float samples, PCM16 LE bytes and the
//! base64 text carried by the provider transport.

use base64::Engine;

use super::chunk::PlanarBuffer;
use crate::error::{Result, VoiceError};

/// Scale one float sample to i16.
///
/// Negative values scale by 32768 and non-negative by 32767, truncating
/// toward zero. Output must stay bit-identical to the provider's reference
/// encoder.
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Convert float samples to PCM16 LE bytes
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| float_to_i16(s).to_le_bytes())
        .collect()
}

/// Base64 text for raw bytes
pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Float samples in [-1, 1] to transport text. Empty input gives empty text.
pub fn encode_to_transport(samples: &[f32]) -> String {
    encode_bytes(&samples_to_pcm16(samples))
}

/// Transport text back to raw bytes (not a PCM decode)
pub fn decode_from_transport(text: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(text)?)
}

/// Deinterleave PCM16 LE bytes into planar float buffers (x / 32768)
pub fn pcm16_to_samples(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<PlanarBuffer> {
    if channels == 0 {
        return Err(VoiceError::format("channel count must be at least 1"));
    }

    let bytes_per_frame = channels as usize * 2;
    if bytes.len() % bytes_per_frame != 0 {
        return Err(VoiceError::format(format!(
            "{} bytes is not a multiple of {} ({} channels * 2)",
            bytes.len(),
            bytes_per_frame,
            channels
        )));
    }

    let frames = bytes.len() / bytes_per_frame;
    let mut planes = vec![Vec::with_capacity(frames); channels as usize];

    for frame in bytes.chunks_exact(bytes_per_frame) {
        for (channel, sample) in frame.chunks_exact(2).enumerate() {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            planes[channel].push(value as f32 / 32768.0);
        }
    }

    Ok(PlanarBuffer {
        channels: planes,
        sample_rate,
    })
}
