use std::io::Cursor;

use super::chunk::AudioChunk;
use crate::error::{Result, VoiceError};

/// Wrap raw PCM16 LE bytes in a WAV container
pub fn pcm16_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    if pcm.len() % 2 != 0 {
        return Err(VoiceError::format(format!(
            "PCM16 payload has odd length {}",
            pcm.len()
        )));
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| VoiceError::format(format!("Failed to create WAV writer: {}", e)))?;
        for sample in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
                .map_err(|e| VoiceError::format(format!("Failed to write sample to WAV: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| VoiceError::format(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

/// Read a 16-bit WAV payload into an `AudioChunk`
pub fn wav_to_chunk(bytes: &[u8]) -> Result<AudioChunk> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| VoiceError::format(format!("Failed to open WAV payload: {}", e)))?;

    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(VoiceError::format(format!(
            "Expected 16-bit integer WAV, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| VoiceError::format(format!("Failed to read WAV samples: {}", e)))?;

    let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    Ok(AudioChunk::new(data, spec.sample_rate, spec.channels))
}
