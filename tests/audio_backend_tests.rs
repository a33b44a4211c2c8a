// Tests for the audio device abstractions and the capture pipeline.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::CountingMicrophone;
use tokio::sync::mpsc;
use voice_coach::audio::{
    codec, AudioBackendConfig, AudioBackendFactory, AudioChunk, AudioFrame, CapturePipeline,
};

#[test]
fn test_audio_frame_clone() {
    let frame = AudioFrame {
        samples: vec![0.1, -0.2, 0.3],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 500,
    };

    let cloned = frame.clone();

    assert_eq!(frame.samples, cloned.samples);
    assert_eq!(frame.sample_rate, cloned.sample_rate);
    assert_eq!(frame.timestamp_ms, cloned.timestamp_ms);
}

#[test]
fn test_audio_backend_config_default() {
    let config = AudioBackendConfig::default();

    assert_eq!(config.capture_sample_rate, 16000);
    assert_eq!(config.playback_sample_rate, 24000);
    assert_eq!(config.channels, 1);
    assert_eq!(config.capture_block_frames, 4096);
    assert!(config.input_device.is_none());
}

#[test]
fn test_chunk_duration() {
    let chunk = AudioChunk::inbound(vec![0u8; 48000]);
    assert_eq!(chunk.duration_secs(), 1.0);

    let stereo = AudioChunk::new(vec![0u8; 64000], 16000, 2);
    assert_eq!(stereo.duration_secs(), 1.0);
}

#[cfg(not(feature = "cpal-audio"))]
#[test]
fn test_factory_without_devices_is_device_error() {
    let config = AudioBackendConfig::default();

    assert!(matches!(
        AudioBackendFactory::microphone(&config),
        Err(voice_coach::VoiceError::Device { .. })
    ));
    assert!(matches!(
        AudioBackendFactory::output(&config),
        Err(voice_coach::VoiceError::Device { .. })
    ));
}

#[tokio::test]
async fn test_capture_encodes_blocks_for_provider() {
    let (microphone, mic) = CountingMicrophone::new();
    let mut capture = CapturePipeline::new(Box::new(microphone));
    let (tx, mut rx) = mpsc::channel(8);

    capture.start(tx).await.unwrap();
    assert!(capture.is_capturing());
    assert!(mic.capture(vec![1.0, -1.0, 0.0]));

    let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(!frame.end_of_turn);
    assert_eq!(
        codec::decode_from_transport(&frame.media.bytes).unwrap(),
        vec![0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00]
    );

    capture.stop().await.unwrap();
    assert!(!capture.is_capturing());
    assert_eq!(mic.current.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_restart_releases_previous_chain() {
    let (microphone, mic) = CountingMicrophone::new();
    let mut capture = CapturePipeline::new(Box::new(microphone));

    for _ in 0..3 {
        let (tx, _rx) = mpsc::channel(8);
        capture.start(tx).await.unwrap();
    }

    assert_eq!(mic.acquisitions.load(Ordering::SeqCst), 3);
    assert_eq!(mic.max_concurrent.load(Ordering::SeqCst), 1);

    capture.stop().await.unwrap();
    capture.stop().await.unwrap();
    assert_eq!(mic.releases.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_denied_microphone_is_reported() {
    let (microphone, mic) = CountingMicrophone::new();
    mic.deny.store(true, Ordering::SeqCst);
    let mut capture = CapturePipeline::new(Box::new(microphone));
    let (tx, _rx) = mpsc::channel(8);

    let result = capture.start(tx).await;
    assert!(matches!(result, Err(voice_coach::VoiceError::Device { .. })));
    assert!(!capture.is_capturing());
    assert_eq!(mic.acquisitions.load(Ordering::SeqCst), 0);
}
