use voice_coach::audio::codec;
use voice_coach::provider::{InboundMessage, OutboundFrame, ProviderEvent};

#[test]
fn test_media_frame_serialization() {
    let frame = OutboundFrame::media(codec::encode_to_transport(&[0.0, 0.5]));

    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"format\":\"pcm16@16kHz-mono\""));
    assert!(json.contains("\"endOfTurn\":false"));

    let deserialized: OutboundFrame = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, frame);
}

#[test]
fn test_end_of_turn_marker() {
    let frame = OutboundFrame::end_of_turn();

    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"endOfTurn\":true"));
    assert!(json.contains("\"bytes\":\"\""));
}

#[test]
fn test_inbound_events_follow_field_order() {
    let json = format!(
        r#"{{
            "error": "late failure",
            "turnComplete": true,
            "interrupted": true,
            "outputTranscriptFragment": "好的",
            "inputTranscriptFragment": "您好",
            "audioChunk": "{}"
        }}"#,
        codec::encode_bytes(&[0, 0, 1, 0])
    );

    let message: InboundMessage = serde_json::from_str(&json).unwrap();
    let events = message.into_events();

    assert_eq!(events.len(), 6);
    assert!(matches!(&events[0], ProviderEvent::Audio(chunk) if chunk.data == vec![0, 0, 1, 0]));
    assert_eq!(events[1], ProviderEvent::InputTranscript("您好".to_string()));
    assert_eq!(events[2], ProviderEvent::OutputTranscript("好的".to_string()));
    assert_eq!(events[3], ProviderEvent::Interrupted);
    assert_eq!(events[4], ProviderEvent::TurnComplete);
    assert_eq!(events[5], ProviderEvent::Error("late failure".to_string()));
}

#[test]
fn test_inbound_audio_is_24khz_mono() {
    let json = format!(r#"{{"audioChunk": "{}"}}"#, codec::encode_bytes(&[0u8; 96]));
    let message: InboundMessage = serde_json::from_str(&json).unwrap();

    match message.into_events().as_slice() {
        [ProviderEvent::Audio(chunk)] => {
            assert_eq!(chunk.sample_rate, 24000);
            assert_eq!(chunk.channels, 1);
            assert_eq!(chunk.duration_secs(), 0.002);
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn test_bad_audio_dropped_rest_delivered() {
    let json = r#"{"audioChunk": "%%%", "outputTranscriptFragment": "喂", "turnComplete": true}"#;
    let message: InboundMessage = serde_json::from_str(json).unwrap();
    let events = message.into_events();

    assert_eq!(
        events,
        vec![
            ProviderEvent::OutputTranscript("喂".to_string()),
            ProviderEvent::TurnComplete,
        ]
    );
}

#[test]
fn test_false_flags_produce_no_events() {
    let json = r#"{"interrupted": false, "turnComplete": false}"#;
    let message: InboundMessage = serde_json::from_str(json).unwrap();
    assert!(message.into_events().is_empty());
}
