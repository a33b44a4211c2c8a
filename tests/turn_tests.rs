mod common;

use std::sync::atomic::Ordering;

use common::{customer_audio_ms, CannedScorer, ManualOutput};
use voice_coach::audio::{AudioChunk, PlaybackScheduler};
use voice_coach::practice::{PracticeConfig, Stage};
use voice_coach::provider::ProviderEvent;
use voice_coach::turn::{Role, TurnState, TurnStateMachine};

fn playback() -> PlaybackScheduler {
    let (output, _clock) = ManualOutput::new();
    PlaybackScheduler::new(Box::new(output), 24000, 1)
}

#[tokio::test]
async fn test_full_turn_produces_exactly_one_score() {
    let scorer = CannedScorer::default();
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig {
        stage: Stage::Explore,
        ..PracticeConfig::default()
    });

    machine.begin_listening();
    machine
        .process(
            ProviderEvent::InputTranscript("您好，请问有什么可以帮您？".into()),
            &mut playback,
            &scorer,
        )
        .await;
    machine.end_listening();

    let events = vec![
        ProviderEvent::Audio(AudioChunk::inbound(customer_audio_ms(120))),
        ProviderEvent::OutputTranscript("我上周买的".into()),
        ProviderEvent::Audio(AudioChunk::inbound(customer_audio_ms(120))),
        ProviderEvent::OutputTranscript("耳机坏了。".into()),
        ProviderEvent::TurnComplete,
    ];
    for event in events {
        machine.process(event, &mut playback, &scorer).await;
    }

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(machine.scores().len(), 1);
    assert!(machine.trainee_buffer().is_empty());
    assert!(machine.customer_buffer().is_empty());
    assert_eq!(machine.state(), TurnState::Idle);
    assert_eq!(playback.chunks_scheduled(), 2);

    let requests = scorer.requests.lock().unwrap();
    assert_eq!(requests[0].stage, Stage::Explore);
    assert_eq!(requests[0].trainee_text, "您好，请问有什么可以帮您？");
    assert_eq!(requests[0].customer_text, "我上周买的耳机坏了。");

    let messages = machine.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::Trainee);
    assert_eq!(messages[1].role, Role::Customer);
    assert_eq!(messages[1].text, "我上周买的耳机坏了。");
}

#[tokio::test]
async fn test_empty_trainee_buffer_skips_scoring() {
    let scorer = CannedScorer::default();
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.begin_listening();
    machine.end_listening();
    machine
        .process(ProviderEvent::OutputTranscript("喂？".into()), &mut playback, &scorer)
        .await;
    machine
        .process(ProviderEvent::TurnComplete, &mut playback, &scorer)
        .await;

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    assert!(machine.scores().is_empty());
    assert_eq!(machine.state(), TurnState::Idle);
    assert!(machine.customer_buffer().is_empty());
}

#[tokio::test]
async fn test_whitespace_only_text_skips_scoring() {
    let scorer = CannedScorer::default();
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    for event in [
        ProviderEvent::InputTranscript("   ".into()),
        ProviderEvent::OutputTranscript("好的".into()),
        ProviderEvent::TurnComplete,
    ] {
        machine.process(event, &mut playback, &scorer).await;
    }

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scoring_failure_appends_nothing() {
    let scorer = CannedScorer::default();
    scorer.fail.store(true, Ordering::SeqCst);
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    for event in [
        ProviderEvent::InputTranscript("您好".into()),
        ProviderEvent::OutputTranscript("你好".into()),
        ProviderEvent::TurnComplete,
    ] {
        machine.process(event, &mut playback, &scorer).await;
    }

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    assert!(machine.scores().is_empty());
    assert_eq!(machine.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_repeated_turn_complete_scores_once() {
    let scorer = CannedScorer::default();
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    for event in [
        ProviderEvent::InputTranscript("您好".into()),
        ProviderEvent::OutputTranscript("你好".into()),
        ProviderEvent::TurnComplete,
        ProviderEvent::TurnComplete,
    ] {
        machine.process(event, &mut playback, &scorer).await;
    }

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(machine.scores().len(), 1);
}

#[test]
fn test_buffers_captured_before_reset() {
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.handle(ProviderEvent::InputTranscript("第一轮".into()), &mut playback);
    machine.handle(ProviderEvent::OutputTranscript("回复".into()), &mut playback);
    let request = machine
        .handle(ProviderEvent::TurnComplete, &mut playback)
        .unwrap();

    // Next turn's fragments do not leak into the captured request
    machine.handle(ProviderEvent::InputTranscript("第二轮".into()), &mut playback);
    assert_eq!(request.trainee_text, "第一轮");
    assert_eq!(machine.trainee_buffer().text(), "第二轮");
    assert_eq!(machine.messages().len(), 3);
}

#[test]
fn test_interruption_stops_playback_without_state_change() {
    let (output, clock) = ManualOutput::new();
    let mut playback = PlaybackScheduler::new(Box::new(output), 24000, 1);
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.handle(
        ProviderEvent::Audio(AudioChunk::inbound(customer_audio_ms(300))),
        &mut playback,
    );
    assert_eq!(machine.state(), TurnState::Responding);

    machine.handle(ProviderEvent::Interrupted, &mut playback);
    assert_eq!(machine.state(), TurnState::Responding);
    assert_eq!(clock.lock().unwrap().stopped.len(), 1);
    assert_eq!(playback.next_free_slot(), 0.0);
}

#[test]
fn test_error_returns_to_idle_and_keeps_history() {
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.begin_listening();
    machine.handle(ProviderEvent::InputTranscript("您好".into()), &mut playback);
    machine.end_listening();
    assert!(machine.awaiting_reply());

    machine.handle(ProviderEvent::Error("quota exceeded".into()), &mut playback);
    assert_eq!(machine.state(), TurnState::Idle);
    assert!(!machine.awaiting_reply());
    assert_eq!(machine.messages().len(), 1);
}

#[test]
fn test_turn_complete_while_talking_over_customer() {
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.begin_listening();
    machine.handle(ProviderEvent::InputTranscript("您好".into()), &mut playback);
    machine.end_listening();
    machine.handle(ProviderEvent::OutputTranscript("我的订单".into()), &mut playback);

    // Trainee cuts in before the customer's turn completes
    machine.begin_listening();
    machine.handle(ProviderEvent::InputTranscript("稍等".into()), &mut playback);
    machine.handle(ProviderEvent::Interrupted, &mut playback);
    let request = machine
        .handle(ProviderEvent::TurnComplete, &mut playback)
        .unwrap();

    assert_eq!(request.trainee_text, "您好");
    assert_eq!(request.customer_text, "我的订单");
    assert_eq!(machine.state(), TurnState::Listening);
    assert!(!machine.awaiting_reply());
    assert!(machine.customer_buffer().is_empty());
    assert_eq!(machine.trainee_buffer().text(), "稍等");

    machine.end_listening();
    assert_eq!(machine.state(), TurnState::AwaitingResponse);
    machine.handle(ProviderEvent::OutputTranscript("好的".into()), &mut playback);
    let request = machine
        .handle(ProviderEvent::TurnComplete, &mut playback)
        .unwrap();
    assert_eq!(request.trainee_text, "稍等");
    assert_eq!(machine.state(), TurnState::Idle);

    let texts: Vec<&str> = machine.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["您好", "我的订单", "稍等", "好的"]);
}

#[test]
fn test_error_while_talking_keeps_listening() {
    let mut playback = playback();
    let mut machine = TurnStateMachine::new(PracticeConfig::default());

    machine.handle(ProviderEvent::OutputTranscript("喂".into()), &mut playback);
    machine.begin_listening();
    machine.handle(ProviderEvent::InputTranscript("您好".into()), &mut playback);
    machine.handle(ProviderEvent::Error("transient".into()), &mut playback);

    assert_eq!(machine.state(), TurnState::Listening);
    assert!(machine.customer_buffer().is_empty());
    assert_eq!(machine.trainee_buffer().text(), "您好");
    assert_eq!(machine.messages().len(), 2);
}
