//! End-to-end tests for VideoCall: session, speech and playback together.

use anyhow::Result;
use async_trait::async_trait;
use kodama_core::{Gender, Language, PersonaProfile, Sender, VoiceProfile};
use kodama_reasoning::api_types::{ChatTurn, Completion};
use kodama_reasoning::llm::{CompletionParams, LlmClient};
use kodama_reasoning::{DialogueSession, ReplyOutcome, VideoCall};
use kodama_voice::{
    AudioClip, MediaSyncController, OutputFormat, PlaybackDone, PlaybackHandle, PlaybackSink,
    PlaybackState, SpeakOutcome, TextToSpeech,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mocks
// ============================================================================

/// Echoes a numbered reply so every turn speaks different text.
struct EchoLlm {
    calls: AtomicUsize,
    /// Added to every call after the first.
    later_delay: Duration,
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn complete(
        &self,
        _directive: &str,
        turns: Vec<ChatTurn>,
        _params: CompletionParams,
    ) -> Result<Completion> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n > 1 && !self.later_delay.is_zero() {
            tokio::time::sleep(self.later_delay).await;
        }
        let last = turns.last().map(|t| t.content.clone()).unwrap_or_default();
        Ok(Completion::from_text(format!("reply {} to {}", n, last)))
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }
}

struct MockTts {
    fail: bool,
}

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, text: &str, _voice: &VoiceProfile) -> Result<AudioClip> {
        if self.fail {
            anyhow::bail!("speech provider down");
        }
        Ok(AudioClip::new(text.as_bytes().to_vec(), OutputFormat::Mp3))
    }

    fn provider_name(&self) -> &'static str {
        "mock-tts"
    }
}

#[derive(Default)]
struct SinkLog {
    plays: usize,
    stops: usize,
    video_position: u32,
    done: Option<PlaybackDone>,
}

#[derive(Clone, Default)]
struct MockSink {
    log: Arc<Mutex<SinkLog>>,
}

impl MockSink {
    fn finish(&self) {
        if let Some(done) = self.log.lock().unwrap().done.take() {
            done.fire();
        }
    }

    fn plays(&self) -> usize {
        self.log.lock().unwrap().plays
    }
}

#[async_trait]
impl PlaybackSink for MockSink {
    async fn play_audio(&self, _clip: AudioClip) -> Result<PlaybackHandle> {
        let (done, handle) = PlaybackHandle::pair();
        let mut log = self.log.lock().unwrap();
        log.plays += 1;
        log.done = Some(done);
        Ok(handle)
    }

    fn stop_audio(&self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.done = None;
    }

    fn start_video_loop(&self) {
        self.log.lock().unwrap().video_position = 1;
    }

    fn stop_video_loop(&self) {
        self.log.lock().unwrap().video_position = 0;
    }

    fn show_static_image(&self) {}
}

fn call(tts_fails: bool) -> (VideoCall, MockSink) {
    call_with_slow_replies(tts_fails, Duration::ZERO)
}

fn call_with_slow_replies(tts_fails: bool, later_delay: Duration) -> (VideoCall, MockSink) {
    let persona = PersonaProfile::new(Gender::Female, Language::En);
    let llm = Arc::new(EchoLlm {
        calls: AtomicUsize::new(0),
        later_delay,
    });
    let session = Arc::new(DialogueSession::new(llm, persona.clone()));
    let sink = MockSink::default();
    let media = Arc::new(MediaSyncController::new(
        Box::new(MockTts { fail: tts_fails }),
        Box::new(sink.clone()),
        persona.supports_video_loop,
    ));
    (VideoCall::new(session, media), sink)
}

async fn wait_until_playing(media: &MediaSyncController) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while media.state().await != PlaybackState::Playing {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("playback never started");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_greeting_is_first_turn_and_spoken_once() {
    let (call, sink) = call(false);
    let (greeting, speech) = call.greet("Hi grown-up me!").await;
    assert_eq!(greeting.turn_index, 1);
    assert_eq!(greeting.sender, Sender::Agent);

    wait_until_playing(call.media()).await;
    // the same line arriving from another path is suppressed
    assert_eq!(
        call.media().speak("Hi grown-up me!", &VoiceProfile::for_gender(Gender::Female)).await,
        SpeakOutcome::Duplicate
    );
    sink.finish();
    assert_eq!(speech.await.unwrap(), SpeakOutcome::Finished);
    assert_eq!(sink.plays(), 1);
}

#[tokio::test]
async fn test_open_uses_a_canned_greeting() {
    let (call, sink) = call(false);
    let (greeting, speech) = call.open().await;
    assert!(!greeting.text.is_empty());
    wait_until_playing(call.media()).await;
    sink.finish();
    assert_eq!(speech.await.unwrap(), SpeakOutcome::Finished);
}

#[tokio::test]
async fn test_submit_appends_reply_and_speaks_it() {
    let (call, sink) = call(false);
    let turn = call.submit("I'm so tired").await.unwrap();

    assert_eq!(turn.user.turn_index, 1);
    let ReplyOutcome::Reply(reply) = &turn.reply else {
        panic!("expected a reply");
    };
    assert_eq!(reply.text, "reply 1 to I'm so tired");
    assert_eq!(reply.turn_index, 2);

    wait_until_playing(call.media()).await;
    sink.finish();
    assert_eq!(turn.speech.unwrap().await.unwrap(), SpeakOutcome::Finished);
    assert_eq!(call.media().state().await, PlaybackState::Idle);
}

#[tokio::test]
async fn test_new_submission_barges_in() {
    let (call, sink) = call(false);
    let first = call.submit("first").await.unwrap();
    wait_until_playing(call.media()).await;

    let second = call.submit("wait, listen").await.unwrap();
    assert_eq!(sink.log.lock().unwrap().video_position, 0);
    assert_eq!(first.speech.unwrap().await.unwrap(), SpeakOutcome::Interrupted);

    wait_until_playing(call.media()).await;
    sink.finish();
    assert_eq!(second.speech.unwrap().await.unwrap(), SpeakOutcome::Finished);
    assert_eq!(sink.plays(), 2);
    assert_eq!(call.session().turn().await, 4);
}

#[tokio::test]
async fn test_reply_overtaken_before_speaking_is_never_played() {
    let (call, sink) = call_with_slow_replies(false, Duration::from_millis(300));
    let first = call.submit("first").await.unwrap();
    // no yield in between: the first reply's speech task has not run yet
    let second = call.submit("second").await.unwrap();

    assert_eq!(first.speech.unwrap().await.unwrap(), SpeakOutcome::Discarded);
    wait_until_playing(call.media()).await;
    assert_eq!(sink.plays(), 1);
    sink.finish();
    assert_eq!(second.speech.unwrap().await.unwrap(), SpeakOutcome::Finished);
    assert_eq!(sink.plays(), 1);
}

#[tokio::test]
async fn test_speech_failure_keeps_text_and_stays_idle() {
    let (call, sink) = call(true);
    let turn = call.submit("hello?").await.unwrap();

    let reply = turn.reply.message().cloned().unwrap();
    assert_eq!(reply.text, "reply 1 to hello?");
    assert_eq!(turn.speech.unwrap().await.unwrap(), SpeakOutcome::Skipped);
    assert_eq!(call.media().state().await, PlaybackState::Idle);
    assert_eq!(sink.plays(), 0);

    let history = call.session().history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].id, reply.id);
}

#[tokio::test]
async fn test_empty_submission_changes_nothing() {
    let (call, _sink) = call(false);
    assert!(call.submit("  ").await.is_err());
    assert_eq!(call.session().turn().await, 0);
}

#[tokio::test]
async fn test_end_stops_playback_and_returns_transcript() {
    let (call, sink) = call(false);
    let turn = call.submit("bye soon").await.unwrap();
    wait_until_playing(call.media()).await;

    let media = call.media().clone();
    let transcript = call.end().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(media.state().await, PlaybackState::Idle);
    assert_eq!(sink.log.lock().unwrap().stops, 1);
    assert_eq!(turn.speech.unwrap().await.unwrap(), SpeakOutcome::Interrupted);
}
