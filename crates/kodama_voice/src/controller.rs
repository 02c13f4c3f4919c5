//! Speech and looping-video playback driven as one unit.
//!
//! At most one utterance is active at a time. Every accepted utterance gets
//! a fresh epoch; interrupting or superseding it bumps the epoch, and any
//! work that finishes under an old epoch is dropped on the floor.

use crate::sink::PlaybackSink;
use crate::tts::TextToSpeech;
use kodama_core::{DialogueError, VoiceProfile};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch, Mutex};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Stopped,
}

/// What became of one `speak` call. None of these are errors for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Audio ran to its end.
    Finished,
    /// Stopped early by `interrupt()` or by a newer utterance.
    Interrupted,
    /// Same text as the utterance already in flight.
    Duplicate,
    /// Synthesis or playback failed; nothing was played.
    Skipped,
    /// Audio arrived after the utterance had been cancelled.
    Discarded,
}

struct Inner {
    state: PlaybackState,
    last_spoken_text: Option<String>,
    last_speak_at: Option<Instant>,
    /// Accepted but not yet playing.
    fetching: bool,
    epoch: u64,
}

/// An utterance that owns the output until it ends or is cancelled.
#[derive(Debug)]
pub struct Utterance {
    text: String,
    epoch: u64,
}

impl Utterance {
    pub fn text(&self) -> &str {
        &self.text
    }
}

pub struct MediaSyncController {
    tts: Box<dyn TextToSpeech>,
    sink: Box<dyn PlaybackSink>,
    video_loop: bool,
    fetch_timeout: Duration,
    inner: Mutex<Inner>,
    epoch_tx: watch::Sender<u64>,
    events: broadcast::Sender<PlaybackState>,
}

impl MediaSyncController {
    /// `video_loop` comes from `PersonaProfile::supports_video_loop`.
    pub fn new(tts: Box<dyn TextToSpeech>, sink: Box<dyn PlaybackSink>, video_loop: bool) -> Self {
        let (epoch_tx, _) = watch::channel(0);
        let (events, _) = broadcast::channel(32);
        Self {
            tts,
            sink,
            video_loop,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            inner: Mutex::new(Inner {
                state: PlaybackState::Idle,
                last_spoken_text: None,
                last_speak_at: None,
                fetching: false,
                epoch: 0,
            }),
            epoch_tx,
            events,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Observe state transitions (`Playing`, `Stopped`, `Idle`).
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackState> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> PlaybackState {
        self.inner.lock().await.state
    }

    /// True while an utterance is being synthesized or played.
    pub async fn is_busy(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.fetching || inner.state == PlaybackState::Playing
    }

    /// Speak `text`, returning once playback ends, is cut off, or is abandoned.
    ///
    /// Repeating the utterance that is already in flight is a no-op. Any
    /// other text replaces the current utterance.
    pub async fn speak(&self, text: &str, voice: &VoiceProfile) -> SpeakOutcome {
        match self.accept(text).await {
            Ok(utterance) => self.perform(utterance, voice).await,
            Err(outcome) => outcome,
        }
    }

    /// Claim the output for `text` without waiting on synthesis.
    ///
    /// From here on the utterance counts as in flight: `interrupt()` or a
    /// newer utterance cancels it even if `perform` has not started yet.
    /// `Err` carries the outcome when there is nothing to play.
    pub async fn accept(&self, text: &str) -> Result<Utterance, SpeakOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeakOutcome::Skipped);
        }

        let mut inner = self.inner.lock().await;
        if inner.last_spoken_text.as_deref() == Some(text) {
            tracing::debug!("{}, skipping", DialogueError::DuplicateUtterance);
            return Err(SpeakOutcome::Duplicate);
        }
        if self.halt(&mut inner) {
            tracing::debug!("Superseding current utterance");
        }
        inner.epoch += 1;
        inner.last_spoken_text = Some(text.to_string());
        inner.last_speak_at = Some(Instant::now());
        inner.fetching = true;
        self.epoch_tx.send_replace(inner.epoch);
        Ok(Utterance {
            text: text.to_string(),
            epoch: inner.epoch,
        })
    }

    /// Synthesize and play an accepted utterance.
    pub async fn perform(&self, utterance: Utterance, voice: &VoiceProfile) -> SpeakOutcome {
        let Utterance { text, epoch } = utterance;
        let mut epoch_rx = self.epoch_tx.subscribe();
        if self.inner.lock().await.epoch != epoch {
            tracing::debug!("Utterance cancelled before synthesis");
            return SpeakOutcome::Discarded;
        }

        let fetched = tokio::time::timeout(self.fetch_timeout, self.tts.synthesize(&text, voice)).await;
        let clip = match fetched {
            Ok(Ok(clip)) => clip,
            Ok(Err(e)) => {
                return self
                    .abandon(epoch, DialogueError::transient(self.tts.provider_name(), e))
                    .await
            }
            Err(_) => {
                let err = DialogueError::Timeout {
                    provider: self.tts.provider_name().to_string(),
                    secs: self.fetch_timeout.as_secs(),
                };
                return self.abandon(epoch, err).await;
            }
        };

        {
            let inner = self.inner.lock().await;
            if inner.epoch != epoch {
                tracing::debug!("Discarding synthesized audio for a cancelled utterance");
                return SpeakOutcome::Discarded;
            }
            if let Some(at) = inner.last_speak_at {
                tracing::debug!(elapsed = ?at.elapsed(), bytes = clip.bytes.len(), "Speech ready");
            }
        }

        // Audio and visuals start back to back; no ordering delay between them.
        let handle = match self.sink.play_audio(clip).await {
            Ok(handle) => handle,
            Err(e) => return self.abandon(epoch, DialogueError::transient("playback", e)).await,
        };
        self.start_visual();

        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                // cancelled while the sink was starting up
                self.sink.stop_audio();
                self.stop_visual();
                return SpeakOutcome::Interrupted;
            }
            inner.fetching = false;
            self.transition(&mut inner, PlaybackState::Playing);
        }

        tokio::select! {
            _ = handle.finished() => {}
            _ = cancelled(&mut epoch_rx, epoch) => return SpeakOutcome::Interrupted,
        }

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return SpeakOutcome::Interrupted;
        }
        self.stop_visual();
        inner.last_spoken_text = None;
        self.transition(&mut inner, PlaybackState::Stopped);
        self.transition(&mut inner, PlaybackState::Idle);
        SpeakOutcome::Finished
    }

    /// Barge-in: cut off whatever is playing or being fetched.
    ///
    /// Returns `Stopped` if audio was playing, otherwise `Idle`.
    pub async fn interrupt(&self) -> PlaybackState {
        let mut inner = self.inner.lock().await;
        let was_playing = inner.state == PlaybackState::Playing;
        if self.halt(&mut inner) {
            tracing::debug!(was_playing, "Playback interrupted");
        }
        if was_playing {
            PlaybackState::Stopped
        } else {
            PlaybackState::Idle
        }
    }

    /// Stop the active utterance, if any. Returns whether there was one.
    fn halt(&self, inner: &mut Inner) -> bool {
        let playing = inner.state == PlaybackState::Playing;
        if !playing && !inner.fetching {
            return false;
        }
        inner.epoch += 1;
        self.epoch_tx.send_replace(inner.epoch);
        inner.fetching = false;
        inner.last_spoken_text = None;
        if playing {
            self.sink.stop_audio();
            self.stop_visual();
            self.transition(inner, PlaybackState::Stopped);
            self.transition(inner, PlaybackState::Idle);
        }
        true
    }

    async fn abandon(&self, epoch: u64, err: DialogueError) -> SpeakOutcome {
        tracing::warn!("Speech skipped: {}", err);
        let mut inner = self.inner.lock().await;
        if inner.epoch == epoch {
            inner.fetching = false;
            inner.last_spoken_text = None;
        }
        SpeakOutcome::Skipped
    }

    fn start_visual(&self) {
        if self.video_loop {
            self.sink.start_video_loop();
        } else {
            self.sink.show_static_image();
        }
    }

    fn stop_visual(&self) {
        if self.video_loop {
            self.sink.stop_video_loop();
        }
    }

    fn transition(&self, inner: &mut Inner, next: PlaybackState) {
        tracing::debug!(from = ?inner.state, to = ?next, "Playback transition");
        inner.state = next;
        let _ = self.events.send(next);
    }
}

/// Resolves once the controller has moved past `epoch`.
async fn cancelled(rx: &mut watch::Receiver<u64>, epoch: u64) {
    loop {
        if *rx.borrow_and_update() != epoch {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
