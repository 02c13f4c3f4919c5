//! Playback sink: the only audio/video output the controller talks to.

use crate::tts::AudioClip;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Resolves when a clip finishes playing on its own.
///
/// Dropping the paired [`PlaybackDone`] without firing also resolves it, so a
/// sink that loses track of a clip cannot hang the controller.
#[derive(Debug)]
pub struct PlaybackHandle {
    done: oneshot::Receiver<()>,
}

/// Sink-side half of a [`PlaybackHandle`].
#[derive(Debug)]
pub struct PlaybackDone {
    tx: oneshot::Sender<()>,
}

impl PlaybackHandle {
    pub fn pair() -> (PlaybackDone, PlaybackHandle) {
        let (tx, done) = oneshot::channel();
        (PlaybackDone { tx }, PlaybackHandle { done })
    }

    /// Wait until the clip has ended.
    pub async fn finished(self) {
        let _ = self.done.await;
    }
}

impl PlaybackDone {
    /// Report that the clip reached its end.
    pub fn fire(self) {
        let _ = self.tx.send(());
    }
}

/// Audio and visual output for one call.
///
/// Control methods are synchronous and must return promptly.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Begin playing `clip`; the handle resolves when it ends naturally.
    async fn play_audio(&self, clip: AudioClip) -> Result<PlaybackHandle>;

    /// Stop the current clip immediately.
    fn stop_audio(&self);

    /// Start the looping clip from its first frame.
    fn start_video_loop(&self);

    /// Stop the looping clip and rewind it to the first frame.
    fn stop_video_loop(&self);

    /// Show the persona's still image.
    fn show_static_image(&self);
}
