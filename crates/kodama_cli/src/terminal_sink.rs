//! Playback sink for the terminal: logs what a screen would show and
//! times each clip by its duration hint.

use anyhow::Result;
use async_trait::async_trait;
use kodama_voice::{AudioClip, PlaybackHandle, PlaybackSink};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Used when a provider cannot say how long its audio is.
const DEFAULT_CLIP_LENGTH: Duration = Duration::from_millis(1500);

#[derive(Default)]
pub struct TerminalSink {
    clip_timer: Mutex<Option<JoinHandle<()>>>,
}

impl TerminalSink {
    fn replace_timer(&self, timer: Option<JoinHandle<()>>) {
        let previous = match self.clip_timer.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, timer),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), timer),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

#[async_trait]
impl PlaybackSink for TerminalSink {
    async fn play_audio(&self, clip: AudioClip) -> Result<PlaybackHandle> {
        let length = clip.duration_hint.unwrap_or(DEFAULT_CLIP_LENGTH);
        tracing::debug!(
            format = clip.format.mime_type(),
            bytes = clip.bytes.len(),
            ?length,
            "Playing clip"
        );
        let (done, handle) = PlaybackHandle::pair();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(length).await;
            done.fire();
        });
        self.replace_timer(Some(timer));
        Ok(handle)
    }

    fn stop_audio(&self) {
        tracing::debug!("Audio stopped");
        self.replace_timer(None);
    }

    fn start_video_loop(&self) {
        tracing::debug!("Video loop started");
    }

    fn stop_video_loop(&self) {
        tracing::debug!("Video loop stopped and rewound");
    }

    fn show_static_image(&self) {
        tracing::debug!("Showing still image");
    }
}
