//! A video call: the dialogue session and the persona's voice and video.

use crate::session::{DialogueSession, ReplyOutcome};
use kodama_core::greeting::opening_line;
use kodama_core::{DialogueError, Message};
use kodama_voice::{MediaSyncController, PlaybackState, SpeakOutcome};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything one user submission produced.
#[derive(Debug)]
pub struct CallTurn {
    pub user: Message,
    pub reply: ReplyOutcome,
    /// Resolves when the reply has finished (or stopped) playing.
    pub speech: Option<JoinHandle<SpeakOutcome>>,
}

pub struct VideoCall {
    session: Arc<DialogueSession>,
    media: Arc<MediaSyncController>,
}

impl VideoCall {
    pub fn new(session: Arc<DialogueSession>, media: Arc<MediaSyncController>) -> Self {
        Self { session, media }
    }

    pub fn session(&self) -> &Arc<DialogueSession> {
        &self.session
    }

    pub fn media(&self) -> &Arc<MediaSyncController> {
        &self.media
    }

    /// Greet the user as the call connects.
    pub async fn open(&self) -> (Message, JoinHandle<SpeakOutcome>) {
        let line = opening_line(self.session.persona(), &mut rand::thread_rng());
        self.greet(&line).await
    }

    /// Commit `line` as the first persona turn and speak it.
    pub async fn greet(&self, line: &str) -> (Message, JoinHandle<SpeakOutcome>) {
        let message = self.session.append_agent_turn(line).await;
        tracing::info!(turn = message.turn_index, "Call opened");
        let speech = self.speak(&message).await;
        (message, speech)
    }

    /// Handle one user utterance: cut off the persona, record the turn,
    /// get a reply and start speaking it.
    pub async fn submit(&self, text: &str) -> Result<CallTurn, DialogueError> {
        let user = self.session.append_user_turn(text).await?;
        if self.media.interrupt().await == PlaybackState::Stopped {
            tracing::debug!(turn = user.turn_index, "Barge-in stopped playback");
        }

        let reply = self.session.request_reply().await;
        let speech = match reply.message() {
            Some(message) => Some(self.speak(message).await),
            None => None,
        };
        Ok(CallTurn {
            user,
            reply,
            speech,
        })
    }

    /// Hang up. Playback stops and the transcript is returned.
    pub async fn end(self) -> Vec<Message> {
        self.media.interrupt().await;
        let history = self.session.history().await;
        tracing::info!(turns = self.session.turn().await, "Call ended");
        history
    }

    /// The utterance is accepted before the task is spawned, so a barge-in
    /// that lands before the task runs still cancels it.
    async fn speak(&self, message: &Message) -> JoinHandle<SpeakOutcome> {
        let accepted = self.media.accept(&message.text).await;
        let media = self.media.clone();
        let voice = self.session.persona().voice.clone();
        tokio::spawn(async move {
            match accepted {
                Ok(utterance) => media.perform(utterance, &voice).await,
                Err(outcome) => outcome,
            }
        })
    }
}
