pub mod commitment;
pub mod config;
pub mod error;
pub mod greeting;
pub mod persona;
pub mod signal;
pub mod stage;
pub mod strategy;
pub mod traits;

pub use commitment::{has_commitment, is_commitment};
pub use config::KodamaConfig;
pub use error::DialogueError;
pub use persona::{Gender, Language, PersonaProfile, VoiceProfile};
pub use signal::{Mood, SignalExtractor, SignalProfile, Topic};
pub use stage::{stage_for_turn, Stage, StageTable};
pub use strategy::{ConversationStrategy, Tone};
pub use traits::{infer_traits, Trait};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    fn id_prefix(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

/// A course suggestion attached to an agent reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Category as written in the reply tag, e.g. "キャリア" or "habits".
    pub category: String,
    pub course: Option<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// One entry of the call transcript.
///
/// Messages are never edited after creation; the session only appends them.
/// `turn_index` is assigned by the session and is unique per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub turn_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    /// Unix timestamp (seconds)
    pub timestamp: i64,
}

impl Message {
    /// Create a message with a fresh id such as `user-<uuid>`.
    pub fn new(sender: Sender, text: impl Into<String>, turn_index: u32) -> Self {
        Self {
            id: format!("{}-{}", sender.id_prefix(), Uuid::new_v4()),
            sender,
            text: text.into(),
            turn_index,
            recommendation: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_recommendation(mut self, recommendation: Option<Recommendation>) -> Self {
        self.recommendation = recommendation;
        self
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique_and_prefixed() {
        let a = Message::new(Sender::User, "hi", 1);
        let b = Message::new(Sender::User, "hi", 1);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("user-"));
        assert!(Message::new(Sender::Agent, "yo", 2).id.starts_with("agent-"));
    }

    #[test]
    fn test_recommendation_skipped_when_absent() {
        let msg = Message::new(Sender::Agent, "hello", 1);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("recommendation"));
        assert!(json.contains("\"sender\":\"agent\""));
    }
}
