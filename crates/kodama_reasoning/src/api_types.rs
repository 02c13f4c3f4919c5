use kodama_core::{Message, Sender};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged turn as sent to a text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(msg: &Message) -> Self {
        match msg.sender {
            Sender::User => ChatTurn::user(msg.text.clone()),
            Sender::Agent => ChatTurn::assistant(msg.text.clone()),
        }
    }
}

// Response payload
#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some("stop".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_roles_follow_sender() {
        let user = Message::new(Sender::User, "I'm tired", 1);
        let agent = Message::new(Sender::Agent, "Are you okay?", 2);
        assert_eq!(ChatTurn::from(&user).role, Role::User);
        assert_eq!(ChatTurn::from(&agent).role, Role::Assistant);
        assert_eq!(ChatTurn::from(&agent).content, "Are you okay?");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
