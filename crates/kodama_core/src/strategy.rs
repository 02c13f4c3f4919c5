//! Per-turn response strategy derived from stage and recent mood.

use crate::stage::{stage_for_turn, Stage};
use crate::Message;
use serde::{Deserialize, Serialize};

const FATIGUE_MARKERS: &[&str] = &["疲れ", "大変", "tired", "exhausted", "worn out"];
const DREAM_MARKERS: &[&str] = &["夢", "なりたい", "dream", "want to be"];

/// How many trailing messages are checked for fatigue.
const RECENT_MOOD_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Cheerful,
    Concerned,
    Encouraging,
    Persistent,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Cheerful => "cheerful",
            Tone::Concerned => "concerned",
            Tone::Encouraging => "encouraging",
            Tone::Persistent => "persistent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStrategy {
    pub ask_about_dreams: bool,
    pub show_concern: bool,
    pub push_for_action: bool,
    pub tone: Tone,
}

impl ConversationStrategy {
    pub fn analyze(history: &[Message], turn_index: u32) -> Self {
        let stage = stage_for_turn(turn_index);

        let start = history.len().saturating_sub(RECENT_MOOD_WINDOW);
        let weary = history[start..]
            .iter()
            .any(|m| contains_any(&m.text, FATIGUE_MARKERS));
        let dreams_mentioned = history.iter().any(|m| contains_any(&m.text, DREAM_MARKERS));

        let tone = match stage {
            Stage::Action => Tone::Persistent,
            Stage::Realization => Tone::Encouraging,
            Stage::Empathy if weary => Tone::Concerned,
            Stage::Empathy => Tone::Cheerful,
        };

        Self {
            ask_about_dreams: stage == Stage::Empathy && !dreams_mentioned,
            show_concern: weary || stage == Stage::Empathy,
            push_for_action: stage == Stage::Action,
            tone,
        }
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    markers.iter().any(|m| lowered.contains(m))
}
