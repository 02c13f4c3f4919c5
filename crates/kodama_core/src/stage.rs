//! Conversation stages keyed by turn index.
//!
//! The stage is never stored independently: callers resolve it from the
//! current turn through [`stage_for_turn`].

use serde::{Deserialize, Serialize};

/// The three phases of a call, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Empathy,
    Realization,
    Action,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Empathy => "empathy",
            Stage::Realization => "realization",
            Stage::Action => "action",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First turn of each later stage. Everything before `realization_from`
/// is Empathy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTable {
    pub realization_from: u32,
    pub action_from: u32,
}

impl StageTable {
    /// `≤ 6 → Empathy`, `7–8 → Realization`, `≥ 9 → Action`.
    pub const CANONICAL: StageTable = StageTable {
        realization_from: 7,
        action_from: 9,
    };

    pub const fn stage(&self, turn_index: u32) -> Stage {
        if turn_index >= self.action_from {
            Stage::Action
        } else if turn_index >= self.realization_from {
            Stage::Realization
        } else {
            Stage::Empathy
        }
    }
}

/// Resolve the stage for a turn using the canonical table.
pub const fn stage_for_turn(turn_index: u32) -> Stage {
    StageTable::CANONICAL.stage(turn_index)
}
