use thiserror::Error;

/// Conditions the dialogue engine distinguishes.
///
/// Only [`DialogueError::EmptyUtterance`] ever reaches a caller. The rest are
/// recovered where they occur: fallback text for provider failures, silent
/// discard for stale results and repeated utterances.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("user utterance is empty")]
    EmptyUtterance,

    #[error("{provider} failed: {reason}")]
    TransientProvider { provider: String, reason: String },

    #[error("{provider} did not answer within {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("result for turn {issued_for} arrived after the call moved to turn {current}")]
    StaleResult { issued_for: u32, current: u32 },

    #[error("utterance is already being spoken")]
    DuplicateUtterance,
}

impl DialogueError {
    pub fn transient(provider: &str, err: impl std::fmt::Display) -> Self {
        Self::TransientProvider {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether the session recovers from this condition without the caller noticing.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DialogueError::EmptyUtterance)
    }
}
