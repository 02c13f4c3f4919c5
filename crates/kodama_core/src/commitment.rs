//! Commitment detection: has the user agreed to a concrete action yet?

use crate::Message;

/// Fixed marker vocabulary. Matching is substring-based on lowercased text.
const COMMITMENT_MARKERS: &[&str] = &[
    "約束",
    "やる",
    "始める",
    "i promise",
    "promise you",
    "i pledge",
    "i will start",
    "i'll start",
    "i will do it",
    "i'll do it",
    "i commit",
    "starting tomorrow",
];

/// True when a user-authored message in `history` contains a commitment marker.
///
/// Agent messages are ignored: the persona asking for a promise is not a promise.
pub fn has_commitment(history: &[Message]) -> bool {
    history
        .iter()
        .filter(|m| m.is_user())
        .any(|m| is_commitment(&m.text))
}

/// True when `text` contains a commitment marker, regardless of who said it.
pub fn is_commitment(text: &str) -> bool {
    let lowered = text.to_lowercase();
    COMMITMENT_MARKERS.iter().any(|m| lowered.contains(m))
}
