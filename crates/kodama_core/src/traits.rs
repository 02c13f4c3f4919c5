//! Personality traits guessed from a signal profile.
//!
//! These feed the "cold reading" hint in directives: broad statements most
//! people recognise in themselves, picked to match the detected mood and topics.

use crate::persona::Language;
use crate::signal::{Mood, SignalProfile, Topic};
use serde::{Deserialize, Serialize};

/// Confidence above which a negative mood is read as over-responsibility.
const STRONG_SIGNAL: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Sensitive,
    Reflective,
    Responsible,
    Perfectionist,
    Diligent,
    Ambitious,
    Caring,
    Kind,
    Idealistic,
    ForwardLooking,
    Cautious,
    OverConsiderate,
}

impl Trait {
    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => match self {
                Trait::Sensitive => "emotionally sensitive",
                Trait::Reflective => "thinks things through deeply",
                Trait::Responsible => "strong sense of responsibility",
                Trait::Perfectionist => "a bit of a perfectionist",
                Trait::Diligent => "earnest and hard-working",
                Trait::Ambitious => "wants to keep growing",
                Trait::Caring => "values people",
                Trait::Kind => "kind-hearted",
                Trait::Idealistic => "holds onto ideals",
                Trait::ForwardLooking => "forward-looking",
                Trait::Cautious => "careful and thoughtful",
                Trait::OverConsiderate => "worries too much about others",
            },
            Language::Ja => match self {
                Trait::Sensitive => "感受性が豊か",
                Trait::Reflective => "物事を深く考える",
                Trait::Responsible => "責任感が強い",
                Trait::Perfectionist => "完璧主義的な面がある",
                Trait::Diligent => "真面目で努力家",
                Trait::Ambitious => "向上心がある",
                Trait::Caring => "人を大切にする",
                Trait::Kind => "優しい心を持っている",
                Trait::Idealistic => "理想を持っている",
                Trait::ForwardLooking => "前向きな姿勢",
                Trait::Cautious => "慎重で思慮深い",
                Trait::OverConsiderate => "他人のことを考えすぎる傾向",
            },
        }
    }
}

pub fn infer_traits(profile: &SignalProfile) -> Vec<Trait> {
    let mut traits = Vec::new();

    if profile.mood == Mood::Mixed {
        traits.extend([Trait::Sensitive, Trait::Reflective]);
    }
    if profile.mood == Mood::Negative && profile.confidence > STRONG_SIGNAL {
        traits.extend([Trait::Responsible, Trait::Perfectionist]);
    }
    if profile.mentions(Topic::Work) {
        traits.extend([Trait::Diligent, Trait::Ambitious]);
    }
    if profile.mentions(Topic::Relationships) {
        traits.extend([Trait::Caring, Trait::Kind]);
    }
    if profile.mentions(Topic::Dreams) {
        traits.extend([Trait::Idealistic, Trait::ForwardLooking]);
    }
    if !profile.concerns.is_empty() {
        traits.extend([Trait::Cautious, Trait::OverConsiderate]);
    }

    traits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_profile_has_no_traits() {
        assert!(infer_traits(&SignalProfile::default()).is_empty());
    }

    #[test]
    fn test_weak_negative_signal_is_ignored() {
        let profile = SignalProfile {
            mood: Mood::Negative,
            confidence: 0.2,
            ..Default::default()
        };
        assert!(!infer_traits(&profile).contains(&Trait::Perfectionist));
    }

    #[test]
    fn test_strong_negative_signal() {
        let profile = SignalProfile {
            mood: Mood::Negative,
            confidence: 0.8,
            ..Default::default()
        };
        let traits = infer_traits(&profile);
        assert_eq!(traits, vec![Trait::Responsible, Trait::Perfectionist]);
    }

    #[test]
    fn test_topics_and_concerns() {
        let mut profile = SignalProfile::default();
        profile.topics.insert(Topic::Work);
        profile.concerns.push("my boss".into());
        let traits = infer_traits(&profile);
        assert!(traits.contains(&Trait::Diligent));
        assert!(traits.contains(&Trait::OverConsiderate));
        assert!(!traits.contains(&Trait::Idealistic));
    }

    #[test]
    fn test_labels_are_localised() {
        assert_eq!(Trait::Kind.label(Language::Ja), "優しい心を持っている");
        assert_eq!(Trait::Kind.label(Language::En), "kind-hearted");
    }
}
