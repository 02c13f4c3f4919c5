//! Opening lines for when the video call connects.

use crate::persona::{Language, PersonaProfile};
use rand::seq::SliceRandom;
use rand::Rng;

const REASONS_JA: &[&str] = &[
    "えへへ、ビデオ電話できるって知って、かけちゃった！",
    "顔見ながら話したくて、ビデオ通話にしてみた！",
    "テレビ電話ってやつ？やってみたくて！",
    "わあ！本当にビデオで繋がった！すごーい！",
    "初めてのビデオ通話！ドキドキする！",
];

const REASONS_EN: &[&str] = &[
    "Hehe, I found out we could video call, so I called!",
    "I wanted to see your face while we talk!",
    "Whoa! The video actually connected! So cool!",
    "My first video call ever! My heart's pounding!",
];

/// `{reason}` and `{pronoun}` are substituted.
const PATTERNS_JA: &[&str] = &[
    "{reason} ちゃんと見える？わあ、大人の{pronoun}の顔、はっきり見える！",
    "{reason} すごい！本当に顔見ながら話せるんだね！なんか不思議な感じ！",
    "{reason} 画面越しだけど、会えて嬉しい！今日はどんな一日だった？",
];

const PATTERNS_EN: &[&str] = &[
    "{reason} Can you see me? Wow, I can totally see grown-up me!",
    "{reason} We can really talk face to face! It feels so weird!",
    "{reason} It's through a screen, but I'm so happy to see you! How was your day?",
];

/// Pick a greeting for the first agent turn of a call.
pub fn opening_line<R: Rng + ?Sized>(persona: &PersonaProfile, rng: &mut R) -> String {
    let (reasons, patterns) = match persona.language {
        Language::Ja => (REASONS_JA, PATTERNS_JA),
        Language::En => (REASONS_EN, PATTERNS_EN),
    };
    let reason = reasons.choose(rng).copied().unwrap_or_default();
    let pattern = patterns.choose(rng).copied().unwrap_or("{reason}");
    pattern
        .replace("{reason}", reason)
        .replace("{pronoun}", &persona.pronoun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Gender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_placeholders_are_filled() {
        let persona = PersonaProfile::new(Gender::Female, Language::Ja);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let line = opening_line(&persona, &mut rng);
            assert!(!line.contains('{'), "unfilled placeholder in {line}");
            assert!(!line.contains("僕"));
        }
    }

    #[test]
    fn test_english_greeting() {
        let persona = PersonaProfile::new(Gender::Male, Language::En);
        let line = opening_line(&persona, &mut StdRng::seed_from_u64(1));
        assert!(line.is_ascii());
    }
}
