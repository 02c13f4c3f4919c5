//! Property-based tests for directive assembly and recommendation tags.
//!
//! Directive selection must be a pure function of persona, history and turn,
//! and tag stripping must never leave a tag behind.

use kodama_core::{has_commitment, Gender, Language, Message, PersonaProfile, Sender, Stage};
use kodama_reasoning::recommend::{CatalogRecommender, Recommender};
use kodama_reasoning::PromptAssembler;
use proptest::prelude::*;

fn arb_sender() -> impl Strategy<Value = Sender> {
    prop_oneof![Just(Sender::User), Just(Sender::Agent)]
}

/// Short lines mixing plain words with a few marker words.
fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,30}",
        Just("I promise".to_string()),
        Just("I want to be an astronaut".to_string()),
        Just("仕事が心配".to_string()),
        Just("約束する".to_string()),
        Just("疲れた".to_string()),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec((arb_sender(), arb_line()), 0..12).prop_map(|lines| {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, (sender, text))| Message::new(sender, text, i as u32 + 1))
            .collect()
    })
}

fn arb_persona() -> impl Strategy<Value = PersonaProfile> {
    (
        prop_oneof![Just(Gender::Male), Just(Gender::Female)],
        prop_oneof![Just(Language::Ja), Just(Language::En)],
    )
        .prop_map(|(g, l)| PersonaProfile::new(g, l))
}

// ============================================================================
// Directive Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Same inputs, same directive.
    #[test]
    fn directive_is_deterministic(
        persona in arb_persona(),
        history in arb_history(),
        turn in 0u32..30,
    ) {
        let assembler = PromptAssembler::default().with_recommendations(true);
        let a = assembler.assemble(&persona, &history, turn);
        let b = assembler.assemble(&persona, &history, turn);
        prop_assert_eq!(a, b);
    }

    /// Commitment extraction is chosen exactly in the action stage without a user promise.
    #[test]
    fn commitment_directive_selection(
        persona in arb_persona(),
        history in arb_history(),
        turn in 0u32..30,
    ) {
        let d = PromptAssembler::default().assemble(&persona, &history, turn);
        let expected = d.stage == Stage::Action && !has_commitment(&history);
        prop_assert_eq!(d.commitment_pending, expected);
    }

    /// The persona pronoun always reaches the directive.
    #[test]
    fn directive_mentions_pronoun(
        persona in arb_persona(),
        history in arb_history(),
        turn in 0u32..30,
    ) {
        let d = PromptAssembler::default().assemble(&persona, &history, turn);
        prop_assert!(d.text.contains(&persona.pronoun));
    }
}

// ============================================================================
// Recommendation Tag Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn extracted_text_has_no_tag(prefix in "\\PC{0,80}", category in "[a-z]{1,12}", suffix in "\\PC{0,40}") {
        let r = CatalogRecommender::with_seed(0);
        let raw = format!("{} [RECOMMEND: {}] {}", prefix, category, suffix);
        let out = r.extract(&raw);
        prop_assert!(!out.text.contains("[RECOMMEND:"));
    }

    #[test]
    fn extract_never_panics(s in "\\PC{0,300}") {
        let _ = CatalogRecommender::with_seed(0).extract(&s);
    }
}
