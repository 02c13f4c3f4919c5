//! Mock LLM provider: scripted child-persona replies for running without API keys.

use crate::api_types::{ChatTurn, Completion, Role};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use kodama_core::{is_commitment, Language};
use std::time::Duration;

const REPLIES_JA: &[&str] = &[
    "そうなんだ！大人の毎日って大変そうだね。大丈夫？疲れてない？",
    "ねえねえ、昔の夢って覚えてる？あの頃はなんでもできる気がしてたよね！",
    "本当はどうしたいの？難しく考えすぎじゃない？",
    "今からでもできるよ！小さいことから始めてみようよ！",
    "ねえ、約束してくれる？明日から毎日5分だけやってみて！",
];

const REPLIES_EN: &[&str] = &[
    "Really? Being a grown-up sounds hard. Are you okay? Not too tired?",
    "Hey, do you remember what we wanted to be? Back then we could do anything!",
    "What do you really want to do? Aren't you overthinking it?",
    "You can still do it! Let's start with something tiny!",
    "Hey, will you promise me? Just five minutes a day, starting tomorrow!",
];

const PROMISE_KEPT_JA: &str = "やったー！約束だよ！指切りげんまん！ずっと見てるからね！[RECOMMEND: 習慣]";
const PROMISE_KEPT_EN: &str =
    "Yay! It's a promise! Pinky swear! I'll be watching, okay? [RECOMMEND: habits]";

#[derive(Debug, Clone)]
pub struct MockProvider {
    language: Language,
    latency: Duration,
}

impl MockProvider {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            latency: Duration::from_millis(200),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn reply_for(&self, turns: &[ChatTurn]) -> &'static str {
        let (replies, promise_kept) = match self.language {
            Language::Ja => (REPLIES_JA, PROMISE_KEPT_JA),
            Language::En => (REPLIES_EN, PROMISE_KEPT_EN),
        };
        let user_turns: Vec<&ChatTurn> = turns.iter().filter(|t| t.role == Role::User).collect();
        if user_turns.last().is_some_and(|t| is_commitment(&t.content)) {
            return promise_kept;
        }
        let idx = user_turns.len().saturating_sub(1).min(replies.len() - 1);
        replies[idx]
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _directive: &str,
        turns: Vec<ChatTurn>,
        _params: CompletionParams,
    ) -> Result<Completion> {
        tokio::time::sleep(self.latency).await;
        Ok(Completion::from_text(self.reply_for(&turns)))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(language: Language) -> MockProvider {
        MockProvider::new(language).with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_replies_advance_with_user_turns() {
        let provider = provider(Language::En);
        let first = provider
            .complete("d", vec![ChatTurn::user("hi")], CompletionParams::default())
            .await
            .unwrap();
        let second = provider
            .complete(
                "d",
                vec![
                    ChatTurn::user("hi"),
                    ChatTurn::assistant(first.text.clone()),
                    ChatTurn::user("I'm okay"),
                ],
                CompletionParams::default(),
            )
            .await
            .unwrap();
        assert_ne!(first.text, second.text);
    }

    #[tokio::test]
    async fn test_long_calls_stay_on_last_reply() {
        let provider = provider(Language::Ja);
        let turns: Vec<ChatTurn> = (0..20).map(|i| ChatTurn::user(format!("{}", i))).collect();
        let reply = provider
            .complete("d", turns, CompletionParams::default())
            .await
            .unwrap();
        assert_eq!(reply.text, REPLIES_JA[REPLIES_JA.len() - 1]);
    }

    #[tokio::test]
    async fn test_promise_gets_recommendation_tag() {
        let provider = provider(Language::Ja);
        let reply = provider
            .complete(
                "d",
                vec![ChatTurn::user("わかった、約束する")],
                CompletionParams::default(),
            )
            .await
            .unwrap();
        assert!(reply.text.contains("[RECOMMEND: 習慣]"));
    }
}
