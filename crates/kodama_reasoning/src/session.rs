//! One call's transcript, turn counter and stage.
//!
//! The turn counter has a single writer, [`SessionState::increment_and_get`],
//! which also refreshes the cached stage. Every appended message takes the
//! value it returns, so turn indices are gap-free and strictly increasing.
//!
//! A reply request remembers the turn it was issued for. If anything was
//! appended while the provider was working, the reply is dropped instead of
//! being committed out of order.

use crate::api_types::ChatTurn;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::{Directive, PromptAssembler};
use crate::recommend::{CatalogRecommender, Recommender};
use kodama_core::{
    stage_for_turn, DialogueError, KodamaConfig, Language, Message, PersonaProfile,
    Recommendation, Sender, SignalExtractor, Stage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(20);

const FALLBACK_JA: &str = "あれ？ちょっと聞こえなかった。もう一回言って？";
const FALLBACK_EN: &str = "I didn't quite catch that, say it again?";

/// Line committed in place of a reply the provider failed to give.
pub fn fallback_text(lang: Language) -> &'static str {
    match lang {
        Language::Ja => FALLBACK_JA,
        Language::En => FALLBACK_EN,
    }
}

/// Result of [`DialogueSession::request_reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Provider text was committed.
    Reply(Message),
    /// Provider failed or timed out; the fallback line was committed.
    Fallback(Message),
    /// The call moved on while the provider was working; nothing was committed.
    Stale { issued_for: u32, current: u32 },
}

impl ReplyOutcome {
    /// The committed message, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            ReplyOutcome::Reply(m) | ReplyOutcome::Fallback(m) => Some(m),
            ReplyOutcome::Stale { .. } => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, ReplyOutcome::Stale { .. })
    }
}

struct SessionState {
    history: Vec<Message>,
    turn_counter: u32,
    stage: Stage,
}

impl SessionState {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            turn_counter: 0,
            stage: stage_for_turn(0),
        }
    }

    fn increment_and_get(&mut self) -> u32 {
        self.turn_counter += 1;
        self.stage = stage_for_turn(self.turn_counter);
        self.turn_counter
    }

    fn append(
        &mut self,
        sender: Sender,
        text: String,
        recommendation: Option<Recommendation>,
    ) -> Message {
        let turn = self.increment_and_get();
        let message = Message::new(sender, text, turn).with_recommendation(recommendation);
        self.history.push(message.clone());
        message
    }

    fn contains(&self, id: &str) -> bool {
        self.history.iter().any(|m| m.id == id)
    }
}

pub struct DialogueSession {
    llm: Arc<dyn LlmClient>,
    recommender: Option<Box<dyn Recommender>>,
    assembler: PromptAssembler,
    persona: PersonaProfile,
    params: CompletionParams,
    reply_timeout: Duration,
    state: Mutex<SessionState>,
}

impl DialogueSession {
    pub fn new(llm: Arc<dyn LlmClient>, persona: PersonaProfile) -> Self {
        Self {
            llm,
            recommender: None,
            assembler: PromptAssembler::default(),
            persona,
            params: CompletionParams::default(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Session wired from the `[llm]`, `[persona]` and `[dialogue]` sections.
    pub fn from_config(llm: Arc<dyn LlmClient>, config: &KodamaConfig) -> Self {
        let dialogue = &config.dialogue;
        let assembler = PromptAssembler::new(
            SignalExtractor::new(dialogue.signal_window),
            dialogue.history_excerpt,
        )
        .with_recommendations(dialogue.recommendations);

        let mut session = Self::new(llm, config.persona.profile())
            .with_assembler(assembler)
            .with_params(CompletionParams {
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
            })
            .with_reply_timeout(Duration::from_secs(config.llm.timeout_secs));
        if dialogue.recommendations {
            session = session.with_recommender(Box::new(CatalogRecommender::default()));
        }
        session
    }

    pub fn with_recommender(mut self, recommender: Box<dyn Recommender>) -> Self {
        self.recommender = Some(recommender);
        self
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn persona(&self) -> &PersonaProfile {
        &self.persona
    }

    /// Snapshot of the transcript in causal order.
    pub async fn history(&self) -> Vec<Message> {
        self.state.lock().await.history.clone()
    }

    pub async fn turn(&self) -> u32 {
        self.state.lock().await.turn_counter
    }

    pub async fn stage(&self) -> Stage {
        self.state.lock().await.stage
    }

    /// The directive the next reply would be generated with.
    pub async fn directive(&self) -> Directive {
        let state = self.state.lock().await;
        self.assembler
            .assemble(&self.persona, &state.history, state.turn_counter)
    }

    /// Record what the user just said.
    pub async fn append_user_turn(&self, text: &str) -> Result<Message, DialogueError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DialogueError::EmptyUtterance);
        }
        let mut state = self.state.lock().await;
        let message = state.append(Sender::User, text.to_string(), None);
        tracing::debug!(turn = message.turn_index, stage = %state.stage, "User turn appended");
        Ok(message)
    }

    /// Record a persona line that did not come from a reply request, such as
    /// the opening greeting.
    pub async fn append_agent_turn(&self, text: &str) -> Message {
        let mut state = self.state.lock().await;
        state.append(Sender::Agent, text.trim().to_string(), None)
    }

    /// Add a message produced elsewhere. Returns false if its id is already
    /// present, in which case nothing changes.
    ///
    /// The stored copy gets the next turn index; the incoming one is ignored.
    pub async fn update_history(&self, mut message: Message) -> bool {
        let mut state = self.state.lock().await;
        if state.contains(&message.id) {
            tracing::debug!(id = %message.id, "Message already in history, ignoring");
            return false;
        }
        message.turn_index = state.increment_and_get();
        state.history.push(message);
        true
    }

    /// Ask the provider for the persona's next line and commit it.
    ///
    /// Never fails: provider errors and timeouts commit the fallback line,
    /// and a reply overtaken by a newer turn is discarded.
    pub async fn request_reply(&self) -> ReplyOutcome {
        let (issued_for, directive, turns) = {
            let state = self.state.lock().await;
            let directive =
                self.assembler
                    .assemble(&self.persona, &state.history, state.turn_counter);
            let turns: Vec<ChatTurn> = state.history.iter().map(ChatTurn::from).collect();
            (state.turn_counter, directive, turns)
        };
        tracing::debug!(
            turn = issued_for,
            stage = %directive.stage,
            commitment_pending = directive.commitment_pending,
            tone = directive.strategy.tone.as_str(),
            "Requesting reply"
        );

        let provider = self.llm.provider_name();
        let generated = tokio::time::timeout(
            self.reply_timeout,
            self.llm
                .complete(&directive.text, turns, self.params.clone()),
        )
        .await;

        let reply = match generated {
            Ok(Ok(completion)) => self.decorate(&completion.text),
            Ok(Err(e)) => Err(DialogueError::transient(provider, e)),
            Err(_) => Err(DialogueError::Timeout {
                provider: provider.to_string(),
                secs: self.reply_timeout.as_secs(),
            }),
        };

        let mut state = self.state.lock().await;
        if state.turn_counter != issued_for {
            let stale = DialogueError::StaleResult {
                issued_for,
                current: state.turn_counter,
            };
            tracing::debug!("Discarding reply: {}", stale);
            return ReplyOutcome::Stale {
                issued_for,
                current: state.turn_counter,
            };
        }

        match reply {
            Ok((text, recommendation)) => {
                let message = state.append(Sender::Agent, text, recommendation);
                tracing::info!(
                    turn = message.turn_index,
                    stage = %state.stage,
                    recommended = message.recommendation.is_some(),
                    "Reply committed"
                );
                ReplyOutcome::Reply(message)
            }
            Err(e) => {
                tracing::warn!("Reply failed, using fallback: {}", e);
                let text = fallback_text(self.persona.language).to_string();
                ReplyOutcome::Fallback(state.append(Sender::Agent, text, None))
            }
        }
    }

    /// Strip recommendation tags and resolve them.
    fn decorate(&self, raw: &str) -> Result<(String, Option<Recommendation>), DialogueError> {
        let (text, recommendation) = match &self.recommender {
            Some(recommender) => {
                let extracted = recommender.extract(raw);
                let recommendation = extracted.category.map(|c| recommender.resolve(&c));
                (extracted.text, recommendation)
            }
            None => (raw.trim().to_string(), None),
        };
        if text.is_empty() {
            return Err(DialogueError::transient(
                self.llm.provider_name(),
                "reply was empty",
            ));
        }
        Ok((text, recommendation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_refreshes_stage() {
        let mut state = SessionState::new();
        assert_eq!(state.stage, Stage::Empathy);
        for _ in 0..7 {
            state.increment_and_get();
        }
        assert_eq!(state.stage, Stage::Realization);
        state.increment_and_get();
        assert_eq!(state.increment_and_get(), 9);
        assert_eq!(state.stage, Stage::Action);
    }

    #[test]
    fn test_append_assigns_consecutive_turns() {
        let mut state = SessionState::new();
        let a = state.append(Sender::User, "hi".into(), None);
        let b = state.append(Sender::Agent, "hello!".into(), None);
        assert_eq!((a.turn_index, b.turn_index), (1, 2));
        assert!(state.contains(&a.id));
    }

    #[test]
    fn test_fallback_text_per_language() {
        assert_eq!(fallback_text(Language::En), "I didn't quite catch that, say it again?");
        assert!(fallback_text(Language::Ja).contains("もう一回言って"));
    }
}
