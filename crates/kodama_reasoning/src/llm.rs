use crate::api_types::{ChatTurn, Completion};
use anyhow::Result;
use async_trait::async_trait;

/// Sampling parameters for one reply.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.8,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate the persona's next line.
    ///
    /// `turns` is the transcript in order; its last entry is the latest user text.
    async fn complete(
        &self,
        directive: &str,
        turns: Vec<ChatTurn>,
        params: CompletionParams,
    ) -> Result<Completion>;

    fn provider_name(&self) -> &'static str;
}

// Providers available in crate::providers
