use crate::api_types::{ChatTurn, Completion, Role};
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

/// OpenAI-compatible `/chat/completions` client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            api_key,
            base_url,
            model: model.to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// System directive first, then the transcript.
fn build_messages(directive: &str, turns: &[ChatTurn]) -> Vec<Value> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(json!({ "role": "system", "content": directive }));
    for turn in turns {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        messages.push(json!({ "role": role, "content": turn.content }));
    }
    messages
}

fn parse_completion(body: &Value) -> Result<Completion> {
    let choice = &body["choices"][0];
    let text = choice["message"]["content"]
        .as_str()
        .context("OpenAI response has no message content")?
        .trim()
        .to_string();
    Ok(Completion {
        text,
        finish_reason: choice["finish_reason"].as_str().map(str::to_string),
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        directive: &str,
        turns: Vec<ChatTurn>,
        params: CompletionParams,
    ) -> Result<Completion> {
        let payload = json!({
            "model": self.model,
            "messages": build_messages(directive, &turns),
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });
        let url = format!("{}/chat/completions", self.base_url);

        let response = with_retry(&self.retry, self.provider_name(), || async {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .context("Failed to send request to OpenAI")
        })
        .await?;

        let body: Value = response.json().await?;
        parse_completion(&body)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
