use crate::tts::{AudioClip, OutputFormat, TextToSpeech};
use anyhow::{Context, Result};
use kodama_core::VoiceProfile;
use reqwest::Client;
use serde_json::json;
use std::env;
use std::time::Duration;

/// OpenAI `/audio/speech` client.
#[derive(Debug, Clone)]
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiSpeech {
    pub fn new(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key,
            base_url,
            model: model.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl TextToSpeech for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<AudioClip> {
        let format = self.default_format();
        let payload = json!({
            "model": self.model,
            "input": text,
            "voice": voice.voice,
            "response_format": format.as_str(),
            "speed": voice.speed,
        });

        let url = format!("{}/audio/speech", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to OpenAI TTS")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI TTS Error ({}): {}", status, error_text);
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(bytes = bytes.len(), voice = %voice.voice, "Synthesized speech");
        Ok(AudioClip::new(bytes, format))
    }

    fn default_format(&self) -> OutputFormat {
        OutputFormat::Mp3
    }

    fn provider_name(&self) -> &'static str {
        "openai-tts"
    }
}
