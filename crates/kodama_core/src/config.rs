use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::persona::{Gender, Language, PersonaProfile};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KodamaConfig {
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub persona: PersonaConfig,
    pub dialogue: DialogueConfig,
}

impl KodamaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: KodamaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.llm.timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("TTS_PROVIDER") {
            self.tts.provider = v;
        }
        if let Ok(v) = std::env::var("TTS_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.tts.timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("PERSONA_GENDER") {
            match v.parse() {
                Ok(g) => self.persona.gender = g,
                Err(e) => tracing::warn!("Ignoring PERSONA_GENDER: {}", e),
            }
        }
        if let Ok(v) = std::env::var("PERSONA_LANGUAGE") {
            match v.parse() {
                Ok(l) => self.persona.language = l,
                Err(e) => tracing::warn!("Ignoring PERSONA_LANGUAGE: {}", e),
            }
        }
        if let Ok(v) = std::env::var("PERSONA_VIDEO_LOOP") {
            if let Ok(b) = v.parse() {
                self.persona.video_loop = b;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" or "mock"
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on one generation request, retries included.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            base_url: None,
            max_tokens: 150,
            temperature: 0.8,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// "openai" or "silent"
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "tts-1".to_string(),
            base_url: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub gender: Gender,
    pub language: Language,
    /// Show the looping clip while speaking. False shows a still image.
    pub video_loop: bool,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            language: Language::Ja,
            video_loop: true,
        }
    }
}

impl PersonaConfig {
    pub fn profile(&self) -> PersonaProfile {
        PersonaProfile::new(self.gender, self.language).with_video_loop(self.video_loop)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// History entries quoted into each directive for continuity.
    pub history_excerpt: usize,
    /// User messages considered by signal extraction.
    pub signal_window: usize,
    /// Look for `[RECOMMEND: ...]` tags in replies.
    pub recommendations: bool,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            history_excerpt: 5,
            signal_window: 5,
            recommendations: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
