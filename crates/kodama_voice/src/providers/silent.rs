//! Silent provider: no audio, but a realistic speaking duration.

use crate::tts::{AudioClip, OutputFormat, TextToSpeech};
use anyhow::Result;
use kodama_core::VoiceProfile;
use std::time::Duration;

/// Roughly how long one character takes to say at speed 1.0.
const PER_CHAR: Duration = Duration::from_millis(70);

#[derive(Debug, Clone, Default)]
pub struct SilentSpeech;

#[async_trait::async_trait]
impl TextToSpeech for SilentSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<AudioClip> {
        let chars = text.chars().count() as u32;
        let speed = if voice.speed > 0.0 { voice.speed } else { 1.0 };
        let duration = (PER_CHAR * chars).div_f32(speed);
        Ok(AudioClip::new(Vec::new(), OutputFormat::Pcm).with_duration(duration))
    }

    fn default_format(&self) -> OutputFormat {
        OutputFormat::Pcm
    }

    fn provider_name(&self) -> &'static str {
        "silent"
    }
}
