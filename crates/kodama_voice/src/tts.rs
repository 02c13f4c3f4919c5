//! Text-to-Speech (TTS) trait definition

use anyhow::Result;
use async_trait::async_trait;
use kodama_core::VoiceProfile;
use std::time::Duration;

/// Output format for synthesized audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
    OggOpus,
    Pcm,
}

impl OutputFormat {
    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::OggOpus => "audio/ogg",
            Self::Pcm => "audio/pcm",
        }
    }

    /// Name used in provider request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::OggOpus => "opus",
            Self::Pcm => "pcm",
        }
    }
}

/// Synthesized audio ready for the playback sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Known playback length, when the provider can tell.
    pub duration_hint: Option<Duration>,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            bytes,
            format,
            duration_hint: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }
}

/// Text-to-Speech trait for synthesizing audio from text
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text to audio
    ///
    /// # Arguments
    /// * `text` - Text to synthesize
    /// * `voice` - Voice id and speaking rate
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<AudioClip>;

    /// Get the default output format for this provider
    fn default_format(&self) -> OutputFormat {
        OutputFormat::Mp3
    }

    /// Get the name of this TTS provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(OutputFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(OutputFormat::default(), OutputFormat::Mp3);
        assert_eq!(OutputFormat::OggOpus.as_str(), "opus");
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip::new(vec![1, 2, 3], OutputFormat::Wav);
        assert!(clip.duration_hint.is_none());
        let clip = clip.with_duration(Duration::from_millis(300));
        assert_eq!(clip.duration_hint, Some(Duration::from_millis(300)));
    }
}
