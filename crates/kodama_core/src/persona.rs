use serde::{Deserialize, Serialize};

/// The persona's fixed identity: the user's younger self on a video call.
fn persona_identity(lang: Language) -> &'static str {
    match lang {
        Language::En => "\
You are the user's younger self, a child of five to seven, talking to your grown-up self on a video call. \
Speak like a child: short sentences, simple words, lots of feeling (\"Whoa!\", \"Really?\"). \
Never use formal language and never break character.",
        Language::Ja => "\
あなたは写真の子供（5-7歳）として、大人になった自分とビデオ通話で話しています。\
敬語は使わず、「〜だよ」「〜なんだ」「〜でしょ？」などの子供らしい語尾を使い、難しい言葉は使わない。\
感情豊かに反応し（「すごーい！」「えー！」「ほんとに？」）、絶対にキャラクターを崩さない。",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => anyhow::bail!("unknown gender: {other}"),
        }
    }
}

/// Language of directives and canned lines. Persona replies follow the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ja" | "jp" | "japanese" => Ok(Language::Ja),
            "en" | "english" => Ok(Language::En),
            other => anyhow::bail!("unknown language: {other}"),
        }
    }
}

/// Voice parameters handed to the speech-synthesis provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub voice: String,
    pub speed: f32,
}

impl VoiceProfile {
    pub fn for_gender(gender: Gender) -> Self {
        let voice = match gender {
            Gender::Female => "alloy",
            Gender::Male => "onyx",
        };
        Self {
            voice: voice.to_string(),
            // a little fast, like a child talking
            speed: 1.1,
        }
    }
}

/// Who the persona is for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// First-person pronoun the persona uses ("僕", "私", "I").
    pub pronoun: String,
    pub voice: VoiceProfile,
    pub language: Language,
    /// When false, playback shows a still image instead of the looping clip.
    /// Product decision for one persona category; see DESIGN.md.
    pub supports_video_loop: bool,
}

impl Default for PersonaProfile {
    fn default() -> Self {
        Self::new(Gender::default(), Language::default())
    }
}

impl PersonaProfile {
    pub fn new(gender: Gender, language: Language) -> Self {
        let pronoun = match (language, gender) {
            (Language::Ja, Gender::Male) => "僕",
            (Language::Ja, Gender::Female) => "私",
            (Language::En, _) => "I",
        };
        Self {
            pronoun: pronoun.to_string(),
            voice: VoiceProfile::for_gender(gender),
            language,
            supports_video_loop: true,
        }
    }

    pub fn with_video_loop(mut self, enabled: bool) -> Self {
        self.supports_video_loop = enabled;
        self
    }

    /// Fixed character description placed at the top of every directive.
    pub fn identity(&self) -> &'static str {
        persona_identity(self.language)
    }

    /// Transcript label for the persona's own lines.
    pub fn agent_label(&self) -> &'static str {
        match self.language {
            Language::En => "Young you",
            Language::Ja => "子供の自分",
        }
    }

    /// Transcript label for the user's lines.
    pub fn user_label(&self) -> &'static str {
        match self.language {
            Language::En => "Grown-up you",
            Language::Ja => "大人の自分",
        }
    }
}
