//! Keyword-based Japanese/English signal extraction.
//!
//! Scores the user's most recent utterances for mood, topics, concerns and
//! interests. Word lists are shared by every consumer in the workspace.
//! Negative words weigh more than positive ones so distress is easier to
//! detect than contentment.
//!
//! English entries match whole words (plus a plain inflection suffix), so
//! "rent" does not fire on "parents" and "hope" does not fire on "hopeless".
//! Japanese entries match as substrings and are chosen to avoid common
//! compounds ("大丈夫" must not read as "夫").

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::Message;

const POSITIVE: &[&str] = &[
    "嬉しい", "楽しい", "幸せ", "素敵", "良い", "いい", "最高", "素晴らしい", "成功", "達成", "愛",
    "好き", "happy", "glad", "fun", "enjoy", "great", "wonderful", "love", "excited", "proud",
    "success",
];

const NEGATIVE: &[&str] = &[
    "悲しい", "辛い", "つらい", "苦しい", "不安", "心配", "怖い", "疲れ", "大変", "困った", "失敗",
    "後悔", "sad", "tired", "exhausted", "anxious", "worried", "scared", "afraid", "stressed",
    "lonely", "regret", "failed", "struggling",
];

const NEUTRAL: &[&str] = &[
    "普通", "まあまあ", "そこそこ", "特に", "いつも", "毎日", "okay", "normal", "usual",
    "every day", "so-so",
];

const POSITIVE_WEIGHT: f32 = 1.5;
const NEGATIVE_WEIGHT: f32 = 1.8;
const NEUTRAL_WEIGHT: f32 = 1.0;

/// One side must exceed the other by this factor to decide the mood.
const DOMINANCE_RATIO: f32 = 1.5;

/// Weighted score at which the hit component of confidence saturates.
const SCORE_SATURATION: f32 = 10.0;

pub const DEFAULT_WINDOW: usize = 5;

static CONCERN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"([^。、！？\s]+)が心配",
        r"([^。、！？\s]+)に悩んで",
        r"([^。、！？\s]+)で困って",
        r"([^。、！？\s]+)がうまくいかない",
        r"([^。、！？\s]+)ができない",
        r"([^。、！？\s]+)が不安",
        r"(?i)\b((?:[a-z']+\s+){0,3}[a-z']+)\s+(?:is|are|has been|have been)\s+(?:really\s+)?(?:worrying|troubling|bothering)",
        r"(?i)\bworried about\s+((?:[a-z']+\s*){1,4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A word list compiled for matching against lowercased text.
struct Lexicon {
    /// Non-ASCII entries, matched as substrings.
    phrases: Vec<&'static str>,
    /// ASCII entries as one alternation bounded by `\b`.
    words: Option<Regex>,
}

impl Lexicon {
    fn new(entries: &[&'static str]) -> Self {
        let (ascii, phrases): (Vec<&'static str>, Vec<&'static str>) =
            entries.iter().copied().partition(|e| e.is_ascii());
        let words = (!ascii.is_empty()).then(|| {
            let alternation = ascii
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{})(?:s|es|d|ed|ing)?\b", alternation)).unwrap()
        });
        Self { phrases, words }
    }

    fn count(&self, lowered: &str) -> usize {
        let phrase_hits: usize = self.phrases.iter().map(|p| lowered.matches(p).count()).sum();
        let word_hits = self.words.as_ref().map_or(0, |re| re.find_iter(lowered).count());
        phrase_hits + word_hits
    }
}

static POSITIVE_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(POSITIVE));
static NEGATIVE_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(NEGATIVE));
static NEUTRAL_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(NEUTRAL));

/// Indexed by `Topic as usize`.
static TOPIC_LEXICONS: LazyLock<Vec<Lexicon>> =
    LazyLock::new(|| Topic::ALL.iter().map(|t| Lexicon::new(t.keywords())).collect());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    Negative,
    #[default]
    Neutral,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Work,
    Relationships,
    Health,
    Dreams,
    Past,
    Money,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Work,
        Topic::Relationships,
        Topic::Health,
        Topic::Dreams,
        Topic::Past,
        Topic::Money,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Work => "work",
            Topic::Relationships => "relationships",
            Topic::Health => "health",
            Topic::Dreams => "dreams",
            Topic::Past => "past",
            Topic::Money => "money",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Work => &[
                "仕事", "会社", "職場", "上司", "部下", "同僚", "プロジェクト", "会議", "残業",
                "キャリア", "work", "job", "office", "boss", "career", "project", "meeting",
                "overtime", "colleague",
            ],
            Topic::Relationships => &[
                "家族", "友達", "恋人", "彼氏", "彼女", "夫が", "旦那", "妻", "子供", "両親",
                "母親", "父親", "人間関係",
                "family", "friend", "partner", "girlfriend", "boyfriend", "wife", "husband",
                "kids", "parents",
            ],
            Topic::Health => &[
                "健康", "体調", "病気", "運動", "食事", "睡眠", "ストレス", "疲労", "health",
                "sick", "exercise", "sleep", "stress", "diet",
            ],
            Topic::Dreams => &[
                "夢", "目標", "将来", "希望", "願い", "やりたい", "なりたい", "dream", "goal",
                "future", "hope", "wish", "want to be", "astronaut",
            ],
            Topic::Past => &[
                "昔", "子供の頃", "若い頃", "思い出", "懐かしい", "覚えて", "childhood",
                "remember", "memories", "used to", "nostalgic", "when i was",
            ],
            Topic::Money => &[
                "お金", "給料", "貯金", "買い物", "生活", "経済", "money", "salary", "savings",
                "rent", "bills", "debt",
            ],
        }
    }

    /// `lowered` must already be lowercased.
    pub fn mentioned_in(&self, lowered: &str) -> bool {
        TOPIC_LEXICONS[*self as usize].count(lowered) > 0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood/topic summary of the user's recent text.
///
/// Always derived from a history slice; never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
    pub mood: Mood,
    pub topics: BTreeSet<Topic>,
    /// Subject clauses of "X is worrying me" style sentences.
    pub concerns: Vec<String>,
    /// Topics mentioned in the same message as a positive word.
    pub interests: Vec<Topic>,
    /// In `[0.0, 1.0]`
    pub confidence: f32,
}

impl SignalProfile {
    pub fn mentions(&self, topic: Topic) -> bool {
        self.topics.contains(&topic)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SignalExtractor {
    window: usize,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SignalExtractor {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Extract signal from the user-authored messages of a transcript.
    pub fn extract_from_history(&self, history: &[Message]) -> SignalProfile {
        let user_texts: Vec<&str> = history
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.text.as_str())
            .collect();
        self.extract(&user_texts)
    }

    /// Extract signal from the last `window` entries of `recent_user_messages`.
    ///
    /// Empty input yields a neutral profile with zero confidence.
    pub fn extract<S: AsRef<str>>(&self, recent_user_messages: &[S]) -> SignalProfile {
        let start = recent_user_messages.len().saturating_sub(self.window);
        let recent: Vec<&str> = recent_user_messages[start..]
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !s.trim().is_empty())
            .collect();

        if recent.is_empty() {
            return SignalProfile::default();
        }

        let lowered: Vec<String> = recent.iter().map(|s| s.to_lowercase()).collect();
        let combined = lowered.join(" ");

        let positive = POSITIVE_LEXICON.count(&combined) as f32 * POSITIVE_WEIGHT;
        let negative = NEGATIVE_LEXICON.count(&combined) as f32 * NEGATIVE_WEIGHT;
        let neutral = NEUTRAL_LEXICON.count(&combined) as f32 * NEUTRAL_WEIGHT;

        let mood = if positive > negative * DOMINANCE_RATIO {
            Mood::Positive
        } else if negative > positive * DOMINANCE_RATIO {
            Mood::Negative
        } else if positive > 0.0 && negative > 0.0 {
            Mood::Mixed
        } else {
            Mood::Neutral
        };

        let topics: BTreeSet<Topic> = Topic::ALL
            .into_iter()
            .filter(|t| t.mentioned_in(&combined))
            .collect();

        let interests = topics
            .iter()
            .copied()
            .filter(|t| {
                lowered
                    .iter()
                    .any(|msg| t.mentioned_in(msg) && POSITIVE_LEXICON.count(msg) > 0)
            })
            .collect();

        let fill = (recent.len() as f32 / self.window as f32).min(1.0);
        let hits = ((positive + negative + neutral) / SCORE_SATURATION).min(1.0);

        SignalProfile {
            mood,
            topics,
            concerns: extract_concerns(&recent),
            interests,
            confidence: (fill * hits).clamp(0.0, 1.0),
        }
    }
}

fn extract_concerns(messages: &[&str]) -> Vec<String> {
    let mut concerns: Vec<String> = Vec::new();
    for msg in messages {
        for pattern in CONCERN_PATTERNS.iter() {
            for caps in pattern.captures_iter(msg) {
                if let Some(subject) = caps.get(1) {
                    let subject = subject.as_str().trim().to_string();
                    if !subject.is_empty() && !concerns.contains(&subject) {
                        concerns.push(subject);
                    }
                }
            }
        }
    }
    concerns
}
