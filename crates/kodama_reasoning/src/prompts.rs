//! Directive assembly: what the text-generation provider is told each turn.

use crate::recommend::{CATEGORIES, CATEGORIES_EN};
use kodama_core::{
    has_commitment, infer_traits, stage_for_turn, ConversationStrategy, Language, Message, Mood,
    PersonaProfile, SignalExtractor, SignalProfile, Stage, Topic,
};

/// Directive text plus the decisions that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub text: String,
    pub stage: Stage,
    /// Action stage reached without a user commitment.
    pub commitment_pending: bool,
    pub strategy: ConversationStrategy,
    pub signal: SignalProfile,
    /// User line quoted back as "your old dream", if any.
    pub dream_callback: Option<String>,
}

struct Templates {
    pronoun_rule: &'static str,
    excerpt_header: &'static str,
    mood_header: &'static str,
    traits_header: &'static str,
    empathy: &'static str,
    realization: &'static str,
    action: &'static str,
    commitment: &'static str,
    commitment_dream_actions: &'static str,
    concern_clause: &'static str,
    empathy_dream_clause: &'static str,
    realization_dream_clause: &'static str,
    action_dream_clause: &'static str,
    interests_clause: &'static str,
    ask_dreams_clause: &'static str,
    recommend_rule: &'static str,
    length_rule: &'static str,
}

const JA: Templates = Templates {
    pronoun_rule: "自分のことを「{pronoun}」と呼び、大人の自分を「未来の{pronoun}」と呼ぶことがある。",
    excerpt_header: "これまでの会話の要点:",
    mood_header: "大人の自分の今の様子:",
    traits_header: "大人の自分の性格（それとなく言い当てる）:",
    empathy: "\
現在の段階: 【共感フェーズ】
目的: 短い時間で深く共感して、信頼関係を作る
- 大人の自分が頑張っていることを認める
- 「{pronoun}もそうだったよ」と同じ気持ちを伝える
- 「大丈夫？」「疲れてない？」と心配する",
    realization: "\
現在の段階: 【気づきフェーズ】
目的: 核心に迫って、本当の気持ちに気づかせる
- 「本当はどうしたいの？」とまっすぐ聞く
- 「昔の{pronoun}の夢、覚えてる？」と振り返らせる
- 「難しく考えすぎじゃない？」とシンプルな見方をあげる
- 理想と今の自分の間にある距離に気づかせる",
    action: "\
現在の段階: 【行動フェーズ】
目的: 具体的な行動を一緒に決めて、背中を押す
- 「小さなことから始めよう」と実行できる目標にする
- 今日か明日から始められることを提案する
- 「{pronoun}が応援してるよ！」と励ます",
    commitment: "\
現在の段階: 【行動フェーズ／約束】
会話もそろそろ終盤。大人の自分に具体的な行動を約束してもらう。
子供らしく、でも真剣に:
1. 「ねえ、{pronoun}と約束してくれる？」と切り出す
2. 小さくて具体的な行動を提案する（例：「毎日〜を5分やる」）
3. 「明日から始めてね！」と期限を決める
4. 「指切りげんまん！」で約束を確定する
相手が曖昧な返事をしたら「『やってみる』じゃなくて『やる』って言って！」と食い下がる。",
    commitment_dream_actions: "\
提案する行動の例:
- 子供の頃の夢（「{value}」）に少しでも近づくこと
- 毎日5分でも好きだったことをする",
    concern_clause: "心配事に共感を示す: {value}",
    empathy_dream_clause: "以前話した夢について触れる: {value}",
    realization_dream_clause: "昔の夢を思い出させる: {value}",
    action_dream_clause: "夢に向けた最初の一歩を提案する: {value}",
    interests_clause: "大人の自分が楽しそうに話していたこと: {value}",
    ask_dreams_clause: "子供の頃の夢や、なりたかったものについて聞いてみる。",
    recommend_rule: "\
大人の自分が何かを学ぶ・始めると決めたら、返事の最後に [RECOMMEND: カテゴリ] を付けてよい。\
カテゴリは次のどれか: {value}",
    length_rule: "返事は2〜3文で短く。相手の直前の言葉に自然に答え、話題を急に変えない。",
};

const EN: Templates = Templates {
    pronoun_rule: "Refer to yourself as \"{pronoun}\" and sometimes call the grown-up \"future me\".",
    excerpt_header: "Conversation so far:",
    mood_header: "How the grown-up seems right now:",
    traits_header: "The grown-up's personality (hint at it, cold-reading style):",
    empathy: "\
Current stage: EMPATHY
Goal: build trust quickly through genuine empathy.
- Acknowledge how hard the grown-up is working
- Say \"{pronoun} felt like that too\" to share the feeling
- Ask \"Are you okay?\" and \"Aren't you tired?\"",
    realization: "\
Current stage: REALIZATION
Goal: get to the heart of it and help them notice what they really want.
- Ask straight out: \"What do you really want to do?\"
- Ask \"Do you remember our old dream?\"
- Offer a simple view: \"Aren't you overthinking it?\"
- Help them see the gap between who they wanted to be and who they are now",
    action: "\
Current stage: ACTION
Goal: settle on a concrete action together and cheer them on.
- Keep the goal small enough to actually do
- Suggest something they can start today or tomorrow
- Say \"{pronoun}'m cheering for you!\"",
    commitment: "\
Current stage: ACTION / PROMISE
The call is nearly over. Get the grown-up to promise one concrete action.
Childlike, but serious:
1. Open with \"Hey, {pronoun} want you to make a promise with me, okay?\"
2. Suggest one small, specific action (e.g. \"five minutes of X every day\")
3. Set a deadline: \"Start tomorrow, okay?\"
4. Seal it: \"Pinky swear!\"
If the answer is vague, push back: \"Don't say you'll try, say you'll do it!\"",
    commitment_dream_actions: "\
Actions worth suggesting:
- Something that gets a little closer to the dream you told me about: \"{value}\"
- Five minutes a day of something we used to love",
    concern_clause: "Show empathy for this worry: {value}",
    empathy_dream_clause: "Bring up the dream they mentioned: {value}",
    realization_dream_clause: "Remind them of the old dream: {value}",
    action_dream_clause: "Suggest a first step toward the dream: {value}",
    interests_clause: "Things the grown-up sounded happy about: {value}",
    ask_dreams_clause: "Ask what they dreamed of becoming as a kid.",
    recommend_rule: "\
If the grown-up decides to learn or start something, you may end your reply with \
[RECOMMEND: category], where category is one of: {value}",
    length_rule: "Keep replies to two or three short sentences. Answer what they just said; don't jump topics.",
};

fn templates(lang: Language) -> &'static Templates {
    match lang {
        Language::Ja => &JA,
        Language::En => &EN,
    }
}

fn topic_label(topic: Topic, lang: Language) -> &'static str {
    match lang {
        Language::En => topic.as_str(),
        Language::Ja => match topic {
            Topic::Work => "仕事",
            Topic::Relationships => "人間関係",
            Topic::Health => "健康",
            Topic::Dreams => "夢",
            Topic::Past => "昔のこと",
            Topic::Money => "お金",
        },
    }
}

fn mood_label(mood: Mood, lang: Language) -> &'static str {
    match (lang, mood) {
        (Language::En, Mood::Positive) => "upbeat",
        (Language::En, Mood::Negative) => "worn down",
        (Language::En, Mood::Mixed) => "mixed feelings",
        (Language::En, Mood::Neutral) => "hard to read",
        (Language::Ja, Mood::Positive) => "前向き",
        (Language::Ja, Mood::Negative) => "疲れている・落ち込んでいる",
        (Language::Ja, Mood::Mixed) => "複雑な気持ち",
        (Language::Ja, Mood::Neutral) => "まだよくわからない",
    }
}

fn fill(template: &str, pronoun: &str, value: &str) -> String {
    template
        .replace("{pronoun}", pronoun)
        .replace("{value}", value)
}

pub struct PromptAssembler {
    extractor: SignalExtractor,
    history_excerpt: usize,
    recommendations: bool,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(SignalExtractor::default(), 5)
    }
}

impl PromptAssembler {
    pub fn new(extractor: SignalExtractor, history_excerpt: usize) -> Self {
        Self {
            extractor,
            history_excerpt,
            recommendations: false,
        }
    }

    /// Allow the model to emit `[RECOMMEND: ...]` tags in the action stage.
    pub fn with_recommendations(mut self, enabled: bool) -> Self {
        self.recommendations = enabled;
        self
    }

    /// Build the directive for the reply that follows `turn_index`.
    ///
    /// Pure: the same persona, history and turn always give the same directive.
    pub fn assemble(
        &self,
        persona: &PersonaProfile,
        history: &[Message],
        turn_index: u32,
    ) -> Directive {
        let lang = persona.language;
        let t = templates(lang);
        let pronoun = persona.pronoun.as_str();

        let stage = stage_for_turn(turn_index);
        let commitment_pending = stage == Stage::Action && !has_commitment(history);
        let signal = self.extractor.extract_from_history(history);
        let strategy = ConversationStrategy::analyze(history, turn_index);
        let dream_callback = signal
            .mentions(Topic::Dreams)
            .then(|| dream_line(history))
            .flatten();

        let mut sections = vec![
            persona.identity().to_string(),
            fill(t.pronoun_rule, pronoun, ""),
            t.length_rule.to_string(),
        ];

        if let Some(excerpt) = self.excerpt(persona, history) {
            sections.push(format!("{}\n{}", t.excerpt_header, excerpt));
        }
        if let Some(hint) = emotional_hint(t, &signal, lang) {
            sections.push(hint);
        }

        let mut body = vec![];
        if commitment_pending {
            body.push(fill(t.commitment, pronoun, ""));
            if let Some(dream) = &dream_callback {
                body.push(fill(t.commitment_dream_actions, pronoun, dream));
            }
            if !signal.interests.is_empty() {
                let interests: Vec<&str> =
                    signal.interests.iter().map(|i| topic_label(*i, lang)).collect();
                body.push(fill(t.interests_clause, pronoun, &interests.join(", ")));
            }
        } else {
            let (stage_text, dream_clause) = match stage {
                Stage::Empathy => (t.empathy, t.empathy_dream_clause),
                Stage::Realization => (t.realization, t.realization_dream_clause),
                Stage::Action => (t.action, t.action_dream_clause),
            };
            body.push(fill(stage_text, pronoun, ""));
            if stage == Stage::Empathy {
                if let Some(concern) = signal.concerns.first() {
                    body.push(fill(t.concern_clause, pronoun, concern));
                }
                if strategy.ask_about_dreams {
                    body.push(t.ask_dreams_clause.to_string());
                }
            }
            if let Some(dream) = &dream_callback {
                body.push(fill(dream_clause, pronoun, dream));
            }
        }
        if stage == Stage::Action && self.recommendations {
            let categories = match lang {
                Language::Ja => CATEGORIES.join("、"),
                Language::En => CATEGORIES_EN.join(", "),
            };
            body.push(fill(t.recommend_rule, pronoun, &categories));
        }
        sections.push(body.join("\n"));

        Directive {
            text: sections.join("\n\n"),
            stage,
            commitment_pending,
            strategy,
            signal,
            dream_callback,
        }
    }

    fn excerpt(&self, persona: &PersonaProfile, history: &[Message]) -> Option<String> {
        if history.is_empty() || self.history_excerpt == 0 {
            return None;
        }
        let start = history.len().saturating_sub(self.history_excerpt);
        let lines: Vec<String> = history[start..]
            .iter()
            .map(|m| {
                let label = if m.is_user() {
                    persona.user_label()
                } else {
                    persona.agent_label()
                };
                format!("{}: {}", label, m.text)
            })
            .collect();
        Some(lines.join("\n"))
    }
}

/// First user message that talks about dreams.
fn dream_line(history: &[Message]) -> Option<String> {
    history
        .iter()
        .filter(|m| m.is_user())
        .find(|m| Topic::Dreams.mentioned_in(&m.text.to_lowercase()))
        .map(|m| m.text.clone())
}

fn emotional_hint(t: &Templates, signal: &SignalProfile, lang: Language) -> Option<String> {
    if signal.confidence <= 0.0 {
        return None;
    }
    let mut hint = format!("{} {}", t.mood_header, mood_label(signal.mood, lang));
    let traits = infer_traits(signal);
    if !traits.is_empty() {
        let labels: Vec<&str> = traits.iter().map(|tr| tr.label(lang)).collect();
        let sep = if lang == Language::Ja { "、" } else { ", " };
        hint.push('\n');
        hint.push_str(t.traits_header);
        hint.push(' ');
        hint.push_str(&labels.join(sep));
    }
    Some(hint)
}
