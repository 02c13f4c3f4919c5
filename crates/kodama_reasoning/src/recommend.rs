//! Course recommendations embedded in persona replies.
//!
//! The model may end a reply with `[RECOMMEND: category]`. The tag is removed
//! before the text is shown or spoken, and the category is resolved against
//! a small static course catalog.

use kodama_core::{Course, Recommendation};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use std::sync::{LazyLock, Mutex};

static RECOMMEND_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[RECOMMEND:\s*([^\]]*)\]").expect("valid regex"));

/// Reply text with any recommendation tag removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub text: String,
    pub category: Option<String>,
}

/// Recommendation collaborator: finds and resolves tags in raw reply text.
pub trait Recommender: Send + Sync {
    /// Strip every tag from `reply`; the first non-empty category wins.
    fn extract(&self, reply: &str) -> Extracted {
        let category = RECOMMEND_TAG
            .captures_iter(reply)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .find(|c| !c.is_empty());
        let stripped = RECOMMEND_TAG.replace_all(reply, "");
        Extracted {
            text: collapse_spaces(stripped.trim()),
            category,
        }
    }

    /// Turn a category into the payload attached to the agent message.
    fn resolve(&self, category: &str) -> Recommendation;
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !prev_space {
                out.push(c);
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out
}

// ============================================================================
// Catalog
// ============================================================================

struct CatalogEntry {
    id: &'static str,
    title: &'static str,
    url: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "career_design_intro",
        title: "自分らしい働き方を実現しよう！キャリアデザインのはじめ方",
        url: "https://www.udemy.com/course/youronlycareerdesign/",
    },
    CatalogEntry {
        id: "habit_minimum_5min",
        title: "１日５分のミニマム習慣術",
        url: "https://www.udemy.com/topic/habits/",
    },
    CatalogEntry {
        id: "designthinking_practice",
        title: "【実践】今日から使えるデザイン思考",
        url: "https://www.udemy.com/course/designthinking_basics/",
    },
    CatalogEntry {
        id: "startup_strategy_vc",
        title: "【現役VC】スタートアップ経営戦略（立ち上げ編）",
        url: "https://www.udemy.com/course/start-up_strategy/",
    },
    CatalogEntry {
        id: "ikigai_find_purpose_en",
        title: "IKIGAI - Find Your Life Purpose",
        url: "https://www.udemy.com/course/ikigai-find-your-life-purpose/",
    },
    CatalogEntry {
        id: "python_basics",
        title: "【初心者向け】Pythonプログラミング入門",
        url: "https://www.udemy.com/course/python-basics/",
    },
    CatalogEntry {
        id: "javascript_web_development",
        title: "【実践】JavaScriptでウェブアプリ開発",
        url: "https://www.udemy.com/course/javascript-web-development/",
    },
    CatalogEntry {
        id: "react_modern_web",
        title: "【最新版】Reactでモダンウェブアプリを作ろう",
        url: "https://www.udemy.com/course/react-modern-web/",
    },
];

const PROGRAMMING: &[&str] = &["python_basics", "javascript_web_development", "react_modern_web"];
const DEFAULT_COURSES: &[&str] = &["career_design_intro", "habit_minimum_5min", "python_basics"];

/// Category names the model is told it may use, Japanese then English.
pub const CATEGORIES: &[&str] = &[
    "プログラミング",
    "キャリア",
    "習慣",
    "デザイン",
    "起業",
    "自己理解",
    "成長",
    "学習",
];

pub const CATEGORIES_EN: &[&str] = &[
    "programming",
    "career",
    "habits",
    "design",
    "startup",
    "self-understanding",
    "growth",
    "learning",
];

fn courses_for(category: &str) -> &'static [&'static str] {
    match category.trim().to_lowercase().as_str() {
        "プログラミング" | "学習" | "programming" | "learning" => PROGRAMMING,
        "キャリア" | "career" => &["career_design_intro"],
        "習慣" | "habits" | "habit" => &["habit_minimum_5min"],
        "デザイン" | "design" => &["designthinking_practice"],
        "起業" | "startup" => &["startup_strategy_vc"],
        "自己理解" | "self-understanding" => &["ikigai_find_purpose_en", "career_design_intro"],
        "成長" | "growth" => &["habit_minimum_5min", "career_design_intro"],
        _ => DEFAULT_COURSES,
    }
}

fn course(id: &str) -> Option<Course> {
    CATALOG.iter().find(|c| c.id == id).map(|c| Course {
        id: c.id.to_string(),
        title: c.title.to_string(),
        url: c.url.to_string(),
    })
}

/// Resolves categories against the built-in catalog, picking one course at
/// random when a category maps to several.
pub struct CatalogRecommender {
    rng: Mutex<StdRng>,
}

impl Default for CatalogRecommender {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl CatalogRecommender {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Recommender for CatalogRecommender {
    fn resolve(&self, category: &str) -> Recommendation {
        let ids = courses_for(category);
        let picked = match self.rng.lock() {
            Ok(mut rng) => ids.choose(&mut *rng).copied(),
            Err(_) => ids.first().copied(),
        };
        let course = picked.and_then(course);
        tracing::debug!(category, course = ?course.as_ref().map(|c| &c.id), "Resolved recommendation");
        Recommendation {
            category: category.trim().to_string(),
            course,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_tag() {
        let r = CatalogRecommender::with_seed(1);
        let out = r.extract("約束だよ！ [RECOMMEND: 習慣]");
        assert_eq!(out.text, "約束だよ！");
        assert_eq!(out.category.as_deref(), Some("習慣"));
    }

    #[test]
    fn test_extract_tag_mid_sentence() {
        let r = CatalogRecommender::with_seed(1);
        let out = r.extract("Try this [RECOMMEND: career] okay?");
        assert_eq!(out.text, "Try this okay?");
        assert_eq!(out.category.as_deref(), Some("career"));
    }

    #[test]
    fn test_extract_without_tag() {
        let r = CatalogRecommender::with_seed(1);
        let out = r.extract("Just chatting!");
        assert_eq!(out.text, "Just chatting!");
        assert!(out.category.is_none());
    }

    #[test]
    fn test_empty_category_is_stripped_but_ignored() {
        let r = CatalogRecommender::with_seed(1);
        let out = r.extract("Hmm [RECOMMEND: ]");
        assert_eq!(out.text, "Hmm");
        assert!(out.category.is_none());
    }

    #[test]
    fn test_resolve_known_category() {
        let r = CatalogRecommender::with_seed(1);
        let rec = r.resolve("習慣");
        assert_eq!(rec.category, "習慣");
        assert_eq!(rec.course.unwrap().id, "habit_minimum_5min");

        let rec = r.resolve(" Startup ");
        assert_eq!(rec.course.unwrap().id, "startup_strategy_vc");
    }

    #[test]
    fn test_resolve_multi_course_category_stays_in_set() {
        let r = CatalogRecommender::with_seed(42);
        for _ in 0..20 {
            let id = r.resolve("プログラミング").course.unwrap().id;
            assert!(PROGRAMMING.contains(&id.as_str()));
        }
    }

    #[test]
    fn test_unknown_category_falls_back_to_defaults() {
        let r = CatalogRecommender::with_seed(3);
        let rec = r.resolve("underwater basket weaving");
        assert_eq!(rec.category, "underwater basket weaving");
        let id = rec.course.unwrap().id;
        assert!(DEFAULT_COURSES.contains(&id.as_str()));
    }

    #[test]
    fn test_every_mapped_id_is_in_catalog() {
        for category in CATEGORIES.iter().chain(CATEGORIES_EN) {
            for id in courses_for(category) {
                assert!(course(id).is_some(), "{} missing from catalog", id);
            }
        }
    }
}
