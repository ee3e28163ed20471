//! Content entities shared by the store, the importers and the engines.
//!
//! Field names follow the JSON stored in the content tables, so a quiz
//! exported from the store can be edited by hand and imported again.

pub mod bundle;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use bundle::SeedBundle;

pub const DEFAULT_PASSING_SCORE: u32 = 70;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuizKind {
    /// scored against an answer key
    Knowledge,
    /// scored by accumulating category weights
    Personality,
}

impl QuizKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knowledge" => Some(QuizKind::Knowledge),
            "personality" => Some(QuizKind::Personality),
            _ => None,
        }
    }
}

/// Per-option scoring data. Exactly one shape family is used within a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawScoring")]
pub enum OptionScoring {
    Personality {
        #[serde(default)]
        value: i64,
        category: String,
    },
    Knowledge {
        correct: u8,
    },
}

/// Scoring keys as written in a document, before the family is decided
#[derive(Deserialize)]
struct RawScoring {
    correct: Option<u8>,
    value: Option<i64>,
    category: Option<String>,
}

impl TryFrom<RawScoring> for OptionScoring {
    type Error = String;

    fn try_from(raw: RawScoring) -> Result<Self, Self::Error> {
        match (raw.correct, raw.value, raw.category) {
            (Some(correct), None, None) => Ok(OptionScoring::Knowledge { correct }),
            (None, value, Some(category)) => Ok(OptionScoring::Personality {
                value: value.unwrap_or_default(),
                category,
            }),
            (Some(_), _, _) => {
                Err("option mixes `correct` with personality `value`/`category`".to_string())
            }
            (None, Some(_), None) => Err("option has a `value` but no `category`".to_string()),
            (None, None, None) => Err("option needs `correct` or `category`".to_string()),
        }
    }
}

impl OptionScoring {
    pub fn kind(&self) -> QuizKind {
        match self {
            OptionScoring::Personality { .. } => QuizKind::Personality,
            OptionScoring::Knowledge { .. } => QuizKind::Knowledge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub scoring: OptionScoring,
}

impl QuizOption {
    pub fn is_correct(&self) -> bool {
        matches!(self.scoring, OptionScoring::Knowledge { correct: 1 })
    }

    /// `(category, value)` for personality options
    pub fn weight(&self) -> Option<(&str, i64)> {
        match &self.scoring {
            OptionScoring::Personality { value, category } => Some((category.as_str(), *value)),
            OptionScoring::Knowledge { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    pub options: Vec<QuizOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCategory {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub advice: String,
}

impl ResultCategory {
    /// Shown when the winning category has no entry in the quiz
    pub fn fallback() -> Self {
        Self {
            title: "Result".to_string(),
            description: "Thank you for completing the quiz!".to_string(),
            advice: String::new(),
        }
    }
}

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDefinition {
    #[serde(default)]
    pub id: String,
    /// empty means "derive from the title" on import
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "quiz_type")]
    pub kind: QuizKind,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub result_categories: BTreeMap<String, ResultCategory>,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color_scheme: String,
    #[serde(default = "default_true")]
    pub published: bool,
}

impl QuizDefinition {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(default)]
    pub id: String,
    /// empty means "derive from the title" on import
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    #[serde(default)]
    pub id: String,
    /// empty means "derive from the title" on import
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub duration: String,
    pub component_type: String,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color_scheme: String,
    #[serde(default = "default_true")]
    pub published: bool,
    /// authored steps; empty means the built-in table for the component type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<SimulationStep>,
}

/// A stored step row of a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub step_order: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_option_deserializes() {
        let opt: QuizOption =
            serde_json::from_str(r#"{ "id": "a", "text": "Yes", "correct": 1 }"#).unwrap();
        assert!(opt.is_correct());
        assert_eq!(opt.scoring.kind(), QuizKind::Knowledge);
        assert_eq!(opt.weight(), None);
    }

    #[test]
    fn test_personality_option_deserializes() {
        let opt: QuizOption = serde_json::from_str(
            r#"{ "id": "hodl", "text": "HODL", "value": 3, "category": "bull" }"#,
        )
        .unwrap();
        assert_eq!(opt.weight(), Some(("bull", 3)));
        assert!(!opt.is_correct());
    }

    #[test]
    fn test_personality_option_value_defaults_to_zero() {
        let opt: QuizOption =
            serde_json::from_str(r#"{ "id": "x", "text": "X", "category": "general" }"#).unwrap();
        assert_eq!(opt.weight(), Some(("general", 0)));
    }

    #[test]
    fn test_option_without_scoring_is_rejected() {
        let res = serde_json::from_str::<QuizOption>(r#"{ "id": "x", "text": "X" }"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_option_mixing_families_is_rejected() {
        let res = serde_json::from_str::<QuizOption>(
            r#"{ "id": "x", "text": "X", "value": 2, "category": "bull", "correct": 1 }"#,
        );
        assert!(res.is_err());

        let res = serde_json::from_str::<QuizOption>(
            r#"{ "id": "x", "text": "X", "value": 2, "correct": 0 }"#,
        );
        assert!(res.is_err());

        let res = serde_json::from_str::<QuizOption>(r#"{ "id": "x", "text": "X", "value": 2 }"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_slug_may_be_omitted() {
        let blog: Blog = serde_json::from_str(r#"{ "title": "Hello World" }"#).unwrap();
        assert!(blog.slug.is_empty());
    }

    #[test]
    fn test_option_serializes_flat() {
        let opt = QuizOption {
            id: "a".into(),
            text: "A".into(),
            scoring: OptionScoring::Knowledge { correct: 0 },
        };
        let json = serde_json::to_value(&opt).unwrap();
        assert_eq!(json["correct"], 0);
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_question_uses_question_key() {
        let q: Question = serde_json::from_str(
            r#"{ "id": "q1", "question": "Pick", "options": [] }"#,
        )
        .unwrap();
        assert_eq!(q.prompt, "Pick");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["question"], "Pick");
    }

    #[test]
    fn test_quiz_defaults() {
        let quiz: QuizDefinition = serde_json::from_str(
            r#"{ "slug": "s", "title": "T", "quiz_type": "knowledge", "questions": [] }"#,
        )
        .unwrap();
        assert_eq!(quiz.passing_score, DEFAULT_PASSING_SCORE);
        assert!(quiz.published);
        assert!(quiz.result_categories.is_empty());
    }

    #[test]
    fn test_quiz_kind_parse_and_display() {
        assert_eq!(QuizKind::parse("Knowledge"), Some(QuizKind::Knowledge));
        assert_eq!(QuizKind::parse(" personality "), Some(QuizKind::Personality));
        assert_eq!(QuizKind::parse("trivia"), None);
        assert_eq!(QuizKind::Personality.to_string(), "personality");
    }

    #[test]
    fn test_fallback_result() {
        let fb = ResultCategory::fallback();
        assert_eq!(fb.title, "Result");
        assert_eq!(fb.description, "Thank you for completing the quiz!");
        assert!(fb.advice.is_empty());
    }
}
