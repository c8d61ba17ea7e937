//! Core data model types for mcqdrill.
//!
//! Questions, test modes, sessions and graded results. Sessions and results
//! are the JSON contract with whatever surface renders them, so their field
//! names follow that contract (camelCase for the envelopes, snake_case inside
//! review entries).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique, stable identifier (e.g. "q17").
    pub id: String,
    /// Category label (e.g. "Social Psychology").
    pub subject: String,
    /// Sub-category label (e.g. "Group Processes").
    pub topic: String,
    /// The prompt shown to the user.
    pub text: String,
    /// Exactly four distinct options, in presentation order.
    pub options: [String; OPTION_COUNT],
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
    /// Difficulty label.
    pub difficulty: Difficulty,
    /// Explanation shown during review.
    pub explanation: String,
    /// Source attribution.
    pub source: String,
}

impl Question {
    /// Text of the correct option.
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

/// Difficulty labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Which slice of the bank a test draws from, and how many questions.
///
/// A missing `count` falls back to [`ModeDefaults`]; a count of zero or less
/// yields an empty session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestMode {
    /// Draw from the entire bank.
    Full {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<i64>,
    },
    /// Draw from questions whose subject equals `subject` exactly.
    Subject {
        subject: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<i64>,
    },
    /// Draw from questions whose topic contains `topic`, ignoring case.
    Topic {
        topic: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<i64>,
    },
}

impl TestMode {
    pub fn full() -> Self {
        TestMode::Full { count: None }
    }

    pub fn subject(subject: impl Into<String>) -> Self {
        TestMode::Subject {
            subject: subject.into(),
            count: None,
        }
    }

    pub fn topic(topic: impl Into<String>) -> Self {
        TestMode::Topic {
            topic: topic.into(),
            count: None,
        }
    }

    /// Set the requested count.
    pub fn with_count(mut self, n: i64) -> Self {
        match &mut self {
            TestMode::Full { count }
            | TestMode::Subject { count, .. }
            | TestMode::Topic { count, .. } => *count = Some(n),
        }
        self
    }

    /// The explicitly requested count, if any.
    pub fn requested_count(&self) -> Option<i64> {
        match self {
            TestMode::Full { count }
            | TestMode::Subject { count, .. }
            | TestMode::Topic { count, .. } => *count,
        }
    }

    /// Number of questions this mode asks for, after applying defaults.
    pub fn target_count(&self, defaults: &ModeDefaults) -> usize {
        let requested = self.requested_count().unwrap_or_else(|| match self {
            TestMode::Full { .. } => defaults.full as i64,
            TestMode::Subject { .. } => defaults.subject as i64,
            TestMode::Topic { .. } => defaults.topic as i64,
        });
        usize::try_from(requested).unwrap_or(0)
    }

    /// Short label for logs and tables.
    pub fn kind(&self) -> &'static str {
        match self {
            TestMode::Full { .. } => "full",
            TestMode::Subject { .. } => "subject",
            TestMode::Topic { .. } => "topic",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Full { .. } => write!(f, "full"),
            TestMode::Subject { subject, .. } => write!(f, "subject \"{subject}\""),
            TestMode::Topic { topic, .. } => write!(f, "topic \"{topic}\""),
        }
    }
}

/// Default question counts per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDefaults {
    #[serde(default = "default_full")]
    pub full: u32,
    #[serde(default = "default_subject")]
    pub subject: u32,
    #[serde(default = "default_topic")]
    pub topic: u32,
}

fn default_full() -> u32 {
    120
}

fn default_subject() -> u32 {
    20
}

fn default_topic() -> u32 {
    10
}

impl Default for ModeDefaults {
    fn default() -> Self {
        Self {
            full: default_full(),
            subject: default_subject(),
            topic: default_topic(),
        }
    }
}

/// One generated attempt: the questions in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub test_id: String,
    pub questions: Vec<Question>,
    pub mode_config: TestMode,
}

/// The user's answers: question id → chosen option index, or `None` when skipped.
pub type AnswerSheet = HashMap<String, Option<usize>>;

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Correct,
    Wrong,
    Omitted,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Correct => write!(f, "correct"),
            ReviewStatus::Wrong => write!(f, "wrong"),
            ReviewStatus::Omitted => write!(f, "omitted"),
        }
    }
}

/// Per-question review detail, self-contained so a review surface never has
/// to go back to the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub id: String,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
    pub chosen_index: Option<usize>,
    pub status: ReviewStatus,
    pub explanation: String,
    pub source: String,
    pub subject: String,
    pub topic: String,
}

/// A graded attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: String,
    /// Signed, unclamped score rounded to 2 decimals.
    pub raw_score: f64,
    /// Percentage in `[0, 100]`, rounded to 2 decimals.
    pub percent: f64,
    /// Review entries in session order.
    pub review: Vec<QuestionReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn mode_defaults_apply_when_count_missing() {
        let defaults = ModeDefaults::default();
        assert_eq!(TestMode::full().target_count(&defaults), 120);
        assert_eq!(TestMode::subject("Social").target_count(&defaults), 20);
        assert_eq!(TestMode::topic("Group").target_count(&defaults), 10);
        assert_eq!(TestMode::topic("Group").with_count(7).target_count(&defaults), 7);
    }

    #[test]
    fn non_positive_count_targets_nothing() {
        let defaults = ModeDefaults::default();
        assert_eq!(TestMode::full().with_count(0).target_count(&defaults), 0);
        assert_eq!(TestMode::full().with_count(-3).target_count(&defaults), 0);
    }

    #[test]
    fn test_mode_json_shape() {
        let mode = TestMode::topic("Group").with_count(5);
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "topic", "topic": "Group", "count": 5 })
        );

        let parsed: TestMode = serde_json::from_str(r#"{"type":"full"}"#).unwrap();
        assert_eq!(parsed, TestMode::full());
    }

    #[test]
    fn session_uses_camel_case_envelope() {
        let session = TestSession {
            test_id: "test-1-abcde".into(),
            questions: vec![],
            mode_config: TestMode::full(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"testId\""));
        assert!(json.contains("\"modeConfig\""));
    }

    #[test]
    fn question_rejects_wrong_option_count() {
        let json = r#"{
            "id": "q1", "subject": "S", "topic": "T", "text": "?",
            "options": ["a", "b", "c"], "correctIndex": 0,
            "difficulty": "easy", "explanation": "", "source": ""
        }"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }
}
