//! The question bank: loading, caching and validation.
//!
//! Questions are loaded once, from CSV or JSON, into an immutable
//! [`QuestionBank`] handle that is cheap to clone and is passed to the
//! selector explicitly. Rows that cannot become a valid question are skipped
//! with a warning; they never abort the load.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{MalformedRecord, RecordError};
use crate::model::{Difficulty, Question, OPTION_COUNT};

const DEFAULT_SUBJECT: &str = "Psychology";
const DEFAULT_TOPIC: &str = "General";
const DEFAULT_EXPLANATION: &str =
    "Review the concepts related to this question for better understanding.";
const DEFAULT_SOURCE: &str = "Psychology MCQ Bank";

/// An immutable, ordered pool of questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    /// All questions in load order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Distinct subjects, sorted.
    pub fn subjects(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.subject.as_str()).collect()
    }

    /// Distinct topics, sorted.
    pub fn topics(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.topic.as_str()).collect()
    }

    /// Build a bank from already-constructed questions, dropping any that
    /// break the bank's invariants (index out of range, repeated id or option).
    pub fn from_questions(questions: Vec<Question>) -> LoadOutcome {
        let mut builder = BankBuilder::default();
        for (i, q) in questions.into_iter().enumerate() {
            let location = format!("record {}", i + 1);
            let prompt = Some(q.text.clone());
            let checked = check_question(q);
            builder.push(location, prompt, checked);
        }
        builder.finish()
    }
}

/// The result of loading a bank: the usable questions plus everything skipped.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub bank: QuestionBank,
    pub skipped: Vec<MalformedRecord>,
}

#[derive(Default)]
struct BankBuilder {
    questions: Vec<Question>,
    seen_ids: HashSet<String>,
    skipped: Vec<MalformedRecord>,
}

impl BankBuilder {
    fn push(
        &mut self,
        location: String,
        prompt: Option<String>,
        question: std::result::Result<Question, RecordError>,
    ) {
        let question = question.and_then(|q| {
            if self.seen_ids.contains(&q.id) {
                Err(RecordError::DuplicateId(q.id))
            } else {
                Ok(q)
            }
        });

        match question {
            Ok(q) => {
                self.seen_ids.insert(q.id.clone());
                self.questions.push(q);
            }
            Err(kind) => {
                let record = MalformedRecord {
                    location,
                    prompt,
                    kind,
                };
                tracing::warn!("skipping question: {record}");
                self.skipped.push(record);
            }
        }
    }

    fn finish(self) -> LoadOutcome {
        tracing::debug!(
            "question bank ready: {} loaded, {} skipped",
            self.questions.len(),
            self.skipped.len()
        );
        LoadOutcome {
            bank: QuestionBank {
                questions: self.questions.into(),
            },
            skipped: self.skipped,
        }
    }
}

/// Load a bank from a `.json` file, or from CSV for any other extension.
pub fn load_bank(path: &Path) -> Result<LoadOutcome> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    let outcome = if path.extension().is_some_and(|ext| ext == "json") {
        parse_json_str(&content, path)?
    } else {
        parse_csv_str(&content)
    };

    tracing::info!(
        "loaded {} questions from {} ({} skipped)",
        outcome.bank.len(),
        path.display(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Parse CSV question rows. The first line is a header and is ignored.
///
/// Columns: prompt, option A–D, correct answer text, then optionally subject,
/// topic, difficulty, explanation and source. Question ids are `q<n>` where
/// `n` is the row's line number minus one, counted after leading whitespace
/// is stripped. Blank lines later in the file still count toward `n`.
pub fn parse_csv_str(content: &str) -> LoadOutcome {
    let content = content.trim_start();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut builder = BankBuilder::default();

    for (row, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(row + 2);
                let fields: Vec<&str> = record.iter().collect();
                let prompt = fields.first().map(|s| s.to_string());
                let question = question_from_row(format!("q{}", line - 1), &fields);
                builder.push(format!("line {line}"), prompt, question);
            }
            Err(e) => {
                let location = e
                    .position()
                    .map(|p| format!("line {}", p.line()))
                    .unwrap_or_else(|| format!("row {}", row + 1));
                builder.push(location, None, Err(RecordError::Unreadable(e.to_string())));
            }
        }
    }

    builder.finish()
}

fn question_from_row(id: String, fields: &[&str]) -> std::result::Result<Question, RecordError> {
    if fields.len() < 6 {
        return Err(RecordError::TooFewFields(fields.len()));
    }

    let options: [String; OPTION_COUNT] = [
        fields[1].to_string(),
        fields[2].to_string(),
        fields[3].to_string(),
        fields[4].to_string(),
    ];
    let answer = fields[5];

    check_distinct(&options)?;
    let correct_index = options
        .iter()
        .position(|opt| opt == answer)
        .ok_or_else(|| RecordError::AnswerNotInOptions(answer.to_string()))?;

    let optional = |idx: usize, default: &str| -> String {
        fields
            .get(idx)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| default.to_string())
    };

    let difficulty = match fields.get(8).filter(|s| !s.is_empty()) {
        Some(label) => label.parse().map_err(RecordError::Difficulty)?,
        None => Difficulty::default(),
    };

    Ok(Question {
        id,
        subject: optional(6, DEFAULT_SUBJECT),
        topic: optional(7, DEFAULT_TOPIC),
        text: fields[0].to_string(),
        options,
        correct_index,
        difficulty,
        explanation: optional(9, DEFAULT_EXPLANATION),
        source: optional(10, DEFAULT_SOURCE),
    })
}

/// Intermediate JSON record; option count and index are checked after parsing
/// so one bad record does not reject the whole file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonQuestion {
    id: String,
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default = "default_topic")]
    topic: String,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default = "default_explanation")]
    explanation: String,
    #[serde(default = "default_source")]
    source: String,
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Parse a JSON array of question records.
///
/// A document that is not an array of objects is an error; individual
/// records that fail validation are skipped.
pub fn parse_json_str(content: &str, source_path: &Path) -> Result<LoadOutcome> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let mut builder = BankBuilder::default();

    for (i, value) in values.into_iter().enumerate() {
        let location = format!("record {}", i + 1);
        let prompt = value
            .get("text")
            .and_then(|t| t.as_str())
            .map(String::from);
        let question = serde_json::from_value::<JsonQuestion>(value)
            .map_err(|e| RecordError::Unreadable(e.to_string()))
            .and_then(question_from_json);
        builder.push(location, prompt, question);
    }

    Ok(builder.finish())
}

fn question_from_json(raw: JsonQuestion) -> std::result::Result<Question, RecordError> {
    let found = raw.options.len();
    let options: [String; OPTION_COUNT] = raw
        .options
        .try_into()
        .map_err(|_| RecordError::WrongOptionCount(found))?;

    let difficulty = match raw.difficulty.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(label) => label.parse().map_err(RecordError::Difficulty)?,
        None => Difficulty::default(),
    };

    check_question(Question {
        id: raw.id,
        subject: raw.subject,
        topic: raw.topic,
        text: raw.text,
        options,
        correct_index: raw.correct_index,
        difficulty,
        explanation: raw.explanation,
        source: raw.source,
    })
}

fn check_question(q: Question) -> std::result::Result<Question, RecordError> {
    if q.correct_index >= OPTION_COUNT {
        return Err(RecordError::CorrectIndexOutOfRange(q.correct_index));
    }
    check_distinct(&q.options)?;
    Ok(q)
}

fn check_distinct(options: &[String; OPTION_COUNT]) -> std::result::Result<(), RecordError> {
    let mut seen = HashSet::new();
    for opt in options {
        if !seen.insert(opt.as_str()) {
            return Err(RecordError::DuplicateOption(opt.clone()));
        }
    }
    Ok(())
}

/// A non-fatal issue found in an otherwise loadable bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a loaded bank for content problems that do not block loading.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for q in bank.questions() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }
        for (i, opt) in q.options.iter().enumerate() {
            if opt.trim().is_empty() {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: format!("option {} is empty", option_label(i)),
                });
            }
        }
        if q.explanation.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "explanation is empty".into(),
            });
        }
    }

    // Same prompt under different ids
    let mut by_prompt: HashMap<String, &str> = HashMap::new();
    for q in bank.questions() {
        let key = q.text.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        if let Some(first) = by_prompt.get(&key) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("prompt duplicates {first}"),
            });
        } else {
            by_prompt.insert(key, q.id.as_str());
        }
    }

    warnings
}

/// "A".."D" for option indices; `None` past the last option.
pub fn option_letter(index: usize) -> Option<char> {
    (index < OPTION_COUNT).then(|| char::from(b'A' + index as u8))
}

/// The option's letter, or the bare index when it names no option.
pub fn option_label(index: usize) -> String {
    option_letter(index)
        .map(String::from)
        .unwrap_or_else(|| index.to_string())
}
