//! Session and result persistence, summaries, and markdown review rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::bank::option_label;
use crate::model::{ReviewStatus, TestResult, TestSession};

fn save_pretty<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {what}"))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {what} to {}", path.display()))?;
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {what} JSON"))
}

impl TestSession {
    /// Save the session as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_pretty(self, path, "session")
    }

    /// Load a session from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load(path, "session")
    }
}

/// Outcome counts for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectBreakdown {
    pub correct: usize,
    pub wrong: usize,
    pub omitted: usize,
    /// Signed marks earned within this subject.
    pub marks: f64,
}

impl SubjectBreakdown {
    pub fn total(&self) -> usize {
        self.correct + self.wrong + self.omitted
    }

    fn add(&mut self, status: ReviewStatus) {
        match status {
            ReviewStatus::Correct => self.correct += 1,
            ReviewStatus::Wrong => self.wrong += 1,
            ReviewStatus::Omitted => self.omitted += 1,
        }
        self.marks += crate::grader::marks_for(status);
    }
}

/// Aggregate counts for a graded attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub omitted: usize,
    /// Fraction of answered questions that were correct (0 when nothing was answered).
    pub accuracy: f64,
    pub per_subject: BTreeMap<String, SubjectBreakdown>,
}

impl TestResult {
    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        save_pretty(self, path, "result")
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        load(path, "result")
    }

    /// Count outcomes overall and per subject.
    pub fn summary(&self) -> ResultSummary {
        let mut overall = SubjectBreakdown::default();
        let mut per_subject: BTreeMap<String, SubjectBreakdown> = BTreeMap::new();

        for r in &self.review {
            overall.add(r.status);
            per_subject.entry(r.subject.clone()).or_default().add(r.status);
        }

        let answered = overall.correct + overall.wrong;
        let accuracy = if answered == 0 {
            0.0
        } else {
            overall.correct as f64 / answered as f64
        };

        ResultSummary {
            total: overall.total(),
            correct: overall.correct,
            wrong: overall.wrong,
            omitted: overall.omitted,
            accuracy,
            per_subject,
        }
    }

    /// Render the result as a markdown review sheet.
    pub fn to_markdown(&self) -> String {
        let summary = self.summary();
        let mut md = String::new();

        md.push_str(&format!("## Review: {}\n\n", self.test_id));
        md.push_str(&format!(
            "**Score:** {:.2} ({:.2}%)\n\n",
            self.raw_score, self.percent
        ));
        md.push_str(&format!(
            "**Summary:** {} correct, {} wrong, {} omitted of {}\n\n",
            summary.correct, summary.wrong, summary.omitted, summary.total
        ));

        if summary.per_subject.len() > 1 {
            md.push_str("| Subject | Correct | Wrong | Omitted | Marks |\n");
            md.push_str("|---------|---------|-------|---------|-------|\n");
            for (subject, b) in &summary.per_subject {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.2} |\n",
                    subject, b.correct, b.wrong, b.omitted, b.marks
                ));
            }
            md.push('\n');
        }

        for (n, r) in self.review.iter().enumerate() {
            md.push_str(&format!(
                "### Q{}. {} [{}]\n\n",
                n + 1,
                r.text,
                r.status.to_string().to_uppercase()
            ));
            for (i, opt) in r.options.iter().enumerate() {
                let mut marks = Vec::new();
                if i == r.correct_index {
                    marks.push("correct");
                }
                if Some(i) == r.chosen_index {
                    marks.push("your answer");
                }
                let suffix = if marks.is_empty() {
                    String::new()
                } else {
                    format!(" _({})_", marks.join(", "))
                };
                md.push_str(&format!("- {}. {}{}\n", option_label(i), opt, suffix));
            }
            if let Some(chosen) = r.chosen_index.filter(|&i| i >= r.options.len()) {
                md.push_str(&format!("- _Your answer ({chosen}) is not one of the options._\n"));
            }
            md.push_str(&format!("\n**Explanation:** {}\n\n", r.explanation));
            md.push_str(&format!("_Source: {}_\n\n", r.source));
        }

        md
    }
}
