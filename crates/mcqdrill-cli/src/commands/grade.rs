//! The `mcqdrill grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mcqdrill_core::bank::option_label;
use mcqdrill_core::model::{AnswerSheet, ReviewStatus, TestResult, TestSession};

pub fn execute(
    session_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = TestSession::load_json(&session_path)?;
    let answers = load_answers(&answers_path)?;

    let unknown = answers
        .keys()
        .filter(|id| !session.questions.iter().any(|q| &q.id == *id))
        .count();
    if unknown > 0 {
        eprintln!("Warning: {unknown} answer(s) refer to questions not in this session; ignored.");
    }

    let result = session.grade(&answers);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", result.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text(&result),
    }

    if let Some(path) = output {
        result.save_json(&path)?;
        eprintln!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn load_answers(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse answers JSON")
}

fn print_text(result: &TestResult) {
    use comfy_table::{Cell, Table};

    let summary = result.summary();

    println!(
        "Test {}: score {:.2} ({:.2}%)",
        result.test_id, result.raw_score, result.percent
    );
    println!(
        "{} correct, {} wrong, {} omitted of {}",
        summary.correct, summary.wrong, summary.omitted, summary.total
    );

    if !summary.per_subject.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Subject", "Correct", "Wrong", "Omitted", "Marks"]);
        for (subject, b) in &summary.per_subject {
            table.add_row(vec![
                Cell::new(subject),
                Cell::new(b.correct),
                Cell::new(b.wrong),
                Cell::new(b.omitted),
                Cell::new(format!("{:.2}", b.marks)),
            ]);
        }
        println!("\n{table}");
    }

    for (n, r) in result.review.iter().enumerate() {
        let icon = match r.status {
            ReviewStatus::Correct => "OK",
            ReviewStatus::Wrong => "WRONG",
            ReviewStatus::Omitted => "SKIP",
        };
        let chosen = r
            .chosen_index
            .map(option_label)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  Q{} [{icon}] {} (answer {}, chosen {chosen})",
            n + 1,
            r.id,
            option_label(r.correct_index)
        );
    }
}
