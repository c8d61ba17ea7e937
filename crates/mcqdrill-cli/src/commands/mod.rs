pub mod generate;
pub mod grade;
pub mod history;
pub mod init;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};

use mcqdrill_core::bank::load_bank;
use mcqdrill_core::config::DrillConfig;
use mcqdrill_core::model::TestMode;
use mcqdrill_core::{JsonFileHistoryStore, Selector};

/// Build a `TestMode` from the `--mode/--subject/--topic/--count` flags.
pub fn parse_mode(
    mode: &str,
    subject: Option<String>,
    topic: Option<String>,
    count: Option<i64>,
) -> Result<TestMode> {
    let mode = match mode.to_lowercase().as_str() {
        "full" => TestMode::full(),
        "subject" => {
            let subject = subject.context("--subject is required for subject mode")?;
            TestMode::subject(subject)
        }
        "topic" => {
            let topic = topic.context("--topic is required for topic mode")?;
            TestMode::topic(topic)
        }
        other => anyhow::bail!("unknown mode '{other}' (expected full, subject or topic)"),
    };

    Ok(match count {
        Some(n) => mode.with_count(n),
        None => mode,
    })
}

/// Load the bank named by `--bank` (or the config) and wire it to the
/// configured history file.
pub fn open_selector(
    config: &DrillConfig,
    bank: Option<PathBuf>,
) -> Result<Selector<JsonFileHistoryStore>> {
    let bank_path = bank.unwrap_or_else(|| config.question_bank.clone());
    let outcome = load_bank(&bank_path)?;
    if !outcome.skipped.is_empty() {
        eprintln!(
            "Warning: skipped {} malformed question(s) in {} (run `mcqdrill validate` for details)",
            outcome.skipped.len(),
            bank_path.display()
        );
    }

    let store = JsonFileHistoryStore::new(&config.history_path);
    Ok(Selector::new(outcome.bank, store).with_defaults(config.mode_defaults))
}
