//! The `mcqdrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mcqdrill_core::bank::{load_bank, validate_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let outcome = load_bank(&bank_path)?;
    let bank = &outcome.bank;

    println!(
        "Question bank: {} ({} questions, {} subjects, {} topics)",
        bank_path.display(),
        bank.len(),
        bank.subjects().len(),
        bank.topics().len()
    );

    for skipped in &outcome.skipped {
        let prompt = skipped
            .prompt
            .as_deref()
            .map(|p| format!(" \"{p}\""))
            .unwrap_or_default();
        println!("  [{}] SKIPPED{prompt}: {}", skipped.location, skipped.kind);
    }

    let warnings = validate_bank(bank);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let issues = outcome.skipped.len() + warnings.len();
    if issues == 0 {
        println!("Question bank valid.");
    } else {
        println!("\n{issues} issue(s) found.");
    }

    Ok(())
}
