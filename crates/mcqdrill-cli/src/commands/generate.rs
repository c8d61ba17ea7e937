//! The `mcqdrill generate` command.

use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mcqdrill_core::config::load_config_from;

use super::{open_selector, parse_mode};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    mode: String,
    subject: Option<String>,
    topic: Option<String>,
    count: Option<i64>,
    user: Option<String>,
    seed: Option<u64>,
    bank: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode = parse_mode(&mode, subject, topic, count)?;
    let config = load_config_from(config_path.as_deref())?;
    let user = user.unwrap_or_else(|| config.default_user.clone());
    anyhow::ensure!(!user.trim().is_empty(), "user id must not be empty");

    let selector = open_selector(&config, bank)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let session = selector.generate_session(&mode, &user, &mut rng);
    let coverage = selector.coverage(&mode, &user);

    if session.questions.is_empty() {
        eprintln!("Warning: no questions available for {mode}; the session is empty.");
    }
    eprintln!(
        "Generated {} with {} question(s) ({mode}) for '{user}'; {} of {} in this pool now served.",
        session.test_id,
        session.questions.len(),
        coverage.seen,
        coverage.pool
    );

    match output {
        Some(path) => {
            session.save_json(&path)?;
            eprintln!("Session saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&session)?),
    }

    Ok(())
}
