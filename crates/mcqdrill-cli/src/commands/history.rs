//! The `mcqdrill history` command.

use std::path::PathBuf;

use anyhow::Result;

use mcqdrill_core::config::load_config_from;

use super::{open_selector, parse_mode};

pub fn execute(
    mode: String,
    subject: Option<String>,
    topic: Option<String>,
    user: Option<String>,
    bank: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mode = parse_mode(&mode, subject, topic, None)?;
    let config = load_config_from(config_path.as_deref())?;
    let user = user.unwrap_or_else(|| config.default_user.clone());
    anyhow::ensure!(!user.trim().is_empty(), "user id must not be empty");

    let selector = open_selector(&config, bank)?;
    let coverage = selector.coverage(&mode, &user);
    let served = selector.ledger().used_ids(&user).len();

    println!("User: {user}");
    println!("Pool ({mode}): {} questions", coverage.pool);
    println!("Served from pool: {}", coverage.seen);
    println!("Fresh remaining: {}", coverage.fresh());
    println!("Served overall: {served}");
    if coverage.pool > 0 && coverage.fresh() == 0 {
        println!("Pool exhausted; new sessions will repeat questions.");
    }

    Ok(())
}
