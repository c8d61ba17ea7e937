//! mcqdrill configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::ModeDefaults;

/// Top-level mcqdrill configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Question bank file (`.csv` or `.json`).
    #[serde(default = "default_question_bank")]
    pub question_bank: PathBuf,
    /// Where the served-question ledger is kept.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// User id to record history under when none is given.
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Question counts used when a mode does not request one.
    #[serde(default)]
    pub mode_defaults: ModeDefaults,
}

fn default_question_bank() -> PathBuf {
    PathBuf::from("questions.csv")
}
fn default_history_path() -> PathBuf {
    PathBuf::from(".mcqdrill/history.json")
}
fn default_user() -> String {
    "local-user".to_string()
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            question_bank: default_question_bank(),
            history_path: default_history_path(),
            default_user: default_user(),
            mode_defaults: ModeDefaults::default(),
        }
    }
}

/// Expand `${VAR_NAME}` references from the environment. Unset variables
/// expand to nothing; an unterminated `${` is left as written. Substituted
/// values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&rest[..start]);
        out.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    out
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, when given (a missing file is an error)
/// 2. `mcqdrill.toml` in the current directory
/// 3. `~/.config/mcqdrill/config.toml`
///
/// Environment variable overrides: `MCQDRILL_HISTORY`, `MCQDRILL_USER`.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mcqdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DrillConfig::default(),
    };

    if let Ok(history) = std::env::var("MCQDRILL_HISTORY") {
        config.history_path = PathBuf::from(history);
    }
    if let Ok(user) = std::env::var("MCQDRILL_USER") {
        if !user.trim().is_empty() {
            config.default_user = user;
        }
    }

    config.question_bank = resolve_path(&config.question_bank);
    config.history_path = resolve_path(&config.history_path);

    tracing::debug!(
        "config loaded from {}",
        config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mcqdrill"))
}
