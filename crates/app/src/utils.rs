//! Utility functions for the AskForHelp app
//!
//! Settings persistence, export directory resolution, clipboard access and
//! the text shown in the transcript when the model call fails.

use anyhow::Context;
use providers::ModelError;
use shared::settings::AppSettings;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static THINK_BLOCK_REGEX: OnceLock<Option<regex::Regex>> = OnceLock::new();

/// `{config_dir}/askforhelp/settings.json`
pub fn config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| {
        let mut p = dirs.config_dir().to_path_buf();
        p.push("askforhelp");
        p.push("settings.json");
        p
    })
}

pub fn load_settings(path: &Path) -> anyhow::Result<AppSettings> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_str::<AppSettings>(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

/// Load settings from disk or return defaults. A broken file is logged and
/// left in place so the user can fix it.
pub fn load_settings_or_default(path: Option<&Path>) -> AppSettings {
    let Some(path) = path else {
        tracing::warn!("no config directory available, using default settings");
        return AppSettings::default();
    };
    if !path.exists() {
        tracing::info!(path = %path.display(), "no settings file yet, using defaults");
        return AppSettings::default();
    }
    match load_settings(path) {
        Ok(settings) => {
            tracing::info!(path = %path.display(), "settings loaded");
            settings
        }
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "settings file unreadable, using defaults");
            AppSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "settings saved");
    Ok(())
}

/// Where tickets, reports and screenshots go.
pub fn resolve_export_dir(settings: &AppSettings) -> PathBuf {
    match settings.export_dir.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Strip `<think>` blocks some local models emit and normalize whitespace.
pub fn clean_ai_response(response: &str) -> String {
    let re = THINK_BLOCK_REGEX
        .get_or_init(|| regex::Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").ok());
    let cleaned = match re {
        Some(re) => re.replace_all(response, "").to_string(),
        None => response.to_string(),
    };

    cleaned
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Transcript notice for a failed model call
pub fn format_model_error(error: &ModelError) -> String {
    match error {
        ModelError::Status { .. } => error.to_string(),
        _ => format!("❌ Error: {}", error),
    }
}

/// Status bar text for a failed model call
pub fn model_error_status(error: &ModelError) -> &'static str {
    match error {
        ModelError::Connect { .. } => "Connection Error",
        _ => "Error",
    }
}

pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("could not write to the clipboard")?;
    Ok(())
}
