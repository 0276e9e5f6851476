//! Core types for the AskForHelp app
//!
//! The main AppState plus the small enums the frame loop and the dialogs
//! pass around.

use crate::modals::{ConfirmDialog, PasswordDialog};
use crate::tasks::BackgroundTask;
use agent_host::AgentHost;
use providers::ModelError;
use services::TicketDraft;
use shared::settings::AppSettings;
use shared::{SystemMetadata, Transcript};
use std::path::PathBuf;

/// Actions that need a yes/no before they run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearChat,
    SendEmail,
}

/// A message box. Blocks the main window until dismissed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub is_error: bool,
    /// File the notice is about, offered as "Open Folder"
    pub path: Option<PathBuf>,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            is_error: false,
            path: None,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::info(title, body)
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// What the email worker reports back: the screenshot it attached, if any
pub type EmailOutcome = services::Result<Option<PathBuf>>;

/// Settings window state. Edits go to `draft` and only reach the live
/// settings on Save.
pub struct SettingsEditor {
    pub draft: AppSettings,
    pub available_models: Vec<String>,
    pub models_error: Option<String>,
    pub models_task: Option<BackgroundTask<Result<Vec<String>, ModelError>>>,
}

impl SettingsEditor {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            draft: settings.clone(),
            available_models: Vec::new(),
            models_error: None,
            models_task: None,
        }
    }
}

pub struct AppState {
    pub settings: AppSettings,
    /// Where settings are saved; `None` keeps them in memory only.
    pub config_path: Option<PathBuf>,
    pub metadata: SystemMetadata,
    pub transcript: Transcript,
    pub agent: AgentHost,

    pub input_text: String,
    pub status: String,
    pub scroll_to_bottom: bool,

    pub reply_task: Option<BackgroundTask<Result<String, ModelError>>>,
    pub screenshot_task: Option<BackgroundTask<services::Result<PathBuf>>>,
    pub email_task: Option<BackgroundTask<EmailOutcome>>,

    /// The ticket window is open while this is `Some`.
    pub ticket: Option<TicketDraft>,
    pub settings_editor: Option<SettingsEditor>,
    pub notice: Option<Notice>,
    pub confirm: ConfirmDialog<ConfirmAction>,
    pub password_dialog: PasswordDialog,
}
