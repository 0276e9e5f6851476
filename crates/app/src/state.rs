//! State management for the AskForHelp app
//!
//! AppState methods invoked by the frame loop: chat, ticket actions,
//! screenshots, email and the settings editor. Slow work is handed to
//! [`BackgroundTask`]s and picked up again in [`AppState::poll_tasks`].

use crate::modals::{ConfirmDialog, ModalResult, PasswordDialog};
use crate::tasks::{block_on, poll_slot, BackgroundTask};
use crate::types::*;
use crate::utils::{
    clean_ai_response, copy_to_clipboard, format_model_error, model_error_status,
    resolve_export_dir, save_settings,
};
use agent_host::prompts::welcome_message;
use agent_host::{AgentHost, Reply};
use chrono::Local;
use providers::{pick_model, ModelError, OllamaClient};
use services::email::EmailSender;
use services::screenshot;
use services::{format_ticket, write_export, ExportKind, ServiceError, TicketDraft};
use shared::settings::{AppSettings, ModelSettings, Preset};
use shared::{Sender, SystemMetadata, Transcript};
use std::time::Duration;
use zeroize::Zeroizing;

const READY: &str = "Ready";
const SLOW_REPLY: Duration = Duration::from_secs(20);

/// Ask the model in the background. Runs entirely on the worker thread.
fn query_model(model: ModelSettings, prompt: String) -> Result<String, ModelError> {
    let client = OllamaClient::new(&model)?;
    block_on(async move { client.generate(&prompt).await })
        .map_err(|e| ModelError::Other(format!("Failed to start async runtime: {}", e)))?
}

fn list_models(model: ModelSettings) -> Result<Vec<String>, ModelError> {
    let client = OllamaClient::new(&model)?;
    block_on(async move { client.list_models().await })
        .map_err(|e| ModelError::Other(format!("Failed to start async runtime: {}", e)))?
}

impl AppState {
    pub fn new(settings: AppSettings, metadata: SystemMetadata) -> Self {
        for problem in settings.validate() {
            tracing::warn!(%problem, "invalid setting");
        }
        let mut state = Self {
            agent: AgentHost::new(&settings),
            settings,
            config_path: None,
            metadata,
            transcript: Transcript::new(),
            input_text: String::new(),
            status: READY.to_string(),
            scroll_to_bottom: true,
            reply_task: None,
            screenshot_task: None,
            email_task: None,
            ticket: None,
            settings_editor: None,
            notice: None,
            confirm: ConfirmDialog::new("confirm_dialog"),
            password_dialog: PasswordDialog::new("email_password"),
        };
        state.show_welcome();
        state
    }

    pub fn is_thinking(&self) -> bool {
        self.reply_task.is_some()
    }

    /// True while any background job is outstanding, so the UI keeps polling.
    pub fn has_pending_tasks(&self) -> bool {
        self.reply_task.is_some()
            || self.screenshot_task.is_some()
            || self.email_task.is_some()
            || self
                .settings_editor
                .as_ref()
                .map_or(false, |e| e.models_task.is_some())
    }

    fn show_welcome(&mut self) {
        let text = welcome_message(&self.metadata);
        self.transcript.append(Sender::System, text, true);
        self.scroll_to_bottom = true;
    }

    fn push_system(&mut self, text: impl Into<String>) {
        self.transcript.append(Sender::System, text, true);
        self.scroll_to_bottom = true;
    }

    /// Send the input line. Escalated topics are answered locally; anything
    /// else goes to the model on a background task.
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() || self.is_thinking() {
            return;
        }
        self.input_text.clear();
        self.transcript.append(Sender::User, text.clone(), false);
        self.scroll_to_bottom = true;

        match self.agent.plan_reply(&self.metadata, &text) {
            Reply::Escalated { text, .. } => {
                self.transcript.append(Sender::Assistant, text, false);
                self.status = READY.to_string();
            }
            Reply::Ask(prompt) => {
                let model = self.settings.model.clone();
                self.status = "Thinking...".to_string();
                self.reply_task = Some(BackgroundTask::spawn("model reply", move || {
                    query_model(model, prompt)
                }));
            }
        }
    }

    pub fn poll_tasks(&mut self) {
        self.poll_reply();
        self.poll_screenshot();
        self.poll_email();
        self.poll_models();
    }

    fn poll_reply(&mut self) {
        let Some(outcome) = poll_slot(&mut self.reply_task) else {
            if self
                .reply_task
                .as_ref()
                .map_or(false, |t| t.elapsed() >= SLOW_REPLY)
            {
                self.status = "Still thinking... local models can take a minute".to_string();
            }
            return;
        };
        match outcome {
            Ok(Ok(response)) => {
                self.transcript
                    .append(Sender::Assistant, clean_ai_response(&response), false);
                self.scroll_to_bottom = true;
                self.status = READY.to_string();
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "model request failed");
                self.push_system(format_model_error(&e));
                self.status = model_error_status(&e).to_string();
            }
            Err(failed) => {
                self.push_system(format!("❌ Error: {}", failed));
                self.status = "Error".to_string();
            }
        }
    }

    pub fn request_clear(&mut self) {
        self.confirm
            .ask("Confirm", "Clear all chat history?", ConfirmAction::ClearChat);
    }

    pub fn clear_chat(&mut self) {
        self.transcript.clear();
        self.show_welcome();
        self.status = READY.to_string();
        tracing::info!("chat cleared");
    }

    /// Apply the answer from the confirmation dialog.
    pub fn handle_confirm_result(&mut self, result: ModalResult<ConfirmAction>) {
        match result.take_value() {
            Some(ConfirmAction::ClearChat) => self.clear_chat(),
            Some(ConfirmAction::SendEmail) => self.begin_send_email(),
            None => {}
        }
    }

    pub fn handle_password_result(&mut self, result: ModalResult<Zeroizing<String>>) {
        if let Some(password) = result.take_value() {
            self.start_email(Some(password));
        }
    }

    /// Render the ticket once and open the ticket window on it.
    pub fn generate_ticket(&mut self) {
        let draft = TicketDraft::new(&self.metadata, &self.transcript, Local::now().naive_local());
        tracing::info!(ticket = %draft.id, "ticket generated");
        self.ticket = Some(draft);
    }

    pub fn close_ticket(&mut self) {
        self.ticket = None;
    }

    pub fn copy_ticket(&mut self) {
        let Some(draft) = &self.ticket else { return };
        self.notice = Some(match copy_to_clipboard(&draft.body) {
            Ok(()) => Notice::info("Copied", "Ticket copied to clipboard!"),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "clipboard copy failed");
                Notice::error("Clipboard Error", format!("{:#}", e))
            }
        });
    }

    pub fn save_ticket(&mut self) {
        let Some(draft) = &self.ticket else { return };
        let dir = resolve_export_dir(&self.settings);
        let result = write_export(
            &dir,
            ExportKind::Ticket,
            &self.metadata.hostname,
            Local::now().naive_local(),
            &draft.body,
        );
        self.notice = Some(match result {
            Ok(path) => Notice::info("Saved", format!("Ticket saved as {}", path.display()))
                .with_path(path),
            Err(e) => Notice::error("Save Error", format!("Failed to save ticket:\n{}", e)),
        });
    }

    /// Same layout as a ticket, written as a report from the main window.
    pub fn export_report(&mut self) {
        let now = Local::now().naive_local();
        let report = format_ticket(&self.metadata, &self.transcript, now);
        let dir = resolve_export_dir(&self.settings);
        self.notice = Some(
            match write_export(&dir, ExportKind::Report, &self.metadata.hostname, now, &report) {
                Ok(path) => Notice::info(
                    "Export Successful",
                    format!("Report saved as:\n{}", path.display()),
                )
                .with_path(path),
                Err(e) => Notice::error("Export Error", format!("Failed to export report:\n{}", e)),
            },
        );
    }

    pub fn capture_screenshot(&mut self) {
        if self.screenshot_task.is_some() {
            return;
        }
        let dir = resolve_export_dir(&self.settings);
        let hostname = self.metadata.hostname.clone();
        self.status = "Capturing screenshot...".to_string();
        self.screenshot_task = Some(BackgroundTask::spawn("screenshot", move || {
            screenshot::capture(&dir, &hostname, Local::now().naive_local())
        }));
    }

    fn poll_screenshot(&mut self) {
        let Some(outcome) = poll_slot(&mut self.screenshot_task) else {
            return;
        };
        match outcome {
            Ok(Ok(path)) => {
                self.status = READY.to_string();
                self.notice = Some(
                    Notice::info(
                        "Screenshot Captured",
                        format!("Screenshot saved as:\n{}", path.display()),
                    )
                    .with_path(path),
                );
            }
            Ok(Err(e)) => self.fail("Screenshot Error", e.to_string()),
            Err(failed) => self.fail("Screenshot Error", failed.to_string()),
        }
    }

    pub fn request_send_email(&mut self) {
        if self.ticket.is_none() || self.email_task.is_some() {
            return;
        }
        self.confirm.ask(
            "Send Email",
            format!(
                "Send ticket to:\n{}?",
                self.settings.email.recipient_email.trim()
            ),
            ConfirmAction::SendEmail,
        );
    }

    /// After the user confirmed: send right away, or ask for the password
    /// first when none is stored.
    fn begin_send_email(&mut self) {
        let email = &self.settings.email;
        if email.sender_email.trim().is_empty() {
            self.notice = Some(Notice::error(
                "Email Error",
                ServiceError::EmailNotConfigured.to_string(),
            ));
            return;
        }
        if email.sender_password.is_empty() {
            self.password_dialog.open_with_message(format!(
                "Enter the password for {}.\nGmail accounts need an App Password.",
                email.sender_email.trim()
            ));
            return;
        }
        self.start_email(None);
    }

    /// `password` overrides the stored one for this send only.
    fn start_email(&mut self, password: Option<Zeroizing<String>>) {
        let Some(draft) = self.ticket.clone() else {
            return;
        };
        let mut sender = EmailSender::new(&self.settings.email);
        if let Some(password) = password {
            sender = sender.with_password(password);
        }
        let metadata = self.metadata.clone();
        let dir = resolve_export_dir(&self.settings);
        self.status = "Sending email...".to_string();
        self.email_task = Some(BackgroundTask::spawn("email", move || {
            let attachment = screenshot::latest_screenshot(&dir, &metadata.hostname);
            sender.send(&metadata, &draft, attachment.as_deref())?;
            Ok(attachment)
        }));
    }

    fn poll_email(&mut self) {
        let Some(outcome) = poll_slot(&mut self.email_task) else {
            return;
        };
        match outcome {
            Ok(Ok(attachment)) => {
                self.status = READY.to_string();
                let attached = match attachment.as_ref().and_then(|p| p.file_name()) {
                    Some(name) => format!("Screenshot attached: {}", name.to_string_lossy()),
                    None => "No screenshot found to attach.".to_string(),
                };
                self.notice = Some(Notice::info(
                    "Email Sent",
                    format!(
                        "Ticket sent to {}.\n\n{}",
                        self.settings.email.recipient_email.trim(),
                        attached
                    ),
                ));
            }
            Ok(Err(e)) => {
                self.status = "Email Failed".to_string();
                self.notice = Some(Notice::error("Email Error", e.to_string()));
            }
            Err(failed) => {
                self.status = "Email Failed".to_string();
                self.notice = Some(Notice::error("Email Error", failed.to_string()));
            }
        }
    }

    fn fail(&mut self, title: &str, body: String) {
        tracing::warn!(%title, error = %body, "operation failed");
        self.status = "Error".to_string();
        self.notice = Some(Notice::error(title, body));
    }

    pub fn open_settings(&mut self) {
        self.settings_editor = Some(SettingsEditor::new(&self.settings));
        self.refresh_models();
    }

    pub fn close_settings(&mut self) {
        self.settings_editor = None;
    }

    /// Ask the model server which models it has, against the endpoint
    /// currently typed into the editor.
    pub fn refresh_models(&mut self) {
        let Some(editor) = self.settings_editor.as_mut() else {
            return;
        };
        if editor.models_task.is_some() {
            return;
        }
        let model = editor.draft.model.clone();
        editor.models_error = None;
        editor.models_task = Some(BackgroundTask::spawn("model list", move || {
            list_models(model)
        }));
    }

    fn poll_models(&mut self) {
        let Some(editor) = self.settings_editor.as_mut() else {
            return;
        };
        let Some(outcome) = poll_slot(&mut editor.models_task) else {
            return;
        };
        match outcome {
            Ok(Ok(models)) => {
                let picked = pick_model(&editor.draft.model.name, &models);
                if picked != editor.draft.model.name {
                    tracing::info!(from = %editor.draft.model.name, to = %picked, "configured model not installed");
                    editor.draft.model.name = picked;
                }
                editor.available_models = models;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "could not list models");
                editor.models_error = Some(e.to_string());
                editor.available_models = vec![editor.draft.model.name.clone()];
            }
            Err(failed) => {
                editor.models_error = Some(failed.to_string());
            }
        }
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        if let Some(editor) = self.settings_editor.as_mut() {
            editor.draft.apply_preset(preset);
        }
    }

    /// Validate the draft and make it live. Returns false (and keeps the
    /// window open) when the draft has problems.
    pub fn save_settings_from_editor(&mut self) -> bool {
        let Some(editor) = self.settings_editor.as_mut() else {
            return false;
        };
        let problems = editor.draft.validate();
        if !problems.is_empty() {
            tracing::warn!(?problems, "settings not saved");
            return false;
        }
        for list in [
            &mut editor.draft.escalation.always_escalate,
            &mut editor.draft.escalation.escalation_triggers,
        ] {
            list.retain(|k| !k.trim().is_empty());
        }

        self.settings = editor.draft.clone();
        self.agent = AgentHost::new(&self.settings);
        self.settings_editor = None;

        if let Some(path) = &self.config_path {
            if let Err(e) = save_settings(path, &self.settings) {
                tracing::warn!(error = %format!("{:#}", e), "saving settings failed");
                self.notice = Some(Notice::error("Settings Error", format!("{:#}", e)));
                return true;
            }
        }
        self.status = "Settings saved".to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modals::Modal;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn meta() -> SystemMetadata {
        SystemMetadata {
            username: "alice".into(),
            hostname: "PC1".into(),
            ip_address: "10.0.0.7".into(),
            os_info: "Linux 6.1".into(),
            runtime_version: "AskForHelp 0.1.0".into(),
            serial_number: "XYZ123".into(),
            collected_at: NaiveDate::from_ymd_opt(2024, 5, 6)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
        }
    }

    fn state_in(dir: &TempDir) -> AppState {
        let settings = AppSettings {
            export_dir: Some(dir.path().to_string_lossy().to_string()),
            ..AppSettings::default()
        };
        AppState::new(settings, meta())
    }

    #[test]
    fn test_starts_with_welcome_message() {
        let state = AppState::new(AppSettings::default(), meta());
        assert_eq!(state.transcript.len(), 1);
        let first = state.transcript.iter().next().unwrap();
        assert_eq!(first.sender, Sender::System);
        assert!(first.is_system);
        assert!(!state.transcript.has_user_messages());
        assert_eq!(state.status, "Ready");
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut state = AppState::new(AppSettings::default(), meta());
        state.input_text = "   ".into();
        state.send_message();
        assert_eq!(state.transcript.len(), 1);
        assert!(!state.is_thinking());
    }

    #[test]
    fn test_escalated_message_is_answered_locally() {
        let mut state = AppState::new(AppSettings::default(), meta());
        state.input_text = "Can you help with admin rights?".into();
        state.send_message();

        assert!(state.input_text.is_empty());
        assert!(!state.is_thinking());
        let senders: Vec<Sender> = state.transcript.iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::System, Sender::User, Sender::Assistant]);
    }

    #[test]
    fn test_model_failure_becomes_system_notice() {
        let mut state = AppState::new(AppSettings::default(), meta());
        state.reply_task = Some(BackgroundTask::spawn("model reply", || {
            Err(ModelError::Status {
                status: 500,
                body: "boom".into(),
            })
        }));
        while state.reply_task.is_some() {
            state.poll_tasks();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let last = state.transcript.iter().last().unwrap();
        assert!(last.is_system);
        assert_eq!(last.text, "API Error: 500 - boom");
        assert_eq!(state.status, "Error");
    }

    #[test]
    fn test_model_reply_is_cleaned_and_appended() {
        let mut state = AppState::new(AppSettings::default(), meta());
        state.reply_task = Some(BackgroundTask::spawn("model reply", || {
            Ok("<think>hmm</think>\nTry a different USB port.".to_string())
        }));
        while state.reply_task.is_some() {
            state.poll_tasks();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let last = state.transcript.iter().last().unwrap();
        assert_eq!(last.sender, Sender::Assistant);
        assert_eq!(last.text, "Try a different USB port.");
        assert_eq!(state.status, "Ready");
    }

    #[test]
    fn test_clear_asks_then_rewelcomes() {
        let mut state = AppState::new(AppSettings::default(), meta());
        state.input_text = "The registry editor is locked".into();
        state.send_message();
        assert!(state.transcript.len() > 1);

        state.request_clear();
        assert!(state.confirm.is_open());
        state.confirm.close();
        let answer = state.confirm.take_result();
        state.handle_confirm_result(answer);
        assert!(state.transcript.len() > 1);

        state.request_clear();
        state.handle_confirm_result(ModalResult::Confirmed(ConfirmAction::ClearChat));
        assert_eq!(state.transcript.len(), 1);
        assert!(!state.transcript.has_user_messages());

        state.transcript.append(Sender::User, "hello again", false);
        assert_eq!(state.transcript.len(), 2);
    }

    #[test]
    fn test_ticket_save_and_report_export() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.transcript.append(Sender::User, "printer offline", false);

        state.generate_ticket();
        let draft = state.ticket.clone().unwrap();
        assert!(draft.id.starts_with("PC1-"));

        state.save_ticket();
        let notice = state.notice.take().unwrap();
        assert!(!notice.is_error);
        let saved = notice.path.unwrap();
        assert!(saved
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("IT_Ticket_PC1_"));
        assert_eq!(std::fs::read_to_string(&saved).unwrap(), draft.body);

        state.export_report();
        let notice = state.notice.take().unwrap();
        assert_eq!(notice.title, "Export Successful");
        let report = notice.path.unwrap();
        assert!(report
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("AskForHelp_Report_PC1_"));
        assert!(std::fs::read_to_string(&report)
            .unwrap()
            .contains("  - printer offline"));
    }

    #[test]
    fn test_ticket_after_clear_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.transcript.append(Sender::User, "printer offline", false);
        state.clear_chat();

        state.generate_ticket();
        assert!(state.notice.is_none());
        let draft = state.ticket.as_ref().unwrap();
        assert!(draft
            .body
            .contains("  [No specific problem description provided]"));
        assert!(!draft.body.contains("printer offline"));
    }

    #[test]
    fn test_email_without_sender_reports_not_configured() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.generate_ticket();

        state.request_send_email();
        assert!(state.confirm.is_open());
        state.handle_confirm_result(ModalResult::Confirmed(ConfirmAction::SendEmail));

        assert!(state.email_task.is_none());
        let notice = state.notice.take().unwrap();
        assert!(notice.is_error);
        assert!(notice.body.contains("not configured"));
    }

    #[test]
    fn test_email_without_password_prompts_for_it() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.settings.email.sender_email = "helpdesk-bot@example.com".into();
        state.generate_ticket();

        state.handle_confirm_result(ModalResult::Confirmed(ConfirmAction::SendEmail));
        assert!(state.password_dialog.is_open());
        assert!(state.email_task.is_none());

        state.handle_password_result(ModalResult::Cancelled);
        assert!(state.email_task.is_none());
    }

    #[test]
    fn test_typed_password_is_not_stored_in_settings() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.settings.email.sender_email = "helpdesk-bot@example.com".into();
        // Fails at address parsing, before any connection is made
        state.settings.email.recipient_email = "not an address".into();
        state.generate_ticket();

        state.handle_password_result(ModalResult::Confirmed(Zeroizing::new(
            "typed-in".to_string(),
        )));
        assert!(state.email_task.is_some());
        assert!(state.settings.email.sender_password.is_empty());

        while state.email_task.is_some() {
            state.poll_tasks();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let notice = state.notice.take().unwrap();
        assert!(notice.is_error);
        assert!(notice.body.contains("not an address"));
        assert_eq!(state.status, "Email Failed");
    }

    #[test]
    fn test_settings_editor_validates_before_saving() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.config_path = Some(dir.path().join("settings.json"));
        state.settings_editor = Some(SettingsEditor::new(&state.settings));

        state
            .settings_editor
            .as_mut()
            .unwrap()
            .draft
            .model
            .options
            .temperature = 5.0;
        assert!(!state.save_settings_from_editor());
        assert!(state.settings_editor.is_some());
        assert!(!dir.path().join("settings.json").exists());

        state.apply_preset(Preset::Precise);
        {
            let draft = &mut state.settings_editor.as_mut().unwrap().draft;
            draft.model.name = "llama3:8b".into();
            draft.escalation.escalation_triggers.push("   ".into());
        }
        assert!(state.save_settings_from_editor());
        assert!(state.settings_editor.is_none());
        assert_eq!(state.settings.model.name, "llama3:8b");
        assert!(state
            .settings
            .escalation
            .escalation_triggers
            .iter()
            .all(|k| !k.trim().is_empty()));
        assert!(dir.path().join("settings.json").exists());
    }
}
