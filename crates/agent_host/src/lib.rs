//! Agent Host - support policy for the AskForHelp assistant
//!
//! This crate decides how the assistant treats a user message:
//! - whether it must be escalated to human IT support
//! - which prompt is sent to the model when it may be answered
//! - the canned replies used instead of the model

pub mod escalation;
pub mod prompts;

pub use escalation::{Escalation, EscalationKind, EscalationMatch, EscalationPolicy};
pub use prompts::{build_prompt, PromptContext};

/// How the assistant should answer a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Send this prompt to the model
    Ask(String),
    /// Answer locally and point the user at the ticket flow
    Escalated {
        matched: EscalationMatch,
        text: String,
    },
}

/// Plans replies from the escalation policy and the prompt style
#[derive(Clone, Debug)]
pub struct AgentHost {
    policy: EscalationPolicy,
    style: shared::settings::PromptStyle,
}

impl AgentHost {
    pub fn new(settings: &shared::settings::AppSettings) -> Self {
        Self {
            policy: EscalationPolicy::new(&settings.escalation),
            style: settings.model.prompt_style,
        }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn plan_reply(&self, metadata: &shared::SystemMetadata, user_message: &str) -> Reply {
        match self.policy.find_match(user_message) {
            Some(matched) => {
                tracing::info!(keyword = %matched.keyword, kind = ?matched.kind, "message escalated");
                let text = match matched.kind {
                    EscalationKind::Critical => prompts::urgent_reply().to_string(),
                    EscalationKind::AdminRequired => prompts::admin_required_reply(&matched.keyword),
                };
                Reply::Escalated { matched, text }
            }
            None => Reply::Ask(build_prompt(
                self.style,
                &PromptContext::new(metadata, user_message),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::settings::{AppSettings, PromptStyle};
    use shared::SystemMetadata;

    fn meta() -> SystemMetadata {
        SystemMetadata {
            username: "bob".into(),
            hostname: "DESK-7".into(),
            ip_address: "192.168.0.9".into(),
            os_info: "Windows 11".into(),
            runtime_version: "0.1.0".into(),
            serial_number: "Unknown".into(),
            collected_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_plan_reply_escalates_critical_topics() {
        let host = AgentHost::new(&AppSettings::default());
        match host.plan_reply(&meta(), "I think I have RANSOMWARE") {
            Reply::Escalated { matched, text } => {
                assert_eq!(matched.kind, EscalationKind::Critical);
                assert_eq!(text, prompts::urgent_reply());
            }
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_reply_escalates_admin_topics() {
        let host = AgentHost::new(&AppSettings::default());
        match host.plan_reply(&meta(), "please change my registry") {
            Reply::Escalated { matched, text } => {
                assert_eq!(matched.keyword, "registry");
                assert!(text.contains("administrative privileges"));
            }
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_reply_uses_configured_style() {
        let mut settings = AppSettings::default();
        settings.model.prompt_style = PromptStyle::Concise;
        let host = AgentHost::new(&settings);
        match host.plan_reply(&meta(), "Outlook keeps freezing") {
            Reply::Ask(prompt) => {
                assert!(prompt.contains("User: Outlook keeps freezing"));
                assert!(!prompt.contains("DESK-7"));
            }
            other => panic!("expected prompt, got {:?}", other),
        }
    }
}
