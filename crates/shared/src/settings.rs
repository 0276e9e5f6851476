//! Application settings.
//!
//! Everything the assistant needs from the outside world (model, generation
//! parameters, escalation keywords, SMTP account) lives here and is handed to
//! constructors explicitly. Nothing in the workspace reads global config.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "phi:2.7b";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Sampling parameters forwarded verbatim as the request's `options` object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1024,
            frequency_penalty: 0.5,
            presence_penalty: 0.3,
        }
    }
}

/// Which prompt template wraps the user's question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PromptStyle {
    #[default]
    Standard,
    Concise,
    Educational,
    Urgent,
}

impl PromptStyle {
    pub const ALL: [PromptStyle; 4] = [
        PromptStyle::Standard,
        PromptStyle::Concise,
        PromptStyle::Educational,
        PromptStyle::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Standard => "standard",
            PromptStyle::Concise => "concise",
            PromptStyle::Educational => "educational",
            PromptStyle::Urgent => "urgent",
        }
    }
}

/// Named bundles of generation options + prompt style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Balanced,
    Precise,
    Educational,
    Urgent,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Balanced,
        Preset::Precise,
        Preset::Educational,
        Preset::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Balanced => "balanced",
            Preset::Precise => "precise",
            Preset::Educational => "educational",
            Preset::Urgent => "urgent",
        }
    }

    pub fn from_name(name: &str) -> Option<Preset> {
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Options and prompt style this preset selects. Penalties keep their defaults.
    pub fn values(&self) -> (GenerationOptions, PromptStyle) {
        let base = GenerationOptions::default();
        match self {
            Preset::Balanced => (
                GenerationOptions {
                    temperature: 0.7,
                    top_p: 0.9,
                    max_tokens: 1024,
                    ..base
                },
                PromptStyle::Standard,
            ),
            Preset::Precise => (
                GenerationOptions {
                    temperature: 0.3,
                    top_p: 0.8,
                    max_tokens: 512,
                    ..base
                },
                PromptStyle::Concise,
            ),
            Preset::Educational => (
                GenerationOptions {
                    temperature: 0.6,
                    top_p: 0.9,
                    max_tokens: 1536,
                    ..base
                },
                PromptStyle::Educational,
            ),
            Preset::Urgent => (
                GenerationOptions {
                    temperature: 0.4,
                    top_p: 0.85,
                    max_tokens: 256,
                    ..base
                },
                PromptStyle::Urgent,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Ollama model tag, e.g. "phi:2.7b"
    pub name: String,
    /// Full URL of the generate endpoint
    pub endpoint: String,
    #[serde(default)]
    pub options: GenerationOptions,
    #[serde(default)]
    pub prompt_style: PromptStyle,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            options: GenerationOptions::default(),
            prompt_style: PromptStyle::default(),
        }
    }
}

/// Keyword lists for the escalation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationSettings {
    /// Severity topics (data loss, malware, ...)
    pub always_escalate: Vec<String>,
    /// Admin / system-modification topics
    pub escalation_triggers: Vec<String>,
}

impl Default for EscalationSettings {
    fn default() -> Self {
        let always = [
            "data loss",
            "security breach",
            "system crash",
            "hardware failure",
            "network outage",
            "virus infection",
            "malware",
            "ransomware",
            "blue screen",
            "boot failure",
        ];
        let triggers = [
            "admin",
            "administrator",
            "admin rights",
            "administrator rights",
            "system files",
            "registry",
            "permissions",
            "security settings",
            "install software",
            "update driver",
            "driver update",
            "software update",
            "modify system",
            "change settings",
            "access denied",
            "permission denied",
            "group policy",
            "windows update",
            "bios",
            "firmware",
            "hardware modification",
            "physical repair",
            "data recovery",
            "backup restore",
            "network configuration",
            "firewall",
            "antivirus",
            "security policy",
            "system policy",
        ];
        Self {
            always_escalate: always.iter().map(|s| s.to_string()).collect(),
            escalation_triggers: triggers.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    #[serde(default)]
    pub sender_password: String,
    pub recipient_email: String,
    pub use_tls: bool,
}

impl EmailSettings {
    pub fn is_configured(&self) -> bool {
        !self.sender_email.trim().is_empty() && !self.sender_password.is_empty()
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: "it-support@example.com".into(),
            use_tls: true,
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field(
                "sender_password",
                &if self.sender_password.is_empty() { "" } else { "***" },
            )
            .field("recipient_email", &self.recipient_email)
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub escalation: EscalationSettings,
    #[serde(default)]
    pub email: EmailSettings,
    /// Where tickets, reports and screenshots are written; None = working dir
    #[serde(default)]
    pub export_dir: Option<String>,
}

impl AppSettings {
    pub fn apply_preset(&mut self, preset: Preset) {
        let (options, style) = preset.values();
        self.model.options = options;
        self.model.prompt_style = style;
    }

    /// Human-readable problems with the current values; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let o = &self.model.options;

        if !(0.0..=2.0).contains(&o.temperature) {
            errors.push("Temperature must be between 0.0 and 2.0".to_string());
        }
        if !(0.0..=1.0).contains(&o.top_p) {
            errors.push("Top-p must be between 0.0 and 1.0".to_string());
        }
        if o.max_tokens < 1 {
            errors.push("Max tokens must be positive".to_string());
        }
        if !(-2.0..=2.0).contains(&o.frequency_penalty) {
            errors.push("Frequency penalty must be between -2.0 and 2.0".to_string());
        }
        if !(-2.0..=2.0).contains(&o.presence_penalty) {
            errors.push("Presence penalty must be between -2.0 and 2.0".to_string());
        }
        if self.model.name.trim().is_empty() {
            errors.push("Model name must not be empty".to_string());
        }
        if !(self.model.endpoint.starts_with("http://")
            || self.model.endpoint.starts_with("https://"))
        {
            errors.push("Endpoint must be an http:// or https:// URL".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = AppSettings::default();
        assert!(settings.validate().is_empty());
        assert_eq!(settings.model.name, DEFAULT_MODEL);
        assert_eq!(settings.escalation.always_escalate.len(), 10);
        assert!(settings
            .escalation
            .escalation_triggers
            .iter()
            .any(|t| t == "bios"));
    }

    #[test]
    fn test_validate_reports_out_of_range_values() {
        let mut settings = AppSettings::default();
        settings.model.options.temperature = 2.5;
        settings.model.options.top_p = 1.5;
        settings.model.options.max_tokens = 0;

        let errors = settings.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("Temperature"));
    }

    #[test]
    fn test_apply_preset() {
        let mut settings = AppSettings::default();
        settings.apply_preset(Preset::Precise);
        assert_eq!(settings.model.options.max_tokens, 512);
        assert_eq!(settings.model.prompt_style, PromptStyle::Concise);
        assert_eq!(Preset::from_name(" URGENT "), Some(Preset::Urgent));
        assert_eq!(Preset::from_name("fast"), None);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let json = r#"{ "model": { "name": "qwen3:4b", "endpoint": "http://10.0.0.2:11434/api/generate" } }"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.model.name, "qwen3:4b");
        assert_eq!(settings.model.options, GenerationOptions::default());
        assert_eq!(settings.email.smtp_port, 587);
        assert!(settings.export_dir.is_none());
    }

    #[test]
    fn test_email_debug_hides_password() {
        let mut email = EmailSettings::default();
        email.sender_password = "hunter2".into();
        let dbg = format!("{:?}", email);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("***"));
    }
}
