//! Ticket delivery over SMTP.

use crate::error::{Result, ServiceError};
use crate::ticket::{email_subject, format_email_body, TicketDraft};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use shared::settings::EmailSettings;
use shared::SystemMetadata;
use std::path::Path;
use std::time::Duration;
use zeroize::Zeroizing;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EmailSender {
    /// Server and addresses; the password is held separately
    settings: EmailSettings,
    password: Zeroizing<String>,
}

impl EmailSender {
    pub fn new(settings: &EmailSettings) -> Self {
        let mut settings = settings.clone();
        let password = Zeroizing::new(std::mem::take(&mut settings.sender_password));
        Self { settings, password }
    }

    /// Use a password typed in for this send instead of the stored one.
    pub fn with_password(mut self, password: Zeroizing<String>) -> Self {
        self.password = password;
        self
    }

    pub fn ensure_configured(&self) -> Result<()> {
        if !self.settings.sender_email.trim().is_empty() && !self.password.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::EmailNotConfigured)
        }
    }

    /// Build the ticket email. The screenshot, when given, rides along as an
    /// `image/png` attachment under its own file name.
    pub fn build_message(
        &self,
        metadata: &SystemMetadata,
        draft: &TicketDraft,
        screenshot: Option<&Path>,
    ) -> Result<Message> {
        let from = parse_mailbox(&self.settings.sender_email)?;
        let to = parse_mailbox(&self.settings.recipient_email)?;

        let body = format_email_body(metadata, &draft.id, &draft.body);
        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body));

        if let Some(path) = screenshot {
            let bytes = std::fs::read(path).map_err(|e| ServiceError::io(path, e))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "screenshot.png".to_string());
            let png = ContentType::parse("image/png")
                .map_err(|e| ServiceError::Email(e.to_string()))?;
            parts = parts.singlepart(Attachment::new(filename).body(bytes, png));
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(email_subject(&draft.id))
            .multipart(parts)
            .map_err(|e| ServiceError::Email(e.to_string()))
    }

    /// Build and send the ticket email. Blocks until the server answers.
    pub fn send(
        &self,
        metadata: &SystemMetadata,
        draft: &TicketDraft,
        screenshot: Option<&Path>,
    ) -> Result<()> {
        self.ensure_configured()?;
        let message = self.build_message(metadata, draft, screenshot)?;

        let s = &self.settings;
        let builder = if s.use_tls {
            SmtpTransport::starttls_relay(&s.smtp_server)
                .map_err(|e| ServiceError::Email(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&s.smtp_server)
        };
        let mailer = builder
            .port(s.smtp_port)
            .timeout(Some(SMTP_TIMEOUT))
            .credentials(Credentials::new(
                s.sender_email.trim().to_string(),
                self.password.as_str().to_string(),
            ))
            .build();

        tracing::info!(
            server = %s.smtp_server,
            port = s.smtp_port,
            ticket = %draft.id,
            attachment = screenshot.is_some(),
            "sending ticket email"
        );

        match mailer.send(&message) {
            Ok(_) => Ok(()),
            Err(e) => {
                let code = e.status().map(|c| c.to_string());
                tracing::warn!(error = %e, ?code, "ticket email failed");
                match code.as_deref() {
                    Some("535") | Some("534") | Some("530") => Err(ServiceError::EmailAuth),
                    _ => Err(ServiceError::Email(e.to_string())),
                }
            }
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    let trimmed = address.trim();
    trimmed
        .parse::<Mailbox>()
        .map_err(|_| ServiceError::Address(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::Transcript;
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

    fn draft() -> TicketDraft {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(10, 30, 45)
            .unwrap();
        TicketDraft::new(&meta(), &Transcript::new(), now)
    }

    fn configured() -> EmailSettings {
        EmailSettings {
            sender_email: "helpdesk-bot@example.com".into(),
            sender_password: "app-password".into(),
            ..EmailSettings::default()
        }
    }

    #[test]
    fn test_unconfigured_sender_is_rejected_before_network() {
        let sender = EmailSender::new(&EmailSettings::default());
        assert!(matches!(
            sender.send(&meta(), &draft(), None),
            Err(ServiceError::EmailNotConfigured)
        ));
    }

    #[test]
    fn test_typed_password_replaces_stored_one() {
        let sender = EmailSender::new(&configured());
        assert!(sender.settings.sender_password.is_empty());
        assert_eq!(sender.password.as_str(), "app-password");

        let settings = EmailSettings {
            sender_password: String::new(),
            ..configured()
        };
        let sender = EmailSender::new(&settings);
        assert!(matches!(
            sender.ensure_configured(),
            Err(ServiceError::EmailNotConfigured)
        ));

        let sender = sender.with_password(Zeroizing::new("typed-in".to_string()));
        assert!(sender.ensure_configured().is_ok());
        assert_eq!(sender.password.as_str(), "typed-in");
    }

    #[test]
    fn test_bad_recipient_address() {
        let settings = EmailSettings {
            recipient_email: "not an address".into(),
            ..configured()
        };
        let sender = EmailSender::new(&settings);
        assert!(matches!(
            sender.build_message(&meta(), &draft(), None),
            Err(ServiceError::Address(_))
        ));
    }

    #[test]
    fn test_message_headers_and_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let shot = temp_dir.path().join("Screenshot_PC1_20240506_103000.png");
        std::fs::write(&shot, [0x89, b'P', b'N', b'G']).unwrap();

        let sender = EmailSender::new(&configured());
        let message = sender.build_message(&meta(), &draft(), Some(&shot)).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: IT Support Ticket - PC1-20240506-103045"));
        assert!(raw.contains("it-support@example.com"));
        assert!(raw.contains("image/png"));
        assert!(raw.contains("Screenshot_PC1_20240506_103000.png"));
    }

    #[test]
    fn test_message_without_attachment() {
        let sender = EmailSender::new(&configured());
        let message = sender.build_message(&meta(), &draft(), None).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(!raw.contains("image/png"));
    }
}
