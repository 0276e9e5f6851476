//! Ticket formatting.
//!
//! A ticket is a pure function of the host metadata, the transcript and the
//! moment it was generated. `now` only appears in the ticket id, at second
//! resolution, so two calls within the same second produce identical text.

use chrono::NaiveDateTime;
use shared::{Sender, SystemMetadata, Transcript};
use std::fmt::Write;

const RULE_WIDTH: usize = 70;
const SECTION_RULE: &str = "------------------";
const MAX_PROBLEM_LINES: usize = 3;
const NO_PROBLEM_PLACEHOLDER: &str = "  [No specific problem description provided]";

/// `{hostname}-{YYYYMMDD-HHMMSS}`
pub fn ticket_id(metadata: &SystemMetadata, now: NaiveDateTime) -> String {
    format!("{}-{}", metadata.hostname, now.format("%Y%m%d-%H%M%S"))
}

pub fn format_ticket(
    metadata: &SystemMetadata,
    transcript: &Transcript,
    now: NaiveDateTime,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        "
{rule}
IT SUPPORT TICKET - AskForHelp System
{rule}

TICKET INFORMATION
{SECTION_RULE}
Ticket ID:      {id}
Created:        {created}
Status:         NEW
Priority:       To be determined

SYSTEM INFORMATION
{SECTION_RULE}
Username:       {username}
Hostname:       {hostname}
IP Address:     {ip}
Operating System: {os}
Runtime Version: {runtime}
Serial Number:  {serial}

PROBLEM DESCRIPTION
{SECTION_RULE}
",
        id = ticket_id(metadata, now),
        created = metadata.collected_at_label(),
        username = metadata.username,
        hostname = metadata.hostname,
        ip = metadata.ip_address,
        os = metadata.os_info,
        runtime = metadata.runtime_version,
        serial = metadata.serial_number,
    );

    let problems = transcript.messages_from(Sender::User);
    if problems.is_empty() {
        out.push_str(NO_PROBLEM_PLACEHOLDER);
        out.push('\n');
    } else {
        out.push_str("User's initial description:\n");
        for msg in problems.iter().take(MAX_PROBLEM_LINES) {
            let _ = writeln!(out, "  - {}", msg.text);
        }
    }

    let _ = write!(out, "\nCHAT HISTORY SUMMARY\n{SECTION_RULE}\n");
    for msg in transcript.non_system_messages() {
        let _ = write!(
            out,
            "[{}] {}:\n  {}\n\n",
            msg.timestamp_label(),
            msg.sender.display_name(),
            msg.text
        );
    }

    let _ = write!(
        out,
        "
{rule}
ADDITIONAL NOTES
{rule}
• This ticket was generated using AskForHelp AI Assistant
• All system information has been automatically collected
• Please review and update priority as needed
• Contact IT Support for immediate assistance

{rule}
END OF TICKET
{rule}
"
    );

    out
}

/// A ticket rendered once and then shared by copy, save and email so all
/// three carry the same id and text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketDraft {
    pub id: String,
    pub body: String,
    pub generated_at: NaiveDateTime,
}

impl TicketDraft {
    pub fn new(metadata: &SystemMetadata, transcript: &Transcript, now: NaiveDateTime) -> Self {
        Self {
            id: ticket_id(metadata, now),
            body: format_ticket(metadata, transcript, now),
            generated_at: now,
        }
    }
}

pub fn email_subject(ticket_id: &str) -> String {
    format!("IT Support Ticket - {}", ticket_id)
}

/// Plain-text email body wrapping a rendered ticket
pub fn format_email_body(metadata: &SystemMetadata, ticket_id: &str, ticket: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "
IT Support Ticket Request

A new ticket has been generated using AskForHelp AI Assistant.

Ticket ID: {ticket_id}
User: {}
Hostname: {}
IP Address: {}
OS: {}
Timestamp: {}

Please see the attached ticket content below:

{rule}
{ticket}
{rule}

This email was sent automatically by AskForHelp Chatbot.
",
        metadata.username,
        metadata.hostname,
        metadata.ip_address,
        metadata.os_info,
        metadata.collected_at_label(),
    )
}
