//! Host metadata captured once per session and embedded in every ticket.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Placeholder used whenever a probe fails
pub const UNKNOWN: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMetadata {
    pub username: String,
    pub hostname: String,
    pub ip_address: String,
    pub os_info: String,
    pub runtime_version: String,
    pub serial_number: String,
    /// When the probe ran (local time)
    pub collected_at: NaiveDateTime,
}

impl SystemMetadata {
    /// `YYYY-MM-DD HH:MM:SS`, the ticket's "Created" value
    pub fn collected_at_label(&self) -> String {
        self.collected_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// One-line summary for the window header
    pub fn summary_line(&self) -> String {
        format!(
            "User: {} | Host: {} | OS: {}",
            self.username, self.hostname, self.os_info
        )
    }
}
