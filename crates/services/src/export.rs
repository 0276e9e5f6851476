//! Flat-file export of tickets and reports.

use crate::error::{Result, ServiceError};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    /// Saved from the ticket window
    Ticket,
    /// Saved from the main window's "Export Report" button
    Report,
}

impl ExportKind {
    fn prefix(&self) -> &'static str {
        match self {
            ExportKind::Ticket => "IT_Ticket",
            ExportKind::Report => "AskForHelp_Report",
        }
    }
}

/// `IT_Ticket_{hostname}_{YYYYMMDD_HHMMSS}.txt` and friends
pub fn export_file_name(kind: ExportKind, hostname: &str, now: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.txt",
        kind.prefix(),
        sanitize_file_component(hostname),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Write `content` to a new export file in `dir` with a single write call.
pub fn write_export(
    dir: &Path,
    kind: ExportKind,
    hostname: &str,
    now: NaiveDateTime,
    content: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ServiceError::io(dir, e))?;
    let path = dir.join(export_file_name(kind, hostname, now));
    fs::write(&path, content.as_bytes()).map_err(|e| ServiceError::io(&path, e))?;
    tracing::info!(path = %path.display(), ?kind, "export written");
    Ok(path)
}

/// Hostnames are user-controlled on some systems; keep them path-safe.
pub(crate) fn sanitize_file_component(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap()
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(
            export_file_name(ExportKind::Ticket, "PC1", now()),
            "IT_Ticket_PC1_20241231_235958.txt"
        );
        assert_eq!(
            export_file_name(ExportKind::Report, "PC1", now()),
            "AskForHelp_Report_PC1_20241231_235958.txt"
        );
        assert_eq!(
            export_file_name(ExportKind::Ticket, "bad/host name", now()),
            "IT_Ticket_bad_host_name_20241231_235958.txt"
        );
    }

    #[test]
    fn test_write_export_round_trips_content() {
        let temp_dir = TempDir::new().unwrap();
        let content = "line one\nline two • bullet\n";
        let path = write_export(temp_dir.path(), ExportKind::Ticket, "PC1", now(), content).unwrap();

        assert_eq!(path.parent().unwrap(), temp_dir.path());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_write_export_creates_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("tickets").join("2024");
        let path = write_export(&nested, ExportKind::Report, "PC1", now(), "x").unwrap();
        assert!(path.exists());
    }
}
