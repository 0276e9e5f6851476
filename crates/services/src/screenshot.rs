//! Full-screen capture through the platform's own screenshot tool, and
//! lookup of the newest capture for email attachments.

use crate::error::{Result, ServiceError};
use crate::export::sanitize_file_component;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

/// `Screenshot_{hostname}_{YYYYMMDD_HHMMSS}.png`
pub fn screenshot_file_name(hostname: &str, now: NaiveDateTime) -> String {
    format!(
        "{}_{}.png",
        screenshot_prefix(hostname),
        now.format("%Y%m%d_%H%M%S")
    )
}

fn screenshot_prefix(hostname: &str) -> String {
    format!("Screenshot_{}", sanitize_file_component(hostname))
}

/// Capture the whole screen into `dir`.
pub fn capture(dir: &Path, hostname: &str, now: NaiveDateTime) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ServiceError::io(dir, e))?;
    let path = dir.join(screenshot_file_name(hostname, now));

    run_capture_tool(&path)?;

    if !path.exists() {
        return Err(ServiceError::Screenshot(
            "the capture tool finished but wrote no file".to_string(),
        ));
    }
    tracing::info!(path = %path.display(), "screenshot saved");
    Ok(path)
}

#[cfg(target_os = "macos")]
fn run_capture_tool(path: &Path) -> Result<()> {
    let status = Command::new("screencapture")
        .arg("-x")
        .arg(path)
        .status()
        .map_err(|e| ServiceError::Screenshot(format!("screencapture: {}", e)))?;
    if status.success() {
        Ok(())
    } else {
        Err(ServiceError::Screenshot(
            "screencapture failed. Check Screen Recording permission in System Settings."
                .to_string(),
        ))
    }
}

#[cfg(target_os = "windows")]
fn run_capture_tool(path: &Path) -> Result<()> {
    let script = format!(
        "Add-Type -AssemblyName System.Windows.Forms; Add-Type -AssemblyName System.Drawing; \
         $b = [System.Windows.Forms.SystemInformation]::VirtualScreen; \
         $bmp = New-Object System.Drawing.Bitmap $b.Width, $b.Height; \
         $g = [System.Drawing.Graphics]::FromImage($bmp); \
         $g.CopyFromScreen($b.Left, $b.Top, 0, 0, $bmp.Size); \
         $bmp.Save('{}', [System.Drawing.Imaging.ImageFormat]::Png); \
         $g.Dispose(); $bmp.Dispose()",
        path.display().to_string().replace('\'', "''")
    );
    let output = Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .output()
        .map_err(|e| ServiceError::Screenshot(format!("powershell: {}", e)))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ServiceError::Screenshot(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn run_capture_tool(path: &Path) -> Result<()> {
    let target = path.to_string_lossy().to_string();
    // Wayland first, then desktop tools, then X11 fallbacks.
    let candidates: [(&str, Vec<&str>); 5] = [
        ("grim", vec![target.as_str()]),
        ("gnome-screenshot", vec!["-f", target.as_str()]),
        ("spectacle", vec!["-b", "-n", "-o", target.as_str()]),
        ("import", vec!["-window", "root", target.as_str()]),
        ("scrot", vec!["-o", target.as_str()]),
    ];

    let mut tried = Vec::new();
    for (tool, args) in candidates.iter() {
        match Command::new(tool).args(args).output() {
            Ok(out) if out.status.success() && path.exists() => return Ok(()),
            Ok(out) => {
                tracing::debug!(tool, status = ?out.status, "screenshot tool failed");
                tried.push(tool.to_string());
            }
            Err(_) => continue,
        }
    }

    if tried.is_empty() {
        Err(ServiceError::Screenshot(
            "no screenshot tool found (install grim, gnome-screenshot, spectacle, ImageMagick or scrot)"
                .to_string(),
        ))
    } else {
        Err(ServiceError::Screenshot(format!(
            "capture failed with: {}",
            tried.join(", ")
        )))
    }
}

/// Newest `Screenshot_{hostname}*.png` in `dir`, by creation time (falling
/// back to modification time where the filesystem has no birth time).
pub fn latest_screenshot(dir: &Path, hostname: &str) -> Option<PathBuf> {
    let prefix = screenshot_prefix(hostname);
    let entries = fs::read_dir(dir).ok()?;

    entries
        .flatten()
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with(&prefix) && name.ends_with(".png")
        })
        .filter_map(|e| {
            let meta = e.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            let stamp = meta
                .created()
                .or_else(|_| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((stamp, e.path()))
        })
        .max_by_key(|(stamp, _)| *stamp)
        .map(|(_, path)| path)
}
