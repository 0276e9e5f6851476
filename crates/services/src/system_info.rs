//! Host metadata gathered once at startup and embedded in every ticket.
//!
//! Each field is collected independently; a probe that fails leaves
//! [`UNKNOWN`] in its slot instead of failing the whole collection.

use chrono::Local;
use shared::metadata::UNKNOWN;
use shared::SystemMetadata;
use std::net::UdpSocket;
#[cfg(any(target_os = "windows", target_os = "macos"))]
use std::process::Command;
use sysinfo::System;

pub fn collect() -> SystemMetadata {
    let metadata = SystemMetadata {
        username: username().unwrap_or_else(unknown),
        hostname: System::host_name().unwrap_or_else(unknown),
        ip_address: local_ip().unwrap_or_else(unknown),
        os_info: os_info(),
        runtime_version: runtime_version(),
        serial_number: serial_number().unwrap_or_else(unknown),
        collected_at: Local::now().naive_local(),
    };
    tracing::info!(summary = %metadata.summary_line(), "collected system metadata");
    metadata
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

pub fn runtime_version() -> String {
    format!("AskForHelp {}", env!("CARGO_PKG_VERSION"))
}

fn username() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn os_info() -> String {
    match (System::name(), System::os_version()) {
        (Some(name), Some(version)) => format!("{} {}", name, version),
        (Some(name), None) => name,
        _ => std::env::consts::OS.to_string(),
    }
}

/// The address of the interface that routes to the outside world. Connecting
/// a UDP socket sends no packets.
fn local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    if addr.ip().is_unspecified() {
        None
    } else {
        Some(addr.ip().to_string())
    }
}

#[cfg(target_os = "windows")]
fn serial_number() -> Option<String> {
    let output = Command::new("wmic")
        .args(["bios", "get", "serialnumber"])
        .output()
        .ok()?;
    parse_wmic_serial(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(target_os = "macos")]
fn serial_number() -> Option<String> {
    let output = Command::new("ioreg")
        .args(["-c", "IOPlatformExpertDevice", "-d", "2"])
        .output()
        .ok()?;
    parse_ioreg_serial(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn serial_number() -> Option<String> {
    // product_serial is root-only on most distros; the uuid is world-readable.
    let from_dmi = ["product_serial", "product_uuid"]
        .iter()
        .filter_map(|f| std::fs::read_to_string(format!("/sys/class/dmi/id/{}", f)).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty());
    if from_dmi.is_some() {
        return from_dmi;
    }
    let id = std::fs::read_to_string("/etc/machine-id").ok()?.trim().to_string();
    (!id.is_empty()).then_some(id)
}

/// `wmic` prints a header line and then the value.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_wmic_serial(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .nth(1)
        .map(str::to_string)
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_ioreg_serial(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|l| l.contains("IOPlatformSerialNumber"))
        .and_then(|l| l.split('=').nth(1))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}
