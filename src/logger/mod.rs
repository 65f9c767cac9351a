//! Logger module
//!
//! Provides logging utilities for the relay server including:
//! - Server lifecycle logging
//! - Leveled error/warn/info/debug messages
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
mod level;
pub mod writer;

pub use format::AccessLogEntry;
pub use level::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    level::set(config.logging.level);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Lead relay started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Webhook endpoint: POST http://{addr}{}?secret=...",
        config.http.webhook_path
    ));
    if config.routes.health.enabled {
        write_info(&format!(
            "Health checks: {} {}",
            config.routes.health.liveness_path, config.routes.health.readiness_path
        ));
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

/// Report relay settings that are missing, without printing their values
pub fn log_relay_settings(config: &Config) {
    let relay = &config.relay;
    let missing: Vec<&str> = [
        ("WEBHOOK_SECRET", is_unset(relay.webhook_secret.as_deref())),
        ("LASTRO_URL", is_unset(relay.lastro_url.as_deref())),
        ("SHEET_CSV_URL", is_unset(relay.sheet_csv_url.as_deref())),
    ]
    .into_iter()
    .filter_map(|(var, absent)| absent.then_some(var))
    .collect();

    if missing.is_empty() {
        log_info("[Config] Relay settings complete");
    } else {
        log_warning(&format!(
            "[Config] Missing {}; webhook calls will answer 500",
            missing.join(", ")
        ));
    }
    log_info(&format!(
        "[Config] Default clientListingId: {}, origin: {}",
        relay.default_client_listing_id, relay.origin
    ));
}

fn is_unset(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    if level::enabled(LogLevel::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if level::enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if level::enabled(LogLevel::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if level::enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("\n[Shutdown] {reason}, no longer accepting connections"));
}
