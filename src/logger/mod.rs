//! Logger module
//!
//! Provides logging utilities for the tracker including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error, warning and debug logging with a level filter
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. An unknown level falls
/// back to `info`.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse().unwrap_or_else(|e| {
        eprintln!("[WARN] {e}, using 'info'");
        LogLevel::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

// Before init() everything goes straight to stdout/stderr
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_debug(message: &str) {
    if let Some(w) = writer::get() {
        w.write_debug(message);
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, font: Option<&Path>) {
    write_info("======================================");
    write_info("Climate tracker started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Data file: {}", config.data.path));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    match font {
        Some(path) => write_info(&format!("Chart font: {}", path.display())),
        None => write_info("Chart font: none found, charts are drawn without text"),
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown(active_connections: usize) {
    write_info(&format!(
        "[Shutdown] Stopped accepting connections ({active_connections} still active)"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    write_debug(&format!("[DEBUG] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
