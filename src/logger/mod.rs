//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled debug/info/warning/error logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, LogLevel, LoggingConfig};
use crate::strategy::CacheStrategy;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.level,
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

pub fn log_debug(message: &str) {
    writer::get().write_info(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_info(message: &str) {
    writer::get().write_info(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    writer::get().write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

pub fn log_error(message: &str) {
    writer::get().write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::get().write_access(&entry.format(format));
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    let strategy = state.strategy();
    log_info("======================================");
    log_info("cachelab started");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Static root: {}", state.static_root.display()));
    log_info(&format!(
        "Cache strategy: {strategy} ({})",
        strategy.description()
    ));
    log_info(&format!(
        "Validation: {:?}, fingerprint: {:?}",
        config.cache.validation, config.cache.fingerprint
    ));
    log_info(&format!("Log level: {:?}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================\n");
}

pub fn log_strategy_table(active: CacheStrategy) {
    for strategy in CacheStrategy::ALL {
        let marker = if strategy == active { "*" } else { " " };
        log_info(&format!(
            "{marker} {:<28} {}",
            strategy.name(),
            strategy.description()
        ));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}
