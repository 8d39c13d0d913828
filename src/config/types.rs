// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

use crate::http::{FingerprintAlgorithm, ValidationMode};
use crate::strategy::CacheStrategy;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub static_files: StaticFilesConfig,
    pub cache: CacheConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Log severity, ordered from most to least verbose
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
    /// Listen backlog queue size
    pub backlog: i32,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// Static resource layout
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    /// Directory every request path is resolved against
    pub root: String,
    /// Document served for extensionless (directory) paths
    pub index_file: String,
    /// Fallback document under `root` served with 404
    pub not_found_file: String,
    /// Requests under this prefix go to the API handler
    pub api_prefix: String,
}

/// Caching strategy selection and its timing values (seconds)
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub strategy: CacheStrategy,
    pub validation: ValidationMode,
    pub fingerprint: FingerprintAlgorithm,
    /// `max-age` for the max-age strategies
    pub max_age: u64,
    /// `Expires` offset for the expires-only strategy
    pub expires_in: u64,
    /// `Expires` offset when sent next to `max-age`
    pub combined_expires_in: u64,
    /// `max-age` when sent next to `Expires`
    pub combined_max_age: u64,
}
