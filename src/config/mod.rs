// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    CacheConfig, Config, HttpConfig, LogLevel, LoggingConfig, PerformanceConfig, ServerConfig,
    StaticFilesConfig,
};

/// Default config file name (extension is detected by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "cachelab";

/// Environment variable prefix, e.g. `CACHELAB_CACHE__STRATEGY=max-age-etag`
const ENV_PREFIX: &str = "CACHELAB";

/// Command-line values that take precedence over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub strategy: Option<String>,
    pub root: Option<String>,
}

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Precedence, lowest first: built-in defaults, the config file (may be
    /// absent), `CACHELAB_` environment variables, then `overrides`.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.backlog", 128)?
            .set_default("http.server_name", "cachelab")?
            .set_default("static_files.root", "static")?
            .set_default("static_files.index_file", "index.html")?
            .set_default("static_files.not_found_file", "404.html")?
            .set_default("static_files.api_prefix", "/api")?
            .set_default("cache.strategy", "max-age-must-revalidate")?
            .set_default("cache.validation", "exact")?
            .set_default("cache.fingerprint", "sha256")?
            .set_default("cache.max_age", 10)?
            .set_default("cache.expires_in", 10)?
            .set_default("cache.combined_expires_in", 5)?
            .set_default("cache.combined_max_age", 60)?
            .set_override_option("cache.strategy", overrides.strategy.clone())?
            .set_override_option("static_files.root", overrides.root.clone())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::Address { addr, source })
    }
}
