// Application state module
// Read-only state shared by every connection task

use std::path::PathBuf;

use super::types::Config;
use crate::strategy::CacheStrategy;

/// Application state
///
/// Built once at startup. Request handling only reads it, so no locking is
/// needed across connections.
pub struct AppState {
    pub config: Config,
    /// Static root as a path, resolved once from `static_files.root`
    pub static_root: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let static_root = PathBuf::from(&config.static_files.root);
        Self {
            config,
            static_root,
        }
    }

    pub const fn strategy(&self) -> CacheStrategy {
        self.config.cache.strategy
    }
}
