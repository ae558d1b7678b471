//! Configuration for linkdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a linkdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── B.fl          (master records)
    ///     ├── BK.fl         (slave records)
    ///     ├── B.ind         (primary index, written on close)
    ///     ├── B.garbage     (master free-list, written on close)
    ///     └── BK.garbage    (slave free-list, written on close)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Startup Checks
    // -------------------------------------------------------------------------
    /// Drop free-list offsets on open that do not name an invalid slot
    pub verify_free_lists: bool,

    /// Ignore a persisted index and rebuild it by scanning the master file
    pub rebuild_index: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            verify_free_lists: true,
            rebuild_index: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Enable or disable free-list pruning on open
    pub fn verify_free_lists(mut self, enabled: bool) -> Self {
        self.config.verify_free_lists = enabled;
        self
    }

    /// Force a full-scan index rebuild on open
    pub fn rebuild_index(mut self, enabled: bool) -> Self {
        self.config.rebuild_index = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
