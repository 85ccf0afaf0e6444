//! Configuration file loading for haven
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `HAVEN_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./haven.toml`
//! 4. Global: `$XDG_CONFIG_HOME/haven/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ClassifierKind, FileAuditConfig, FileConfig, FileGuardConfig, FileLoggingConfig,
    FileOrchestratorConfig, FileProviderConfig, FileProvidersConfig, FileServicesConfig,
    FileToolPolicy, FileToolsConfig,
};
pub use loader::{ConfigLoader, ConfigValidationError, ENV_PREFIX, PROJECT_CONFIG_FILE};
