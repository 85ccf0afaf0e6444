//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use haven_domain::ConfigIssue;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "haven.toml";

/// Prefix of environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "HAVEN_";

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration ({} error(s))", .0.len())]
    Invalid(Vec<ConfigIssue>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `HAVEN_*` environment variables (`HAVEN_ORCHESTRATOR__MAX_TOOL_TURNS=3`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./haven.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/haven/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigValidationError> {
        Self::figment(config_path, Self::global_config_path(), Some(PathBuf::from(PROJECT_CONFIG_FILE)))
            .extract()
            .map_err(|e| ConfigValidationError::Load(Box::new(e)))
    }

    /// Validate a loaded config and fail on any error-severity issue.
    ///
    /// Warnings are returned for the caller to log.
    pub fn check(config: &FileConfig) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        Self::partition(config.validate())
    }

    fn partition(issues: Vec<ConfigIssue>) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(|i| i.is_error());
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    fn figment(
        explicit: Option<&Path>,
        global: Option<PathBuf>,
        project: Option<PathBuf>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = project
            && project_path.exists()
        {
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/haven/config.toml` (or the platform equivalent)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("haven").join("config.toml"))
    }

    /// The config files that exist, in merge order.
    pub fn config_sources(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut sources = Vec::new();
        if let Some(global) = Self::global_config_path()
            && global.exists()
        {
            sources.push(global);
        }
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.exists() {
            sources.push(project);
        }
        if let Some(path) = explicit {
            sources.push(path.to_path_buf());
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.orchestrator.max_tool_turns, 5);
        assert_eq!(config.guard.max_input_chars, 4000);
    }

    #[test]
    fn test_global_config_path() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("haven/config.toml"));
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[orchestrator]\nmax_tool_turns = 4\nhistory_turns = 2\n",
        );
        let project = write(&dir, "project.toml", "[orchestrator]\nmax_tool_turns = 3\n");
        let explicit = write(&dir, "explicit.toml", "[guard]\nmax_input_chars = 500\n");

        let config: FileConfig =
            ConfigLoader::figment(Some(&explicit), Some(global), Some(project))
                .extract()
                .unwrap();
        assert_eq!(config.orchestrator.max_tool_turns, 3);
        assert_eq!(config.orchestrator.history_turns, 2);
        assert_eq!(config.guard.max_input_chars, 500);
        assert_eq!(config.orchestrator.max_regenerations, 1);
    }

    #[test]
    fn test_env_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("explicit.toml", "[orchestrator]\nmax_tool_turns = 3\n")?;
            jail.set_env("HAVEN_ORCHESTRATOR__MAX_TOOL_TURNS", "7");
            jail.set_env("HAVEN_PROVIDERS__PRIMARY__KIND", "openai");

            let config: FileConfig = ConfigLoader::figment(
                Some(Path::new("explicit.toml")),
                None,
                None,
            )
            .extract()?;
            assert_eq!(config.orchestrator.max_tool_turns, 7);
            assert_eq!(config.providers.primary.kind, "openai");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.toml", "[orchestrator]\nmax_tool_turns = \"many\"\n");
        let result: Result<FileConfig, _> =
            ConfigLoader::figment(Some(&bad), None, None).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_partition_keeps_warnings() {
        let config = ConfigLoader::load_defaults();
        let warnings = ConfigLoader::partition(config.validate_with(&|_| Some("key".to_string())))
            .unwrap();
        assert!(!warnings.is_empty());
        assert!(warnings.iter().all(|i| !i.is_error()));
    }

    #[test]
    fn test_partition_rejects_errors() {
        let mut config = ConfigLoader::load_defaults();
        config.validator.max_sentence_words = 0;
        let result = ConfigLoader::partition(config.validate_with(&|_| Some("key".to_string())));
        match result {
            Err(ConfigValidationError::Invalid(errors)) => {
                assert!(!errors.is_empty());
                assert!(errors.iter().all(|i| i.is_error()));
            }
            other => panic!("expected invalid config, got {:?}", other.map(|w| w.len())),
        }
    }

    #[test]
    fn test_config_sources_lists_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write(&dir, "explicit.toml", "[guard]\nmax_input_chars = 500\n");
        let sources = ConfigLoader::config_sources(Some(&explicit));
        assert_eq!(sources.last(), Some(&explicit));
    }
}
