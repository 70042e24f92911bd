//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::merge_tiers;
use super::types::Config;
use crate::format::OutputFormat;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file (skips tier merging).
pub const ENV_CONFIG_PATH: &str = "TASK_TRACKER_CONFIG_PATH";
/// Environment variable overriding the store file path.
pub const ENV_STORE_PATH: &str = "TASK_TRACKER_STORE_PATH";
/// Environment variable overriding the default output format.
pub const ENV_FORMAT: &str = "TASK_TRACKER_FORMAT";
/// Environment variable replacing the user config directory.
pub const ENV_USER_DIR: &str = "TASK_TRACKER_USER_DIR";
/// Environment variable replacing the project config directory.
pub const ENV_PROJECT_DIR: &str = "TASK_TRACKER_PROJECT_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `$CWD/task-tracker/`
    Project = 1,
    /// `~/.task-tracker/`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: TASK_TRACKER_USER_DIR or ~/.task-tracker
        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".task-tracker")));

        // Project dir: TASK_TRACKER_PROJECT_DIR or $CWD/task-tracker
        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("task-tracker")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn config_file(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            ConfigTier::Defaults | ConfigTier::Environment => None,
        }?;
        Some(dir.join(CONFIG_FILE))
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load a single explicit file instead of the project and user tiers.
    /// Environment overrides still apply.
    pub fn load_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut config = Config::load(&path)?;
        Self::apply_env_overrides(&mut config);
        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            config_path: Some(path),
        })
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit_path) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_file(explicit_path);
        }

        let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for tier in [ConfigTier::Project, ConfigTier::User] {
            let Some(file) = paths.config_file(tier) else {
                continue;
            };
            if let Some(value) = read_tier(&file, tier) {
                tiers.push(value);
                config_path = Some(file);
            }
        }

        let merged = merge_tiers(tiers);
        let mut config: Config =
            serde_json::from_value(merged).context("Merged configuration is invalid")?;

        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    fn apply_env_overrides(config: &mut Config) {
        if let Ok(store_path) = std::env::var(ENV_STORE_PATH) {
            config.store.path = PathBuf::from(store_path);
        }

        if let Ok(format) = std::env::var(ENV_FORMAT) {
            match OutputFormat::from_str(&format) {
                Some(format) => config.display.format = format,
                None => warn!(value = %format, "Ignoring unknown {}", ENV_FORMAT),
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

// Unreadable or invalid tier files are skipped with a warning.
fn read_tier(file: &Path, tier: ConfigTier) -> Option<Value> {
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(%tier, path = %file.display(), error = %e, "Failed to read config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(%tier, path = %file.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(%tier, path = %file.display(), error = %e, "Ignoring invalid config file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert!(paths.project_dir.is_some());
    }

    #[test]
    fn test_config_paths_discover_from_env() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let user = temp.path().join("user");

        // Only this test sets the directory variables.
        unsafe {
            std::env::set_var(ENV_PROJECT_DIR, &project);
            std::env::set_var(ENV_USER_DIR, &user);
        }
        let paths = ConfigPaths::discover();
        unsafe {
            std::env::remove_var(ENV_PROJECT_DIR);
            std::env::remove_var(ENV_USER_DIR);
        }

        assert_eq!(paths.project_dir, Some(project));
        assert_eq!(paths.user_dir, Some(user));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(ConfigTier::Defaults < ConfigTier::Project);
        assert!(ConfigTier::Project < ConfigTier::User);
        assert_eq!(ConfigTier::User.to_string(), "user");
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert!(loader.config_path().is_none());
        assert!(loader.config().store.pretty);
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-tracker");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.yaml"),
            "store:\n  pretty: false\n",
        )
        .unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir.clone()), Some(temp.path().join("user")));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert!(!loader.config().store.pretty);
        assert_eq!(
            loader.config_path(),
            Some(project_dir.join("config.yaml").as_path())
        );
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-tracker");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "store:\n  pretty: false\ndisplay:\n  format: markdown\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "display:\n  format: json\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.display.format, OutputFormat::Json);
        assert!(!config.store.pretty);
    }

    #[test]
    fn test_invalid_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("task-tracker");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "store: [unclosed").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert!(loader.config_path().is_none());
        assert!(loader.config().store.pretty);
    }

    #[test]
    fn test_load_file_uses_only_that_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "store:\n  path: elsewhere/tasks.json\n").unwrap();

        let loader = ConfigLoader::load_file(&path).unwrap();

        assert_eq!(loader.config_path(), Some(path.as_path()));
        assert!(loader.config().store.pretty);
    }
}
