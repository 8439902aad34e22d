//! Where configuration files live

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Application directory name under the config home
pub const APP_DIR: &str = "git-ai-commit";

/// User settings file name
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Trust store file name
pub const TRUST_STORE_FILE: &str = "trusted_repos.json";

/// Repository settings file, at the repository root
pub const REPO_CONFIG_FILE: &str = ".git-ai-commit.toml";

/// Per-user configuration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    config_dir: PathBuf,
}

impl ConfigPaths {
    /// Use an explicit directory
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// `$XDG_CONFIG_HOME/git-ai-commit`, else `~/.config/git-ai-commit`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }

    /// Resolution behind [`ConfigPaths::from_env`]; an empty XDG value counts as unset
    pub fn resolve(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(xdg) = xdg_config_home.filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(xdg).join(APP_DIR)));
        }
        match home {
            Some(home) => Ok(Self::new(home.join(".config").join(APP_DIR))),
            None => Err(ConfigError::NoConfigDir),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn user_config(&self) -> PathBuf {
        self.config_dir.join(USER_CONFIG_FILE)
    }

    pub fn trust_store(&self) -> PathBuf {
        self.config_dir.join(TRUST_STORE_FILE)
    }
}

/// Repository settings file for a repository root
pub fn repo_config(repo_root: &Path) -> PathBuf {
    repo_root.join(REPO_CONFIG_FILE)
}
