//! Repository discovery
//!
//! The only git query this crate makes is `git rev-parse --show-toplevel`,
//! used to find where the repository config lives.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::ConfigError;

/// Capability to find the top-level directory of the current repository
pub trait RepoLocator {
    /// `Ok(None)` when not inside a repository
    fn toplevel(&self) -> Result<Option<PathBuf>, ConfigError>;
}

/// Asks the `git` binary
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    cwd: Option<PathBuf>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git from `dir` instead of the process working directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
        }
    }
}

impl RepoLocator for GitCli {
    fn toplevel(&self) -> Result<Option<PathBuf>, ConfigError> {
        let mut cmd = Command::new("git");
        cmd.args(["rev-parse", "--show-toplevel"]);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let dir = self.cwd.as_deref().unwrap_or(Path::new("."));
        let output = cmd
            .output()
            .map_err(|e| ConfigError::io("run git in", dir, e))?;

        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "not inside a git repository"
            );
            return Ok(None);
        }

        let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if toplevel.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(toplevel)))
    }
}

/// Fixed answer, for callers that already know the repository root
#[derive(Debug, Clone, Default)]
pub struct KnownRoot(pub Option<PathBuf>);

impl RepoLocator for KnownRoot {
    fn toplevel(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self.0.clone())
    }
}
