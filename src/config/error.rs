//! Configuration errors

use std::io;
use std::path::{Path, PathBuf};

use git_ai_commit_presets::PresetError;

use super::effective::ConfigOrigin;
use crate::path_guard::GuardError;
use crate::trust::{StoreError, TrustError};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse {origin}: {message}")]
    Parse { origin: ConfigOrigin, message: String },

    #[error("invalid {origin}: {message}")]
    Validation { origin: ConfigOrigin, message: String },

    #[error(transparent)]
    Trust(#[from] TrustError),

    #[error(
        "prompt file {} is outside the repository root {}",
        .path.display(),
        .root.display()
    )]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error(transparent)]
    TrustStore(#[from] StoreError),

    #[error("cannot locate config directory: neither XDG_CONFIG_HOME nor a home directory is set")]
    NoConfigDir,
}

impl ConfigError {
    pub fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        ConfigError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(origin: ConfigOrigin, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            origin,
            message: message.into(),
        }
    }

    pub(crate) fn validation(origin: ConfigOrigin, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            origin,
            message: message.into(),
        }
    }
}

impl From<GuardError> for ConfigError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Escape { path, root } => ConfigError::PathEscape { path, root },
            GuardError::Io { path, source } => ConfigError::Io {
                context: "resolve",
                path,
                source,
            },
        }
    }
}
