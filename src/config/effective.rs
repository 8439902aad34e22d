//! Resolved configuration with provenance
//!
//! [`MergedConfig`] is what the rest of the program reads: the chosen engine
//! and its arguments, the final prompt text, the diff filter settings, and a
//! record of which sources contributed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::EngineCommand;
use crate::filter::{FilterOptions, FilterSettings};
use crate::prompt::PromptSource;
use crate::trust::content_hash;

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Repo,
    Cli,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Builtin => write!(f, "built-in defaults"),
            ConfigOrigin::User => write!(f, "user config"),
            ConfigOrigin::Repo => write!(f, "repo config"),
            ConfigOrigin::Cli => write!(f, "command line"),
        }
    }
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigSource {
    /// A source with no backing file
    pub fn inline(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }

    /// A file-backed source, digest computed from `bytes`
    pub fn file(origin: ConfigOrigin, path: &Path, bytes: &[u8]) -> Self {
        Self {
            origin,
            path: Some(path.to_path_buf()),
            digest: Some(content_hash(bytes)),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, Serialize)]
pub struct MergedConfig {
    /// Engine binary name; empty when nothing was configured or found
    pub engine: String,

    /// Layer that named the engine (None when autodetected or empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_origin: Option<ConfigOrigin>,

    /// Whether `engine` came from the search path
    pub engine_autodetected: bool,

    /// Final prompt text, trimmed
    pub prompt: String,

    /// Layer that selected the prompt
    pub prompt_origin: ConfigOrigin,

    /// Preset name or file the prompt was read from
    pub prompt_source: PromptSource,

    /// Per-engine argument lists
    pub engine_args: BTreeMap<String, Vec<String>>,

    pub filter: FilterSettings,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl MergedConfig {
    /// Program and arguments for the selected engine, if any
    pub fn engine_command(&self) -> Option<EngineCommand> {
        if self.engine.is_empty() {
            return None;
        }
        Some(EngineCommand {
            program: self.engine.clone(),
            args: self.engine_args.get(&self.engine).cloned().unwrap_or_default(),
        })
    }

    /// Options for the diff filter
    pub fn filter_options(&self) -> FilterOptions {
        self.filter.options()
    }

    /// Whether a repository config contributed
    pub fn has_repo_config(&self) -> bool {
        self.sources.iter().any(|s| s.origin == ConfigOrigin::Repo)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
