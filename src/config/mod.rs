//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/git-ai-commit/config.toml)
//! 3. Repo config (.git-ai-commit.toml, only once trusted)
//! 4. CLI flags

mod defaults;
mod effective;
mod error;
mod layer;
mod merge;
mod paths;
mod resolver;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigOrigin, ConfigSource, MergedConfig};
pub use error::ConfigError;
pub use layer::{CliOverrides, ConfigLayer, FilterLayer, PromptSelector};
pub use merge::{merge_layer, merge_layers, MergedLayer, SelectedPrompt, SourcedLayer};
pub use paths::{
    repo_config, ConfigPaths, APP_DIR, REPO_CONFIG_FILE, TRUST_STORE_FILE, USER_CONFIG_FILE,
};
pub use resolver::{inspect_repo, ConfigResolver};
