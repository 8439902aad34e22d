//! git-ai-commit configuration core
//!
//! Resolves the settings for one `git-ai-commit` run: engine, prompt and diff
//! filter, merged from built-in defaults, the user config, the repository
//! config and the command line. The repository config is only read after its
//! exact contents have been trusted by the operator.

pub mod config;
pub mod engine;
pub mod filter;
pub mod git;
pub mod path_guard;
pub mod prompt;
pub mod trust;

pub use config::{CliOverrides, ConfigError, ConfigOrigin, ConfigPaths, ConfigResolver, MergedConfig};
pub use engine::{EngineCommand, EngineLocator, SearchPath};
pub use filter::{ExcludeRules, FilterOptions, FilterSettings};
pub use git::{GitCli, RepoLocator};
pub use git_ai_commit_presets::{EmbeddedPresets, PresetError, PresetProvider};
pub use prompt::{PromptResolver, PromptSource, ResolvedPrompt};
pub use trust::{ConsentPrompt, TerminalConsent, TrustDecision, TrustEntry, TrustStore};
