//! Prompt resolution
//!
//! Turns the winning prompt selector into the final prompt text, either from a
//! preset or from a file. Files named by a repository config must stay inside
//! the repository.

use std::fs;
use std::path::PathBuf;

use git_ai_commit_presets::{PresetProvider, DEFAULT_PRESET};
use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigError, ConfigOrigin, PromptSelector, SelectedPrompt};
use crate::path_guard;

/// Where the prompt text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Preset { name: String },
    File { path: PathBuf },
}

/// Final prompt text with provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub text: String,
    pub origin: ConfigOrigin,
    pub source: PromptSource,
}

/// Resolves prompt selectors against a preset catalog and the filesystem
pub struct PromptResolver<'a> {
    presets: &'a dyn PresetProvider,
}

impl<'a> PromptResolver<'a> {
    pub fn new(presets: &'a dyn PresetProvider) -> Self {
        Self { presets }
    }

    /// Resolve `selected`; nothing selected means the default preset
    pub fn resolve(&self, selected: Option<&SelectedPrompt>) -> Result<ResolvedPrompt, ConfigError> {
        let Some(selected) = selected else {
            return self.preset(DEFAULT_PRESET, ConfigOrigin::Builtin);
        };

        match &selected.selector {
            PromptSelector::Preset(name) => self.preset(name, selected.origin),
            PromptSelector::File(path) => {
                let path = match &selected.base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                let path = match &selected.guard_root {
                    Some(root) => path_guard::ensure_within(&path, root)?,
                    None => path,
                };

                let text = fs::read_to_string(&path)
                    .map_err(|e| ConfigError::io("read prompt file", &path, e))?;
                debug!(origin = %selected.origin, path = %path.display(), "prompt from file");

                Ok(ResolvedPrompt {
                    text: text.trim().to_string(),
                    origin: selected.origin,
                    source: PromptSource::File { path },
                })
            }
        }
    }

    fn preset(&self, name: &str, origin: ConfigOrigin) -> Result<ResolvedPrompt, ConfigError> {
        let text = self.presets.lookup(name)?;
        debug!(%origin, preset = name, "prompt from preset");
        Ok(ResolvedPrompt {
            text: text.trim().to_string(),
            origin,
            source: PromptSource::Preset {
                name: name.trim().to_lowercase(),
            },
        })
    }
}
