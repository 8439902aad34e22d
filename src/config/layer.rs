//! One parsed configuration source
//!
//! Every field is optional so a layer that leaves a key out is distinguishable
//! from one that sets it to an empty value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::effective::ConfigOrigin;
use super::error::ConfigError;
use crate::filter::compile_pattern;

/// How the prompt is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSelector {
    /// Named preset
    Preset(String),
    /// Prompt text read from a file
    File(PathBuf),
}

/// Filter keys of one layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterLayer {
    pub max_file_lines: Option<usize>,
    pub default_exclude_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// One parsed configuration source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub engine: Option<String>,
    pub prompt: Option<PromptSelector>,
    pub engine_args: BTreeMap<String, Vec<String>>,
    pub filter: FilterLayer,
}

#[derive(Debug, Default, Deserialize)]
struct RawLayer {
    engine: Option<String>,
    prompt: Option<String>,
    prompt_file: Option<PathBuf>,
    #[serde(default)]
    engines: BTreeMap<String, RawEngine>,
    #[serde(default)]
    filter: FilterLayer,
}

#[derive(Debug, Default, Deserialize)]
struct RawEngine {
    args: Option<Vec<String>>,
}

impl RawLayer {
    fn into_layer(self, origin: ConfigOrigin) -> Result<ConfigLayer, ConfigError> {
        let prompt = select_prompt(self.prompt, self.prompt_file, origin)?;
        let engine_args = self
            .engines
            .into_iter()
            .filter_map(|(name, engine)| engine.args.map(|args| (name, args)))
            .collect();

        let layer = ConfigLayer {
            engine: self.engine,
            prompt,
            engine_args,
            filter: self.filter,
        };
        layer.validate(origin)?;
        Ok(layer)
    }
}

fn select_prompt(
    prompt: Option<String>,
    prompt_file: Option<PathBuf>,
    origin: ConfigOrigin,
) -> Result<Option<PromptSelector>, ConfigError> {
    match (prompt, prompt_file) {
        (Some(_), Some(_)) => Err(ConfigError::validation(
            origin,
            "cannot set both prompt and prompt_file",
        )),
        (Some(name), None) => Ok(Some(PromptSelector::Preset(name))),
        (None, Some(path)) => Ok(Some(PromptSelector::File(path))),
        (None, None) => Ok(None),
    }
}

impl ConfigLayer {
    /// Parse a TOML document
    pub fn parse(bytes: &[u8], origin: ConfigOrigin) -> Result<Self, ConfigError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ConfigError::parse(origin, format!("invalid UTF-8: {e}")))?;
        let raw: RawLayer =
            toml::from_str(text).map_err(|e| ConfigError::parse(origin, e.to_string().trim_end()))?;
        raw.into_layer(origin)
    }

    /// Parse bytes already read from `path`; errors name the file
    pub fn parse_file(bytes: &[u8], path: &Path, origin: ConfigOrigin) -> Result<Self, ConfigError> {
        let layer = Self::parse(bytes, origin).map_err(|e| with_path(e, path))?;
        debug!(%origin, path = %path.display(), "loaded config layer");
        Ok(layer)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path, origin: ConfigOrigin) -> Result<(Self, Vec<u8>), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::io("read", path, e))?;
        let layer = Self::parse_file(&bytes, path, origin)?;
        Ok((layer, bytes))
    }

    /// Build the command-line layer
    pub fn from_overrides(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let origin = ConfigOrigin::Cli;
        let layer = ConfigLayer {
            engine: overrides.engine.clone(),
            prompt: select_prompt(overrides.prompt.clone(), overrides.prompt_file.clone(), origin)?,
            ..Default::default()
        };
        layer.validate(origin)?;
        Ok(layer)
    }

    /// Intra-layer checks
    pub fn validate(&self, origin: ConfigOrigin) -> Result<(), ConfigError> {
        let patterns = self
            .filter
            .default_exclude_patterns
            .iter()
            .flatten()
            .chain(self.filter.exclude_patterns.iter().flatten());
        for pattern in patterns {
            compile_pattern(pattern).map_err(|e| ConfigError::validation(origin, e.to_string()))?;
        }
        Ok(())
    }
}

fn with_path(err: ConfigError, path: &Path) -> ConfigError {
    match err {
        ConfigError::Parse { origin, message } => ConfigError::Parse {
            origin,
            message: format!("{}: {}", path.display(), message),
        },
        ConfigError::Validation { origin, message } => ConfigError::Validation {
            origin,
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub engine: Option<String>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn with_prompt(mut self, preset: impl Into<String>) -> Self {
        self.prompt = Some(preset.into());
        self
    }

    pub fn with_prompt_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_file = Some(path.into());
        self
    }
}
