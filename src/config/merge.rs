//! Configuration merge logic
//!
//! Layers are applied in order (defaults, user, repo, command line):
//! - Scalars and the prompt selector: last layer that sets them wins
//! - Engine argument lists: replaced whole, per engine name
//! - `default_exclude_patterns`: replaced by the last layer that sets it
//! - `exclude_patterns`: concatenated in load order

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::effective::{ConfigOrigin, ConfigSource};
use super::layer::{ConfigLayer, PromptSelector};
use crate::filter::FilterSettings;

/// A parsed layer plus where it came from
#[derive(Debug, Clone)]
pub struct SourcedLayer {
    pub source: ConfigSource,
    pub layer: ConfigLayer,

    /// Directory relative prompt files resolve against
    pub base_dir: Option<PathBuf>,

    /// Root that prompt files must stay inside (repo layer only)
    pub guard_root: Option<PathBuf>,
}

impl SourcedLayer {
    pub fn builtin(layer: ConfigLayer) -> Self {
        Self {
            source: ConfigSource::inline(ConfigOrigin::Builtin),
            layer,
            base_dir: None,
            guard_root: None,
        }
    }

    /// User layer; prompt files resolve against the file's directory
    pub fn user(layer: ConfigLayer, path: &Path, bytes: &[u8]) -> Self {
        Self {
            source: ConfigSource::file(ConfigOrigin::User, path, bytes),
            layer,
            base_dir: path.parent().map(Path::to_path_buf),
            guard_root: None,
        }
    }

    /// Repo layer; prompt files must stay inside `repo_root`
    pub fn repo(layer: ConfigLayer, path: &Path, bytes: &[u8], repo_root: &Path) -> Self {
        Self {
            source: ConfigSource::file(ConfigOrigin::Repo, path, bytes),
            layer,
            base_dir: path.parent().map(Path::to_path_buf),
            guard_root: Some(repo_root.to_path_buf()),
        }
    }

    /// Command-line layer; prompt files resolve against `cwd`
    pub fn cli(layer: ConfigLayer, cwd: &Path) -> Self {
        Self {
            source: ConfigSource::inline(ConfigOrigin::Cli),
            layer,
            base_dir: Some(cwd.to_path_buf()),
            guard_root: None,
        }
    }

    fn origin(&self) -> ConfigOrigin {
        self.source.origin
    }
}

/// The prompt selector that won, with the context needed to resolve it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPrompt {
    pub selector: PromptSelector,
    pub origin: ConfigOrigin,
    pub base_dir: Option<PathBuf>,
    pub guard_root: Option<PathBuf>,
}

/// Result of merging, before autodetection and prompt resolution
#[derive(Debug, Clone)]
pub struct MergedLayer {
    pub engine: Option<String>,
    pub engine_origin: Option<ConfigOrigin>,
    pub prompt: Option<SelectedPrompt>,
    pub engine_args: BTreeMap<String, Vec<String>>,
    pub filter: FilterSettings,
    pub sources: Vec<ConfigSource>,
}

impl Default for MergedLayer {
    fn default() -> Self {
        Self {
            engine: None,
            engine_origin: None,
            prompt: None,
            engine_args: BTreeMap::new(),
            filter: FilterSettings {
                max_file_lines: 0,
                default_exclude_patterns: Vec::new(),
                exclude_patterns: Vec::new(),
            },
            sources: Vec::new(),
        }
    }
}

/// Apply one layer on top of `base`
pub fn merge_layer(mut base: MergedLayer, overlay: SourcedLayer) -> MergedLayer {
    let origin = overlay.origin();
    let SourcedLayer {
        source,
        layer,
        base_dir,
        guard_root,
    } = overlay;

    if let Some(engine) = layer.engine {
        base.engine = Some(engine);
        base.engine_origin = Some(origin);
    }

    if let Some(selector) = layer.prompt {
        base.prompt = Some(SelectedPrompt {
            selector,
            origin,
            base_dir,
            guard_root,
        });
    }

    // Whole entries, no per-argument merge
    base.engine_args.extend(layer.engine_args);

    let filter = layer.filter;
    if let Some(max) = filter.max_file_lines {
        base.filter.max_file_lines = max;
    }
    if let Some(defaults) = filter.default_exclude_patterns {
        base.filter.default_exclude_patterns = defaults;
    }
    if let Some(extra) = filter.exclude_patterns {
        base.filter.exclude_patterns.extend(extra);
    }

    base.sources.push(source);
    base
}

/// Merge multiple config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<SourcedLayer>) -> MergedLayer {
    layers.into_iter().fold(MergedLayer::default(), merge_layer)
}
