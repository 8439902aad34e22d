//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values.

use std::collections::BTreeMap;

use git_ai_commit_presets::DEFAULT_PRESET;

use super::layer::{ConfigLayer, FilterLayer, PromptSelector};
use crate::engine::builtin_engine_args;
use crate::filter::FilterSettings;

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Prompt preset (default: "default")
    pub prompt_preset: String,

    /// Engine argument lists (codex: ["exec"], claude: ["-p"])
    pub engine_args: BTreeMap<String, Vec<String>>,

    /// Diff filter (100 lines per file, lock and minified files excluded)
    pub filter: FilterSettings,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            prompt_preset: DEFAULT_PRESET.to_string(),
            engine_args: builtin_engine_args(),
            filter: FilterSettings::default(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a layer for merging. No engine is set so that
    /// autodetection runs unless a later layer names one.
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            engine: None,
            prompt: Some(PromptSelector::Preset(self.prompt_preset.clone())),
            engine_args: self.engine_args.clone(),
            filter: FilterLayer {
                max_file_lines: Some(self.filter.max_file_lines),
                default_exclude_patterns: Some(self.filter.default_exclude_patterns.clone()),
                exclude_patterns: Some(self.filter.exclude_patterns.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.prompt_preset, "default");
        assert_eq!(defaults.engine_args["codex"], vec!["exec"]);
        assert_eq!(defaults.filter.max_file_lines, 100);
    }

    #[test]
    fn test_to_layer() {
        let layer = BuiltinDefaults::default().to_layer();

        assert_eq!(layer.engine, None);
        assert_eq!(
            layer.prompt,
            Some(PromptSelector::Preset("default".to_string()))
        );
        assert_eq!(layer.filter.max_file_lines, Some(100));
        assert!(layer
            .filter
            .default_exclude_patterns
            .unwrap()
            .contains(&"**/go.sum".to_string()));
        assert_eq!(layer.filter.exclude_patterns, Some(Vec::new()));
    }
}
