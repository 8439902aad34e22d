//! Bundled prompt presets for git-ai-commit.
//!
//! Presets are markdown documents compiled into the binary. Callers look them
//! up through the [`PresetProvider`] trait so that tests can substitute their
//! own catalog.

/// Name of the preset used when no layer selects a prompt.
pub const DEFAULT_PRESET: &str = "default";

/// Compiled-in presets, keyed by lower-case name.
const EMBEDDED: &[(&str, &str)] = &[
    ("conventional", include_str!("../assets/conventional.md")),
    ("default", include_str!("../assets/default.md")),
    ("gitmoji", include_str!("../assets/gitmoji.md")),
    ("karma", include_str!("../assets/karma.md")),
];

/// Preset lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresetError {
    #[error("prompt preset is empty")]
    Empty,

    #[error("prompt preset {0:?} not found")]
    NotFound(String),
}

/// Source of named prompt texts.
pub trait PresetProvider {
    /// Look up the text for `name`. Implementations receive the raw name and
    /// are expected to normalize it with [`preset_key`].
    fn lookup(&self, name: &str) -> Result<String, PresetError>;

    /// Names of all available presets, sorted.
    fn names(&self) -> Vec<String>;
}

/// Normalize a user-supplied preset name into a lookup key.
pub fn preset_key(name: &str) -> Result<String, PresetError> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        return Err(PresetError::Empty);
    }
    Ok(key)
}

/// The presets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedPresets;

impl PresetProvider for EmbeddedPresets {
    fn lookup(&self, name: &str) -> Result<String, PresetError> {
        let key = preset_key(name)?;
        EMBEDDED
            .iter()
            .find(|(preset, _)| *preset == key)
            .map(|(_, text)| text.trim().to_string())
            .ok_or(PresetError::NotFound(key))
    }

    fn names(&self) -> Vec<String> {
        EMBEDDED.iter().map(|(name, _)| name.to_string()).collect()
    }
}
