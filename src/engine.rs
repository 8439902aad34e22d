//! Engine selection
//!
//! Engines are external text-generation CLIs. This module only decides which
//! one to use and with what arguments; running it is the caller's job.

use std::collections::BTreeMap;

use serde::Serialize;

/// Engines probed, in order, when no layer names one
pub const ENGINE_CANDIDATES: &[&str] = &["codex", "claude", "gemini"];

/// Built-in argument lists, overridable per engine by any layer
pub fn builtin_engine_args() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        ("claude".to_string(), vec!["-p".to_string()]),
        ("codex".to_string(), vec!["exec".to_string()]),
    ])
}

/// Capability to check whether an executable is on the search path
pub trait EngineLocator {
    fn is_available(&self, name: &str) -> bool;
}

/// Looks engines up on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPath;

impl EngineLocator for SearchPath {
    fn is_available(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

/// First available candidate, if any
pub fn autodetect(locator: &dyn EngineLocator) -> Option<&'static str> {
    ENGINE_CANDIDATES
        .iter()
        .copied()
        .find(|name| locator.is_available(name))
}

/// Program and arguments for the selected engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    /// Space-joined form for diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
