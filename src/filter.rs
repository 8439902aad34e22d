//! Diff filter settings
//!
//! The diff filter itself lives outside this crate; it receives a
//! [`FilterOptions`] built from the merged configuration. Patterns are globs
//! where `*` stays inside one path segment and `**` spans directories. A
//! pattern matches when it matches either the whole path or the file name.

use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Default maximum number of diff lines kept per file
pub const DEFAULT_MAX_FILE_LINES: usize = 100;

/// Files left out of the diff unless a layer replaces this list
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/*.lock",
    "**/*-lock.json",
    "**/*.lock.yaml",
    "**/*-lock.yaml",
    "**/*.lockfile",
    "**/*.min.js",
    "**/*.min.css",
    "**/*.map",
    "**/go.sum",
];

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Compile one exclude pattern
pub fn compile_pattern(pattern: &str) -> Result<Glob, ExcludeError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| ExcludeError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

/// Merged filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Maximum diff lines per file (0 = no limit)
    pub max_file_lines: usize,

    /// Base exclusion list, replaced wholesale by any layer that sets it
    pub default_exclude_patterns: Vec<String>,

    /// Extra exclusions, concatenated across layers
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            max_file_lines: DEFAULT_MAX_FILE_LINES,
            default_exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl FilterSettings {
    /// Options handed to the diff filter
    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            max_file_lines: self.max_file_lines,
            exclude_patterns: self
                .default_exclude_patterns
                .iter()
                .chain(&self.exclude_patterns)
                .cloned()
                .collect(),
        }
    }
}

/// What the diff filter consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Maximum diff lines per file (0 = no limit)
    pub max_file_lines: usize,

    /// Effective exclusion patterns, defaults first
    pub exclude_patterns: Vec<String>,
}

impl FilterOptions {
    /// Compile the exclusion patterns
    pub fn exclude_rules(&self) -> Result<ExcludeRules, ExcludeError> {
        ExcludeRules::new(&self.exclude_patterns)
    }
}

/// Compiled exclusion patterns
#[derive(Debug)]
pub struct ExcludeRules {
    glob_set: GlobSet,
}

impl ExcludeRules {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(compile_pattern(pattern.as_ref())?);
        }

        let glob_set = builder.build().map_err(|source| ExcludeError::Glob {
            pattern: String::new(),
            source,
        })?;
        Ok(Self { glob_set })
    }

    /// Check if a repository-relative path is excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.glob_set.is_match(path) {
            return true;
        }
        path.file_name()
            .map(|name| self.glob_set.is_match(Path::new(name)))
            .unwrap_or(false)
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.glob_set.len()
    }

    /// Check if no patterns were compiled
    pub fn is_empty(&self) -> bool {
        self.glob_set.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FilterSettings::default();
        assert_eq!(settings.max_file_lines, 100);
        assert_eq!(settings.default_exclude_patterns.len(), DEFAULT_EXCLUDE_PATTERNS.len());
        assert!(settings.exclude_patterns.is_empty());
    }

    #[test]
    fn test_options_put_defaults_first() {
        let settings = FilterSettings {
            max_file_lines: 0,
            default_exclude_patterns: vec!["a".to_string()],
            exclude_patterns: vec!["b".to_string(), "c".to_string()],
        };
        let options = settings.options();
        assert_eq!(options.max_file_lines, 0);
        assert_eq!(options.exclude_patterns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_rules() {
        let rules = FilterSettings::default().options().exclude_rules().unwrap();

        assert!(rules.is_excluded(Path::new("Cargo.lock")));
        assert!(rules.is_excluded(Path::new("web/package-lock.json")));
        assert!(rules.is_excluded(Path::new("dist/app.min.js")));
        assert!(rules.is_excluded(Path::new("go.sum")));
        assert!(rules.is_excluded(Path::new("deep/nested/mod/go.sum")));

        assert!(!rules.is_excluded(Path::new("src/main.rs")));
        assert!(!rules.is_excluded(Path::new("lockfile.rs")));
    }

    #[test]
    fn test_simple_pattern_matches_file_name() {
        let rules = ExcludeRules::new(&["*.snap"]).unwrap();
        assert!(rules.is_excluded(Path::new("a.snap")));
        assert!(rules.is_excluded(Path::new("tests/snapshots/a.snap")));
        assert!(!rules.is_excluded(Path::new("a.snapshot")));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let rules = ExcludeRules::new(&["docs/*.md"]).unwrap();
        assert!(rules.is_excluded(Path::new("docs/intro.md")));
        assert!(!rules.is_excluded(Path::new("docs/guide/intro.md")));

        let rules = ExcludeRules::new(&["docs/**"]).unwrap();
        assert!(rules.is_excluded(Path::new("docs/guide/intro.md")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ExcludeRules::new(&["src/[a-"]).unwrap_err();
        assert!(err.to_string().contains("src/[a-"));
    }

    #[test]
    fn test_empty_rules() {
        let rules = ExcludeRules::new::<&str>(&[]).unwrap();
        assert!(rules.is_empty());
        assert!(!rules.is_excluded(Path::new("Cargo.lock")));
    }
}
