//! End-to-end configuration resolution
//!
//! Loads the user layer, gates and loads the repository layer, applies
//! command-line overrides, then fills in the engine and prompt. Any failure
//! aborts the whole resolution; there is no partial result.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use git_ai_commit_presets::PresetProvider;
use tracing::{debug, info, warn};

use super::defaults::BuiltinDefaults;
use super::effective::{ConfigOrigin, MergedConfig};
use super::error::ConfigError;
use super::layer::{CliOverrides, ConfigLayer};
use super::merge::{merge_layers, SourcedLayer};
use super::paths::{repo_config, ConfigPaths};
use crate::engine::{autodetect, EngineLocator};
use crate::git::RepoLocator;
use crate::prompt::PromptResolver;
use crate::trust::{evaluate, ConsentPrompt, Evaluation, TrustGate, TrustStore};

/// Resolves the configuration for one invocation
pub struct ConfigResolver<'a> {
    paths: ConfigPaths,
    repo: &'a dyn RepoLocator,
    engines: &'a dyn EngineLocator,
    presets: &'a dyn PresetProvider,
    consent: &'a mut dyn ConsentPrompt,
    overrides: CliOverrides,
    cwd: Option<PathBuf>,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(
        paths: ConfigPaths,
        repo: &'a dyn RepoLocator,
        engines: &'a dyn EngineLocator,
        presets: &'a dyn PresetProvider,
        consent: &'a mut dyn ConsentPrompt,
    ) -> Self {
        Self {
            paths,
            repo,
            engines,
            presets,
            consent,
            overrides: CliOverrides::default(),
            cwd: None,
        }
    }

    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Directory command-line prompt files resolve against (default: process cwd)
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Resolve the full configuration
    pub fn resolve(&mut self) -> Result<MergedConfig, ConfigError> {
        // Command-line validation first, so a bad flag fails before any prompt
        let cli = ConfigLayer::from_overrides(&self.overrides)?;

        let mut layers = vec![SourcedLayer::builtin(BuiltinDefaults::default().to_layer())];
        if let Some(user) = self.user_layer()? {
            layers.push(user);
        }
        if let Some(repo) = self.repo_layer()? {
            layers.push(repo);
        }
        let cwd = self.cwd()?;
        layers.push(SourcedLayer::cli(cli, &cwd));

        let merged = merge_layers(layers);

        let configured = merged
            .engine
            .as_deref()
            .map(str::trim)
            .filter(|engine| !engine.is_empty());
        let (engine, engine_origin, engine_autodetected) = match configured {
            Some(engine) => (engine.to_string(), merged.engine_origin, false),
            None => match autodetect(self.engines) {
                Some(found) => {
                    debug!(engine = found, "autodetected engine");
                    (found.to_string(), None, true)
                }
                None => {
                    warn!("no engine configured and none found on PATH");
                    (String::new(), None, false)
                }
            },
        };

        let prompt = PromptResolver::new(self.presets).resolve(merged.prompt.as_ref())?;

        Ok(MergedConfig {
            engine,
            engine_origin,
            engine_autodetected,
            prompt: prompt.text,
            prompt_origin: prompt.origin,
            prompt_source: prompt.source,
            engine_args: merged.engine_args,
            filter: merged.filter,
            sources: merged.sources,
        })
    }

    fn user_layer(&self) -> Result<Option<SourcedLayer>, ConfigError> {
        let path = self.paths.user_config();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no user config");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::io("read user config", &path, e)),
        };
        let layer = ConfigLayer::parse_file(&bytes, &path, ConfigOrigin::User)?;
        Ok(Some(SourcedLayer::user(layer, &path, &bytes)))
    }

    fn repo_layer(&mut self) -> Result<Option<SourcedLayer>, ConfigError> {
        let Some((root, config)) = locate_repo_config(self.repo)? else {
            return Ok(None);
        };

        let mut store = TrustStore::open(self.paths.trust_store())?;
        let admission = TrustGate::new(&mut store, &mut *self.consent).admit(&root, &config)?;
        info!(
            path = %admission.config_path.display(),
            state = ?admission.state,
            "repo config admitted"
        );

        // Parse exactly the bytes that were hashed
        let layer = ConfigLayer::parse_file(&admission.bytes, &admission.config_path, ConfigOrigin::Repo)?;
        Ok(Some(SourcedLayer::repo(
            layer,
            &admission.config_path,
            &admission.bytes,
            &admission.repo_root,
        )))
    }

    fn cwd(&self) -> Result<PathBuf, ConfigError> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => env::current_dir().map_err(|e| ConfigError::io("read", Path::new("."), e)),
        }
    }
}

/// Trust decision for the current repository config, without prompting.
///
/// `None` outside a repository or when the repository has no config.
pub fn inspect_repo(
    paths: &ConfigPaths,
    repo: &dyn RepoLocator,
) -> Result<Option<Evaluation>, ConfigError> {
    let Some((root, config)) = locate_repo_config(repo)? else {
        return Ok(None);
    };
    let store = TrustStore::open(paths.trust_store())?;
    evaluate(&store, &root, &config).map(Some)
}

/// Repository root and config path, if both exist
fn locate_repo_config(repo: &dyn RepoLocator) -> Result<Option<(PathBuf, PathBuf)>, ConfigError> {
    let Some(root) = repo.toplevel()? else {
        debug!("not in a repository; skipping repo config");
        return Ok(None);
    };
    let config = repo_config(&root);
    match fs::symlink_metadata(&config) {
        Ok(_) => Ok(Some((root, config))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %config.display(), "no repo config");
            Ok(None)
        }
        Err(e) => Err(ConfigError::io("stat repo config", &config, e)),
    }
}
