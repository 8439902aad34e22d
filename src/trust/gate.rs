//! Trust gate for repository configs
//!
//! Gate states: {UNKNOWN | CHANGED} → AWAITING_CONSENT → {ACCEPTED | DECLINED},
//! {UNKNOWN | CHANGED} → REJECTED_NON_INTERACTIVE when nobody can answer, and
//! TRUSTED when the stored hash matches. Only TRUSTED and ACCEPTED let the
//! config bytes through; everything else is an error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::consent::ConsentPrompt;
use super::store::{TrustEntry, TrustStore};
use crate::config::ConfigError;
use crate::path_guard;

/// Delimiter framing the config content in the consent prompt
pub const CONTENT_DELIMITER: &str = "----";

/// Question shown after the config content
pub const CONSENT_QUESTION: &str = "Trust this config? [y/N]: ";

/// Comparison of the current file hash against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustDecision {
    /// Stored hash matches
    Trusted,
    /// Entry exists, hash differs
    Changed,
    /// No entry for this root and path
    Unknown,
}

impl fmt::Display for TrustDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustDecision::Trusted => write!(f, "trusted"),
            TrustDecision::Changed => write!(f, "changed"),
            TrustDecision::Unknown => write!(f, "unknown"),
        }
    }
}

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Changed,
    Trusted,
    AwaitingConsent,
    Accepted,
    Declined,
    RejectedNonInteractive,
}

impl From<TrustDecision> for GateState {
    fn from(decision: TrustDecision) -> Self {
        match decision {
            TrustDecision::Trusted => GateState::Trusted,
            TrustDecision::Changed => GateState::Changed,
            TrustDecision::Unknown => GateState::Unknown,
        }
    }
}

impl GateState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: GateState) -> bool {
        matches!(
            (self, target),
            (GateState::Unknown | GateState::Changed, GateState::AwaitingConsent)
                | (GateState::Unknown | GateState::Changed, GateState::RejectedNonInteractive)
                | (GateState::AwaitingConsent, GateState::Accepted)
                | (GateState::AwaitingConsent, GateState::Declined)
        )
    }

    /// Whether the config may be loaded in this state
    pub fn is_admitted(&self) -> bool {
        matches!(self, GateState::Trusted | GateState::Accepted)
    }
}

/// Reasons a repository config was refused
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("untrusted repo config: {} (run in a terminal to review and trust it)", .0.display())]
    Untrusted(PathBuf),

    #[error(
        "untrusted repo config: {} changed since it was trusted (run in a terminal to review it)",
        .0.display()
    )]
    Changed(PathBuf),

    #[error("repo config not trusted: {}", .0.display())]
    Declined(PathBuf),
}

/// SHA-256 of `bytes` as lowercase hex
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Current state of a repository config relative to the store
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Canonical repository root
    pub repo_root: PathBuf,
    /// Canonical config path
    pub config_path: PathBuf,
    /// File bytes as read
    pub bytes: Vec<u8>,
    /// Hash of `bytes`
    pub hash: String,
    pub decision: TrustDecision,
}

/// Read and hash the config, and compare against the store. Never prompts.
pub fn evaluate(
    store: &TrustStore,
    repo_root: &Path,
    config_path: &Path,
) -> Result<Evaluation, ConfigError> {
    let repo_root = path_guard::canonical(repo_root)?;
    let config_path = path_guard::canonical(config_path)?;
    let bytes = fs::read(&config_path)
        .map_err(|e| ConfigError::io("read repo config", &config_path, e))?;
    let hash = content_hash(&bytes);

    let decision = match store.find(&repo_root, &config_path) {
        Some(entry) if entry.hash == hash => TrustDecision::Trusted,
        Some(_) => TrustDecision::Changed,
        None => TrustDecision::Unknown,
    };

    Ok(Evaluation {
        repo_root,
        config_path,
        bytes,
        hash,
        decision,
    })
}

/// A repository config the gate let through
#[derive(Debug, Clone)]
pub struct Admission {
    pub repo_root: PathBuf,
    pub config_path: PathBuf,
    pub bytes: Vec<u8>,
    pub hash: String,
    /// Decision before any consent
    pub decision: TrustDecision,
    /// Either `Trusted` or `Accepted`
    pub state: GateState,
}

/// Decides whether a repository config may be loaded
pub struct TrustGate<'a> {
    store: &'a mut TrustStore,
    consent: &'a mut dyn ConsentPrompt,
}

impl<'a> TrustGate<'a> {
    pub fn new(store: &'a mut TrustStore, consent: &'a mut dyn ConsentPrompt) -> Self {
        Self { store, consent }
    }

    /// Admit the config at `config_path`, asking for consent if needed.
    ///
    /// On acceptance the store is updated and saved before returning.
    pub fn admit(&mut self, repo_root: &Path, config_path: &Path) -> Result<Admission, ConfigError> {
        let eval = evaluate(&*self.store, repo_root, config_path)?;
        let mut state = GateState::from(eval.decision);
        debug!(
            path = %eval.config_path.display(),
            decision = %eval.decision,
            "evaluated repo config"
        );

        if state == GateState::Trusted {
            return Ok(admission(eval, state));
        }

        if !self.consent.is_interactive() {
            state = transition(state, GateState::RejectedNonInteractive);
            debug!(?state, "no terminal for consent");
            return Err(match eval.decision {
                TrustDecision::Changed => TrustError::Changed(eval.config_path),
                _ => TrustError::Untrusted(eval.config_path),
            }
            .into());
        }

        state = transition(state, GateState::AwaitingConsent);
        let message = consent_message(&eval.config_path, &eval.bytes, eval.decision);
        let accepted = self
            .consent
            .ask(&message)
            .map_err(|e| ConfigError::io("read consent answer for", &eval.config_path, e))?;

        if !accepted {
            state = transition(state, GateState::Declined);
            debug!(?state, "consent declined");
            return Err(TrustError::Declined(eval.config_path).into());
        }

        state = transition(state, GateState::Accepted);
        self.store.upsert(TrustEntry {
            repo_root: eval.repo_root.clone(),
            config_path: eval.config_path.clone(),
            hash: eval.hash.clone(),
        });
        self.store.save()?;
        info!(path = %eval.config_path.display(), "trusted repo config");

        Ok(admission(eval, state))
    }
}

fn transition(from: GateState, to: GateState) -> GateState {
    debug_assert!(from.can_transition_to(to), "{from:?} -> {to:?}");
    to
}

fn admission(eval: Evaluation, state: GateState) -> Admission {
    Admission {
        repo_root: eval.repo_root,
        config_path: eval.config_path,
        bytes: eval.bytes,
        hash: eval.hash,
        decision: eval.decision,
        state,
    }
}

/// Banner, framed file content, and the question
pub fn consent_message(config_path: &Path, bytes: &[u8], decision: TrustDecision) -> String {
    let banner = match decision {
        TrustDecision::Changed => "Repo config changed",
        _ => "Untrusted repo config detected",
    };
    let content = String::from_utf8_lossy(bytes);

    let mut message = format!("{}: {}\n{}\n", banner, config_path.display(), CONTENT_DELIMITER);
    message.push_str(&content);
    if !content.ends_with('\n') {
        message.push('\n');
    }
    message.push_str(CONTENT_DELIMITER);
    message.push('\n');
    message.push_str(CONSENT_QUESTION);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::StreamConsent;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: PathBuf,
        config: PathBuf,
        store_path: PathBuf,
    }

    fn fixture(contents: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir_all(&root).unwrap();
        let config = root.join(".git-ai-commit.toml");
        fs::write(&config, contents).unwrap();
        let store_path = dir.path().join("config/trusted_repos.json");
        Fixture {
            _dir: dir,
            root,
            config,
            store_path,
        }
    }

    fn answering(answer: &str) -> StreamConsent<Cursor<String>, Vec<u8>> {
        StreamConsent::new(Cursor::new(answer.to_string()), Vec::new(), true)
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash(b"engine = \"codex\"\n").len(), 64);
    }

    #[test]
    fn test_unknown_accept_records_entry() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        let mut consent = answering("y\n");

        let admission = TrustGate::new(&mut store, &mut consent)
            .admit(&fx.root, &fx.config)
            .unwrap();

        assert_eq!(admission.decision, TrustDecision::Unknown);
        assert_eq!(admission.state, GateState::Accepted);
        assert_eq!(admission.bytes, b"engine = \"codex\"\n");
        assert_eq!(store.len(), 1);

        let reloaded = TrustStore::open(&fx.store_path).unwrap();
        let entry = reloaded
            .find(&admission.repo_root, &admission.config_path)
            .unwrap();
        assert_eq!(entry.hash, admission.hash);
    }

    #[test]
    fn test_prompt_shows_banner_and_content() {
        let fx = fixture("engine = \"codex\"");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        let mut consent = answering("n\n");

        let _ = TrustGate::new(&mut store, &mut consent).admit(&fx.root, &fx.config);

        let shown = String::from_utf8(consent.into_output()).unwrap();
        assert!(shown.starts_with("Untrusted repo config detected: "));
        assert!(shown.contains("----\nengine = \"codex\"\n----\n"));
        assert!(shown.ends_with("Trust this config? [y/N]: "));
    }

    #[test]
    fn test_decline_leaves_store_untouched() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        let mut consent = answering("nope\n");

        let err = TrustGate::new(&mut store, &mut consent)
            .admit(&fx.root, &fx.config)
            .unwrap_err();

        assert!(matches!(err, ConfigError::Trust(TrustError::Declined(_))));
        assert!(store.is_empty());
        assert!(!fx.store_path.exists());
    }

    #[test]
    fn test_non_interactive_rejects_without_prompt() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        let mut consent = StreamConsent::new(Cursor::new("y\n".to_string()), Vec::new(), false);

        let err = TrustGate::new(&mut store, &mut consent)
            .admit(&fx.root, &fx.config)
            .unwrap_err();

        assert!(matches!(err, ConfigError::Trust(TrustError::Untrusted(_))));
        assert!(err.to_string().contains("untrusted"));
        assert!(consent.into_output().is_empty());
    }

    #[test]
    fn test_trusted_skips_consent() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        let mut consent = answering("y\n");
        TrustGate::new(&mut store, &mut consent)
            .admit(&fx.root, &fx.config)
            .unwrap();
        let saved = fs::read(&fx.store_path).unwrap();

        // Second pass: nobody can answer, yet the config is admitted
        let mut silent = StreamConsent::new(Cursor::new(String::new()), Vec::new(), false);
        let admission = TrustGate::new(&mut store, &mut silent)
            .admit(&fx.root, &fx.config)
            .unwrap();

        assert_eq!(admission.state, GateState::Trusted);
        assert!(silent.into_output().is_empty());
        assert_eq!(fs::read(&fx.store_path).unwrap(), saved);
    }

    #[test]
    fn test_changed_reprompts_and_updates_in_place() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        TrustGate::new(&mut store, &mut answering("yes\n"))
            .admit(&fx.root, &fx.config)
            .unwrap();
        let first_hash = store.entries()[0].hash.clone();

        fs::write(&fx.config, "engine = \"claude\"\n").unwrap();
        assert_eq!(
            evaluate(&store, &fx.root, &fx.config).unwrap().decision,
            TrustDecision::Changed
        );

        let mut consent = answering("Y\n");
        let admission = TrustGate::new(&mut store, &mut consent)
            .admit(&fx.root, &fx.config)
            .unwrap();

        assert_eq!(admission.decision, TrustDecision::Changed);
        assert_eq!(store.len(), 1);
        assert_ne!(store.entries()[0].hash, first_hash);
        assert_eq!(store.entries()[0].hash, content_hash(b"engine = \"claude\"\n"));

        let shown = String::from_utf8(consent.into_output()).unwrap();
        assert!(shown.starts_with("Repo config changed: "));
    }

    #[test]
    fn test_changed_non_interactive_mentions_untrusted() {
        let fx = fixture("engine = \"codex\"\n");
        let mut store = TrustStore::open(&fx.store_path).unwrap();
        TrustGate::new(&mut store, &mut answering("y\n"))
            .admit(&fx.root, &fx.config)
            .unwrap();
        fs::write(&fx.config, "engine = \"gemini\"\n").unwrap();

        let mut silent = StreamConsent::new(Cursor::new(String::new()), Vec::new(), false);
        let err = TrustGate::new(&mut store, &mut silent)
            .admit(&fx.root, &fx.config)
            .unwrap_err();

        assert!(matches!(err, ConfigError::Trust(TrustError::Changed(_))));
        assert!(err.to_string().contains("untrusted"));
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let fx = fixture("");
        fs::remove_file(&fx.config).unwrap();
        let store = TrustStore::open(&fx.store_path).unwrap();

        let err = evaluate(&store, &fx.root, &fx.config).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_state_transitions() {
        assert!(GateState::Unknown.can_transition_to(GateState::AwaitingConsent));
        assert!(GateState::Changed.can_transition_to(GateState::RejectedNonInteractive));
        assert!(GateState::AwaitingConsent.can_transition_to(GateState::Accepted));
        assert!(!GateState::Trusted.can_transition_to(GateState::AwaitingConsent));
        assert!(!GateState::Declined.can_transition_to(GateState::Accepted));
        assert!(GateState::Accepted.is_admitted());
        assert!(!GateState::RejectedNonInteractive.is_admitted());
    }
}
