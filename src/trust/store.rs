//! Persistent registry of trusted repository configs
//!
//! On disk the store is a JSON document:
//!
//! ```json
//! { "entries": [ { "repo_root": "...", "config_path": "...", "hash": "..." } ] }
//! ```
//!
//! Older releases wrote `entries` as a single map keyed by
//! `"<repo_root>\n<config_path>"`. That layout is still read and normalized in
//! memory; it is only replaced on disk by the next [`TrustStore::save`].

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Separator between root and config path in legacy map keys
const LEGACY_KEY_SEPARATOR: char = '\n';

/// A trusted `(repo_root, config_path)` pair with the hash that was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEntry {
    /// Canonical repository root
    pub repo_root: PathBuf,

    /// Canonical path of the repository config file
    pub config_path: PathBuf,

    /// Lowercase hex SHA-256 of the accepted file bytes
    pub hash: String,
}

impl TrustEntry {
    fn matches(&self, repo_root: &Path, config_path: &Path) -> bool {
        self.repo_root == repo_root && self.config_path == config_path
    }
}

/// Schema that was found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSchema {
    /// No file, or an empty one
    Empty,
    /// Current list layout
    Current,
    /// Legacy map layout, converted in memory
    Legacy,
}

/// Current layout; a missing or null `entries` is an empty list
#[derive(Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: Option<Vec<TrustEntry>>,
}

#[derive(Deserialize)]
struct LegacyStoreFile {
    entries: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    entries: &'a [TrustEntry],
}

/// Trust store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("read trust store {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse trust store {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("encode trust store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("write trust store {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed set of trust entries
#[derive(Debug, Clone)]
pub struct TrustStore {
    path: PathBuf,
    entries: Vec<TrustEntry>,
    schema: StoreSchema,
}

impl TrustStore {
    /// Load the store at `path`. A missing or blank file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no trust store yet");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty(path));
        }

        let (entries, schema) = match serde_json::from_slice::<StoreFile>(&data) {
            Ok(file) => (file.entries.unwrap_or_default(), StoreSchema::Current),
            Err(current_err) => match serde_json::from_slice::<LegacyStoreFile>(&data) {
                Ok(legacy) => {
                    debug!(
                        path = %path.display(),
                        count = legacy.entries.len(),
                        "converting legacy trust store"
                    );
                    (from_legacy(legacy.entries), StoreSchema::Legacy)
                }
                // Report why the current layout failed, not the legacy one
                Err(_) => {
                    return Err(StoreError::Parse {
                        path,
                        source: current_err,
                    })
                }
            },
        };

        Ok(Self {
            path,
            entries,
            schema,
        })
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
            schema: StoreSchema::Empty,
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Layout the store was loaded from
    pub fn schema(&self) -> StoreSchema {
        self.schema
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[TrustEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup by canonical root and config path
    pub fn find(&self, repo_root: &Path, config_path: &Path) -> Option<&TrustEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(repo_root, config_path))
    }

    /// Insert `entry`, or replace the hash of the entry with the same key.
    ///
    /// Returns `true` when a new entry was appended.
    pub fn upsert(&mut self, entry: TrustEntry) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.matches(&entry.repo_root, &entry.config_path))
        {
            Some(existing) => {
                existing.hash = entry.hash;
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        }
    }

    /// Write the store in the current schema with owner-only permissions.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&StoreFileRef {
            entries: &self.entries,
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        write_private(&self.path, &json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = self.entries.len(), "saved trust store");
        Ok(())
    }
}

fn from_legacy(map: BTreeMap<String, String>) -> Vec<TrustEntry> {
    map.into_iter()
        .filter_map(|(key, hash)| match key.split_once(LEGACY_KEY_SEPARATOR) {
            Some((root, config)) => Some(TrustEntry {
                repo_root: PathBuf::from(root),
                config_path: PathBuf::from(config),
                hash,
            }),
            None => {
                warn!(key = %key, "skipping malformed legacy trust entry");
                None
            }
        })
        .collect()
}

/// Write to a sibling temp file, then rename over `path`
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    let written = write_temp(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

#[cfg(unix)]
fn write_temp(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_temp(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
