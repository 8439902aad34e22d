//! Path containment checks
//!
//! Decides whether a file path lies inside a root directory. Paths coming from
//! a repository config are attacker-controlled, so the check is done twice:
//! once lexically (so `../` escapes are caught even when the target does not
//! exist) and once on fully canonicalized paths (so symlinks cannot smuggle a
//! path out of the root).

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Path guard errors
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("path {} escapes {}", .path.display(), .root.display())]
    Escape { path: PathBuf, root: PathBuf },

    #[error("resolve {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve `path` to an absolute, symlink-free form.
pub fn canonical(path: &Path) -> Result<PathBuf, GuardError> {
    fs::canonicalize(path).map_err(|source| GuardError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// True iff `candidate` resolves to `root` or a path below it.
///
/// Both paths are canonicalized first; fails if either cannot be resolved.
pub fn within(candidate: &Path, root: &Path) -> io::Result<bool> {
    let candidate = fs::canonicalize(candidate)?;
    let root = fs::canonicalize(root)?;
    Ok(is_contained(&candidate, &root))
}

/// Lexical containment check that never touches the filesystem.
///
/// `.` and `..` segments are folded before comparing, and relative paths are
/// taken relative to the current working directory.
pub fn within_lexical(candidate: &Path, root: &Path) -> bool {
    let candidate = normalize(&absolutize(candidate));
    let root = normalize(&absolutize(root));
    is_contained(&candidate, &root)
}

/// Run both checks and return the canonical candidate.
///
/// An escape is reported as [`GuardError::Escape`] even when the target does
/// not exist; only paths that stay inside the root lexically are resolved.
pub fn ensure_within(candidate: &Path, root: &Path) -> Result<PathBuf, GuardError> {
    let escape = || GuardError::Escape {
        path: candidate.to_path_buf(),
        root: root.to_path_buf(),
    };

    if !within_lexical(candidate, root) {
        return Err(escape());
    }

    let resolved = canonical(candidate)?;
    let root_resolved = canonical(root)?;
    if !is_contained(&resolved, &root_resolved) {
        return Err(escape());
    }
    Ok(resolved)
}

/// Relative path from `root` to `candidate`, `.` when equal.
///
/// Returns `None` when the relative path would start with `..`.
fn relative_to(candidate: &Path, root: &Path) -> Option<PathBuf> {
    let rel = candidate.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(rel.to_path_buf())
    }
}

fn is_contained(candidate: &Path, root: &Path) -> bool {
    match relative_to(candidate, root) {
        Some(rel) => !matches!(rel.components().next(), Some(Component::ParentDir)),
        None => false,
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with_file() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        fs::create_dir_all(root.join("prompts")).unwrap();
        fs::write(root.join("prompts/msg.md"), "hello").unwrap();
        (dir, root)
    }

    #[test]
    fn test_root_is_within_itself() {
        let (_dir, root) = repo_with_file();
        assert!(within(&root, &root).unwrap());
    }

    #[test]
    fn test_nested_file_within() {
        let (_dir, root) = repo_with_file();
        assert!(within(&root.join("prompts/msg.md"), &root).unwrap());
        assert!(within(&root.join("prompts/../prompts/msg.md"), &root).unwrap());
    }

    #[test]
    fn test_sibling_not_within() {
        let (dir, root) = repo_with_file();
        fs::write(dir.path().join("outside.md"), "x").unwrap();
        assert!(!within(&dir.path().join("outside.md"), &root).unwrap());
    }

    #[test]
    fn test_prefix_sharing_sibling_not_within() {
        let (dir, root) = repo_with_file();
        let sibling = dir.path().join("repo-evil");
        fs::create_dir_all(&sibling).unwrap();
        assert!(!within(&sibling, &root).unwrap());
    }

    #[test]
    fn test_missing_path_is_io_error() {
        let (_dir, root) = repo_with_file();
        let err = within(&root.join("nope.md"), &root).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_lexical_catches_parent_segments() {
        let root = Path::new("/srv/repo");
        assert!(within_lexical(Path::new("/srv/repo/a/b.md"), root));
        assert!(within_lexical(Path::new("/srv/repo/a/../b.md"), root));
        assert!(!within_lexical(Path::new("/srv/repo/../../etc/passwd"), root));
        assert!(!within_lexical(Path::new("/etc/passwd"), root));
        assert!(!within_lexical(Path::new("/srv/repository"), root));
    }

    #[test]
    fn test_normalize_folds_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_ensure_within_escape_without_target() {
        let (_dir, root) = repo_with_file();
        let err = ensure_within(&root.join("../../etc/does-not-exist"), &root).unwrap_err();
        assert!(matches!(err, GuardError::Escape { .. }));
    }

    #[test]
    fn test_ensure_within_returns_canonical() {
        let (_dir, root) = repo_with_file();
        let resolved = ensure_within(&root.join("./prompts/msg.md"), &root).unwrap();
        assert_eq!(resolved, fs::canonicalize(root.join("prompts/msg.md")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (dir, root) = repo_with_file();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, "token").unwrap();
        std::os::unix::fs::symlink(&secret, root.join("innocent.md")).unwrap();

        let link = root.join("innocent.md");
        assert!(within_lexical(&link, &root));
        assert!(!within(&link, &root).unwrap());
        assert!(matches!(
            ensure_within(&link, &root),
            Err(GuardError::Escape { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root_compares_canonically() {
        let (dir, root) = repo_with_file();
        let alias = dir.path().join("alias");
        std::os::unix::fs::symlink(&root, &alias).unwrap();

        assert!(within(&alias.join("prompts/msg.md"), &root).unwrap());
        assert!(within(&root.join("prompts/msg.md"), &alias).unwrap());
    }
}
