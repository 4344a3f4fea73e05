//! Path helpers for package sources and their output mirror.
//!
//! - `normalize_path` - absolute form of a CLI or config directory
//! - `clean_path` - lexical `.`/`..` resolution without touching the disk
//! - `join_clean` - join a reference onto a base directory and clean it
//! - `with_ext` - swap a file extension, keeping the stem

use std::path::{Component, Path, PathBuf};

/// Absolute form of `path`, canonical when it exists.
///
/// A directory that does not exist yet (usually the output directory) is
/// cleaned lexically, joined onto the working directory when relative.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean_path(path)
        } else {
            std::env::current_dir()
                .map_or_else(|_| path.to_path_buf(), |cwd| clean_path(&cwd.join(path)))
        }
    })
}

/// Resolve `.` and `..` components lexically.
///
/// Two references to the same file through different relative spellings
/// (`a/../b.js`, `./b.js`) must produce the same key in the compilation
/// registry, so every discovered path goes through here.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join a reference string onto `base` and clean the result.
///
/// Leading slashes are stripped first: `Path::join` would otherwise replace
/// `base` entirely, while references like `/images/a.png` are meant to be
/// read relative to the package root.
pub fn join_clean(base: &Path, reference: &str) -> PathBuf {
    clean_path(&base.join(reference.trim_start_matches('/')))
}

/// Replace the extension of `path` with `ext` (given without the dot).
#[inline]
pub fn with_ext(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Append `.ext` unless the path already ends with it.
///
/// Unlike [`with_ext`] this never strips an existing dotted suffix, so
/// `utils.min` becomes `utils.min.js`.
pub fn ensure_ext(path: PathBuf, ext: &str) -> PathBuf {
    if path.extension().is_some_and(|e| e == ext) {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}
