//! Static asset scanning (pure, no side effects).

use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// Tooling and dependency directories never scanned.
const IGNORED_DIRS: &[&str] = &[".git", ".vscode", "node_modules", "miniprogram_npm", "npm"];

/// Extensions handled by the compilers (or documentation), never assets.
const CODE_EXTS: &[&str] = &["js", "json", "wxml", "wxss", "wxs", "md"];

const IGNORED_FILES: &[&str] = &[".DS_Store", ".gitignore"];

/// Scan `root` for static assets.
///
/// Returns every file that is not code, skipping tooling directories and
/// `skip` (the destination directory when it lives inside the source tree).
/// Entries come back in sorted depth-first order.
///
/// ```text
/// app/
/// ├── app.json             -> (code, skipped)
/// ├── images/logo.png      -> app/images/logo.png
/// └── node_modules/...     -> (ignored directory)
/// ```
pub fn scan_static_files(root: &Path, skip: Option<&Path>) -> Vec<PathBuf> {
    let skip = skip.map(Path::to_path_buf);

    WalkDir::new(root)
        .sort(true)
        .skip_hidden(false)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|entry| {
                entry.as_ref().map_or(true, |e| {
                    if !e.file_type().is_dir() {
                        return true;
                    }
                    let ignored = e
                        .file_name()
                        .to_str()
                        .is_some_and(|name| IGNORED_DIRS.contains(&name));
                    !ignored && skip.as_deref() != Some(e.path().as_path())
                })
            });
        })
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| is_static_asset(path))
        .collect()
}

/// Whether a file name qualifies as a static asset.
pub fn is_static_asset(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if IGNORED_FILES.contains(&name) {
        return false;
    }
    !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTS.contains(&ext))
}
