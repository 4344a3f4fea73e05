//! Reference resolution.
//!
//! Turns the strings found in manifests, markup and scripts into source
//! paths. Every returned path is absolute and lexically clean, so it can be
//! used as a registry key directly.

use std::path::{Path, PathBuf};

use crate::source::{MANIFEST_EXT, MARKUP_EXT, SCRIPT_EXT, STYLE_EXT};
use crate::utils::path::{ensure_ext, join_clean, normalize_path, with_ext};

/// Resolve a page identifier (`pages/index/index`) to its script.
///
/// Tries the identifier verbatim, then relative to the package root with
/// the script extension appended.
pub fn resolve_page(root: &Path, page: &str) -> Option<PathBuf> {
    let verbatim = Path::new(page);
    if verbatim.is_file() {
        return Some(normalize_path(verbatim));
    }
    let candidate = join_clean(root, &format!("{page}.{SCRIPT_EXT}"));
    candidate.is_file().then_some(candidate)
}

/// Resolve a `usingComponents` path to the component's script.
///
/// `/`-prefixed paths start at the package root, everything else at the
/// declaring manifest's directory. A path naming a directory resolves to
/// its `index.js`. Plugin and URL-like references never resolve.
pub fn resolve_component(root: &Path, manifest_dir: &Path, reference: &str) -> Option<PathBuf> {
    if reference.contains("://") {
        return None;
    }
    let base = if reference.starts_with('/') {
        root
    } else {
        manifest_dir
    };
    let target = join_clean(base, reference);

    let direct = ensure_ext(target.clone(), SCRIPT_EXT);
    if direct.is_file() {
        return Some(direct);
    }
    let index = target.join(format!("index.{SCRIPT_EXT}"));
    index.is_file().then_some(index)
}

/// Resolve a script module specifier against the importing file.
///
/// A specifier naming an existing file is taken as is, otherwise the
/// script extension is appended. Bare package names end up as paths next
/// to the importer and normally do not exist; callers report those
/// instead of following them.
pub fn resolve_module(root: &Path, importer: &Path, spec: &str) -> Option<PathBuf> {
    let target = reference_path(root, importer, spec);
    if target.extension().is_some() && target.is_file() {
        return Some(target);
    }
    let candidate = ensure_ext(target, SCRIPT_EXT);
    candidate.is_file().then_some(candidate)
}

/// Path a markup or style reference points at, without checking it exists.
pub fn reference_path(root: &Path, from: &Path, reference: &str) -> PathBuf {
    if reference.starts_with('/') {
        join_clean(root, reference)
    } else {
        join_clean(from.parent().unwrap_or(root), reference)
    }
}

/// Whether a markup `src` value exists next to the file or under the root.
pub fn static_exists(root: &Path, from: &Path, value: &str) -> bool {
    let dir = from.parent().unwrap_or(root);
    join_clean(dir, value).exists() || join_clean(root, value).exists()
}

/// The script, manifest, markup and style sharing a basename.
pub fn sibling_set(script: &Path) -> [PathBuf; 4] {
    [
        script.to_path_buf(),
        with_ext(script, MANIFEST_EXT),
        with_ext(script, MARKUP_EXT),
        with_ext(script, STYLE_EXT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_resolve_page() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "pages/index/index.js");

        assert_eq!(
            resolve_page(root, "pages/index/index"),
            Some(root.join("pages/index/index.js"))
        );
        assert_eq!(resolve_page(root, "pages/missing/missing"), None);
    }

    #[test]
    fn test_resolve_component_forms() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "components/card/card.js");
        touch(root, "components/list/index.js");
        let page_dir = root.join("pages/index");

        assert_eq!(
            resolve_component(root, &page_dir, "../../components/card/card"),
            Some(root.join("components/card/card.js"))
        );
        assert_eq!(
            resolve_component(root, &page_dir, "/components/card/card"),
            Some(root.join("components/card/card.js"))
        );
        assert_eq!(
            resolve_component(root, &page_dir, "/components/list"),
            Some(root.join("components/list/index.js"))
        );
        assert_eq!(
            resolve_component(root, &page_dir, "plugin://chart/line"),
            None
        );
    }

    #[test]
    fn test_resolve_module() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "utils/util.js");
        touch(root, "data/cities.json");
        let importer = root.join("pages/index/index.js");

        assert_eq!(
            resolve_module(root, &importer, "../../utils/util"),
            Some(root.join("utils/util.js"))
        );
        assert_eq!(
            resolve_module(root, &importer, "/utils/util.js"),
            Some(root.join("utils/util.js"))
        );
        assert_eq!(
            resolve_module(root, &importer, "../../data/cities.json"),
            Some(root.join("data/cities.json"))
        );
        assert_eq!(resolve_module(root, &importer, "lodash"), None);
    }

    #[test]
    fn test_static_exists() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "images/logo.png");
        touch(root, "pages/index/local.png");
        let from = root.join("pages/index/index.wxml");

        assert!(static_exists(root, &from, "/images/logo.png"));
        assert!(static_exists(root, &from, "images/logo.png"));
        assert!(static_exists(root, &from, "./local.png"));
        assert!(!static_exists(root, &from, "missing.png"));
    }

    #[test]
    fn test_sibling_set() {
        let set = sibling_set(Path::new("/app/pages/a/a.js"));
        assert_eq!(set[1], PathBuf::from("/app/pages/a/a.json"));
        assert_eq!(set[2], PathBuf::from("/app/pages/a/a.wxml"));
        assert_eq!(set[3], PathBuf::from("/app/pages/a/a.wxss"));
    }
}
