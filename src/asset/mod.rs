//! Static asset index.
//!
//! Built once from a full-tree scan. Entries are keyed by file name, not
//! path: two assets sharing a name collapse to the one scanned last. An
//! entry leaves the index the first time written output mentions it, and
//! whatever is left after the build is reported as possibly unused.

mod detect;
mod scan;

pub use detect::{AssetUsageDetector, SubstringDetector};
pub use scan::{is_static_asset, scan_static_files};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct StaticAssetIndex {
    entries: BTreeMap<String, PathBuf>,
    detector: Box<dyn AssetUsageDetector>,
}

impl StaticAssetIndex {
    /// Index every static file under `root`, skipping `skip`.
    pub fn scan(root: &Path, skip: Option<&Path>) -> Self {
        Self::from_files(scan_static_files(root, skip))
    }

    pub fn from_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        let entries = files
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_owned();
                Some((name, path))
            })
            .collect();
        Self {
            entries,
            detector: Box::new(SubstringDetector),
        }
    }

    /// Swap the usage detector.
    pub fn with_detector(mut self, detector: impl AssetUsageDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Remove and return every asset `content` refers to.
    pub fn take_used(&mut self, content: &str) -> Vec<PathBuf> {
        let used: Vec<String> = self
            .entries
            .keys()
            .filter(|name| self.detector.is_used(name, content))
            .cloned()
            .collect();

        used.iter()
            .filter_map(|name| self.entries.remove(name))
            .collect()
    }

    /// Assets not referenced so far, in name order.
    pub fn remaining(&self) -> impl Iterator<Item = &Path> {
        self.entries.values().map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
