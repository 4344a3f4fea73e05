//! Build session state.
//!
//! Everything a build mutates lives here and is passed by `&mut` into each
//! compiler: the compilation registry, the root component ledger, the
//! static asset index and the diagnostics. A session covers one build.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::asset::StaticAssetIndex;
use crate::config::BuildConfig;
use crate::diagnostic::Diagnostics;
use crate::ledger::ComponentLedger;
use crate::output::OutputWriter;

/// Paths already handed to a compiler.
#[derive(Debug, Default)]
pub struct CompilationRegistry {
    seen: FxHashSet<PathBuf>,
}

impl CompilationRegistry {
    /// Mark `path` compiled. Returns `false` if it already was.
    pub fn mark(&mut self, path: &Path) -> bool {
        if self.seen.contains(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Counters for the final summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildStats {
    pub written: usize,
    pub assets_copied: usize,
}

pub struct BuildSession<'a> {
    pub config: &'a BuildConfig,
    pub registry: CompilationRegistry,
    /// `usingComponents` of the root manifest.
    pub global_components: ComponentLedger,
    pub assets: StaticAssetIndex,
    pub diagnostics: Diagnostics,
    pub stats: BuildStats,
    writer: OutputWriter,
    root_manifest: PathBuf,
}

impl<'a> BuildSession<'a> {
    /// Start a session, scanning the source tree for static assets.
    pub fn new(config: &'a BuildConfig) -> Self {
        let skip = config
            .dist
            .starts_with(&config.dir)
            .then_some(config.dist.as_path());
        let assets = StaticAssetIndex::scan(&config.dir, skip);
        Self::with_assets(config, assets)
    }

    pub fn with_assets(config: &'a BuildConfig, assets: StaticAssetIndex) -> Self {
        Self {
            config,
            registry: CompilationRegistry::default(),
            global_components: ComponentLedger::new(),
            assets,
            diagnostics: Diagnostics::new(config.quiet),
            stats: BuildStats::default(),
            writer: OutputWriter::new(config),
            root_manifest: config.dir.join("app.json"),
        }
    }

    /// The `app.json` of the package.
    pub fn root_manifest(&self) -> &Path {
        &self.root_manifest
    }

    pub fn root(&self) -> &Path {
        &self.config.dir
    }

    /// Path relative to the source root, for diagnostics.
    pub fn rel(&self, path: &Path) -> PathBuf {
        self.config.root_relative(path)
    }

    /// Write `file` through the output writer and update the counters.
    pub fn emit(&mut self, file: &Path, content: Option<&str>) -> bool {
        let report = self
            .writer
            .write(file, content, &mut self.assets, &mut self.diagnostics);
        if report.written {
            self.stats.written += 1;
        }
        self.stats.assets_copied += report.assets_copied;
        report.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_marks_once() {
        let mut reg = CompilationRegistry::default();
        assert!(reg.mark(Path::new("/app/a.js")));
        assert!(!reg.mark(Path::new("/app/a.js")));
        assert!(reg.contains(Path::new("/app/a.js")));
        assert_eq!(reg.len(), 1);
    }
}
