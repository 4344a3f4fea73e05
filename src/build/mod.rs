//! Build orchestration.
//!
//! Build phases:
//! - **Init** - Empty (or create) the output directory
//! - **Scan** - Index static assets of the source tree
//! - **Compile** - Follow the manifest graph from the package seeds
//! - **Reconcile** - Report unused root components and static assets
//! - **Finalize** - Summary and timing

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::BuildConfig;
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::session::{BuildSession, BuildStats};
use crate::source::{MANIFEST_EXT, PackageScope, SCRIPT_EXT, STYLE_EXT};
use crate::utils::{path::with_ext, counted};
use crate::{debug, log};

/// Outcome of one build.
#[derive(Debug)]
pub struct BuildReport {
    pub diagnostics: Diagnostics,
    pub stats: BuildStats,
    /// Distinct source paths handed to a compiler.
    pub compiled: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn errors(&self) -> usize {
        self.diagnostics.totals().0
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics.totals().1
    }
}

/// Build the package described by `config`.
///
/// Only an unusable output directory fails the build; everything else is
/// reported through the diagnostics and the traversal goes on.
pub fn build(config: &BuildConfig) -> Result<BuildReport> {
    let started = Instant::now();
    prepare_output(&config.dist)?;

    let mut session = BuildSession::new(config);
    debug!("build"; "{} indexed", counted(session.assets.len(), "static asset"));

    compile_seeds(&mut session);
    report_unused_components(&mut session);
    report_unused_assets(&mut session);

    let report = BuildReport {
        compiled: session.registry.len(),
        stats: session.stats,
        diagnostics: session.diagnostics,
        elapsed: started.elapsed(),
    };
    log_summary(&report);
    Ok(report)
}

/// Empty the output directory, creating it if needed.
fn prepare_output(dist: &Path) -> Result<()> {
    if dist.exists() {
        fs::remove_dir_all(dist)
            .with_context(|| format!("Failed to clear output directory: {}", dist.display()))?;
    }
    fs::create_dir_all(dist)
        .with_context(|| format!("Failed to create output directory: {}", dist.display()))
}

/// `sitemap.json` (when present), `app.json`, `app.js` and `app.wxss`.
fn compile_seeds(session: &mut BuildSession<'_>) {
    let app = session.root_manifest().to_path_buf();

    let sitemap = session.root().join(format!("sitemap.{MANIFEST_EXT}"));
    if sitemap.is_file() {
        session.compile(&sitemap, PackageScope::Root);
    }
    session.compile(&app, PackageScope::Root);
    session.compile(&with_ext(&app, SCRIPT_EXT), PackageScope::Root);
    session.compile(&with_ext(&app, STYLE_EXT), PackageScope::Root);
}

fn report_unused_components(session: &mut BuildSession<'_>) {
    let rel = session.rel(session.root_manifest());
    for (tag, path) in session.global_components.unused() {
        session.diagnostics.error(
            DiagnosticKind::UnusedComponent,
            &rel,
            format!("`{tag}` ({path}) is declared but never used, declared in"),
        );
    }
}

fn report_unused_assets(session: &mut BuildSession<'_>) {
    let config = session.config;
    for asset in session.assets.remaining() {
        session.diagnostics.warning(
            DiagnosticKind::UnusedAsset,
            &config.root_relative(asset),
            "possibly unused, not copied:",
        );
    }
}

fn log_summary(report: &BuildReport) {
    let (errors, warnings) = (report.errors(), report.warnings());
    log!(
        "build";
        "{} written, {} copied in {:.2?}",
        counted(report.stats.written, "file"),
        counted(report.stats.assets_copied, "asset"),
        report.elapsed
    );
    if errors + warnings > 0 {
        log!(
            "build";
            "{} and {}",
            counted(errors, "error"),
            counted(warnings, "warning")
        );
    }
}

#[cfg(test)]
mod tests;
