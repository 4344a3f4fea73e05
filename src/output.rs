//! Output writer.
//!
//! Mirrors a source file under the destination root, then copies every
//! static asset the written text mentions.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::asset::StaticAssetIndex;
use crate::config::{BuildConfig, LimitsConfig};
use crate::diagnostic::{DiagnosticKind, Diagnostics};

/// What a single write did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// The file itself reached the destination.
    pub written: bool,
    /// Assets copied because the written text referenced them.
    pub assets_copied: usize,
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    source_root: PathBuf,
    dist_root: PathBuf,
    limits: LimitsConfig,
}

impl OutputWriter {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            source_root: config.dir.clone(),
            dist_root: config.dist.clone(),
            limits: config.limits,
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.source_root).unwrap_or(path)
    }

    /// Destination of `path` under the output root, `None` for paths
    /// outside the source root.
    pub fn dist_path(&self, path: &Path) -> Option<PathBuf> {
        let rel = path.strip_prefix(&self.source_root).ok()?;
        Some(self.dist_root.join(rel))
    }

    /// Write `file` to the destination.
    ///
    /// With `content` the text is written as-is; without it the source
    /// bytes are copied. Zero-byte sources are rejected, oversized ones are
    /// written with a warning.
    pub fn write(
        &self,
        file: &Path,
        content: Option<&str>,
        assets: &mut StaticAssetIndex,
        diag: &mut Diagnostics,
    ) -> WriteReport {
        let rel = self.relative(file);
        let Some(dest) = self.dist_path(file) else {
            diag.error(
                DiagnosticKind::OutsideRoot,
                rel,
                "outside the source root, not written:",
            );
            return WriteReport::default();
        };

        let size = match fs::metadata(file) {
            Ok(meta) => meta.len(),
            Err(err) => {
                diag.error(
                    DiagnosticKind::MissingSource,
                    rel,
                    format!("cannot read source ({err}):"),
                );
                return WriteReport::default();
            }
        };

        if size == 0 {
            diag.error(DiagnosticKind::EmptyFile, rel, "empty file:");
            return WriteReport::default();
        }
        if size > self.limits.file_warn {
            diag.warning(
                DiagnosticKind::OversizedFile,
                rel,
                format!("file larger than {} KiB:", self.limits.file_warn / 1024),
            );
        }

        let result = match content {
            Some(text) => write_file(&dest, text.as_bytes()),
            None => copy_file(file, &dest),
        };
        if let Err(err) = result {
            diag.error(
                DiagnosticKind::WriteFailure,
                rel,
                format!("cannot write `{}` ({err}):", dest.display()),
            );
            return WriteReport::default();
        }

        let scanned: Cow<'_, str> = match content {
            Some(text) => Cow::Borrowed(text),
            None => fs::read(file)
                .map(|bytes| Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()))
                .unwrap_or_default(),
        };
        let assets_copied = self.copy_referenced_assets(&scanned, assets, diag);

        diag.success(rel);
        WriteReport {
            written: true,
            assets_copied,
        }
    }

    /// Copy assets mentioned by `content` and drop them from the index.
    ///
    /// An oversized asset still leaves the index: it is referenced, just
    /// not shipped.
    fn copy_referenced_assets(
        &self,
        content: &str,
        assets: &mut StaticAssetIndex,
        diag: &mut Diagnostics,
    ) -> usize {
        let mut copied = 0;
        for asset in assets.take_used(content) {
            let rel = self.relative(&asset);
            let size = fs::metadata(&asset).map(|m| m.len()).unwrap_or(0);
            if size > self.limits.asset {
                diag.error(
                    DiagnosticKind::OversizedAsset,
                    rel,
                    format!(
                        "asset larger than {} KiB, not copied:",
                        self.limits.asset / 1024
                    ),
                );
                continue;
            }

            let Some(dest) = self.dist_path(&asset) else {
                continue;
            };
            match copy_file(&asset, &dest) {
                Ok(()) => copied += 1,
                Err(err) => diag.error(
                    DiagnosticKind::WriteFailure,
                    rel,
                    format!("cannot copy asset ({err}):"),
                ),
            }
        }
        copied
    }
}

fn write_file(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, bytes)
}

fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest).map(|_| ())
}
