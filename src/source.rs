//! Source file classification.

use std::path::Path;

/// Extension of manifests.
pub const MANIFEST_EXT: &str = "json";
/// Extension of style sheets.
pub const STYLE_EXT: &str = "wxss";
/// Extension of markup files.
pub const MARKUP_EXT: &str = "wxml";
/// Extension of script modules.
pub const SCRIPT_EXT: &str = "js";
/// Extension of markup script modules.
pub const MODULE_EXT: &str = "wxs";

/// What a source file is, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Manifest,
    Style,
    Markup,
    Script,
    /// Markup script module (`.wxs`), copied without transformation.
    Module,
    Static,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(MANIFEST_EXT) => Self::Manifest,
            Some(STYLE_EXT) => Self::Style,
            Some(MARKUP_EXT) => Self::Markup,
            Some(SCRIPT_EXT) => Self::Script,
            Some(MODULE_EXT) => Self::Module,
            _ => Self::Static,
        }
    }
}

/// Which package a file was discovered from.
///
/// Fixed at first discovery and inherited by everything the file references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageScope {
    #[default]
    Root,
    Subpackage,
}

impl PackageScope {
    pub const fn is_subpackage(self) -> bool {
        matches!(self, Self::Subpackage)
    }
}
