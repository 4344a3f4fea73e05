//! Per-kind compilers and the dispatcher that routes files to them.
//!
//! Every reference discovered while compiling goes back through
//! [`BuildSession::compile`], which compiles each path at most once.

mod manifest;
mod markup;
mod resolve;
mod script;
mod style;

use std::path::Path;

use manifest::compile_manifest;
use markup::compile_markup;
use script::compile_script;
use style::compile_style;

use crate::debug;
use crate::diagnostic::DiagnosticKind;
use crate::session::BuildSession;
use crate::source::{PackageScope, SourceKind};
use crate::utils::path::clean_path;

impl BuildSession<'_> {
    /// Compile `file` unless it already was.
    ///
    /// The scope of the first request wins; later requests for the same
    /// path are no-ops.
    pub fn compile(&mut self, file: &Path, scope: PackageScope) {
        let file = clean_path(file);
        if !self.registry.mark(&file) {
            return;
        }
        if !file.starts_with(self.root()) {
            self.diagnostics.error(
                DiagnosticKind::OutsideRoot,
                &file,
                "reference leaves the source root, not compiled:",
            );
            return;
        }

        match SourceKind::from_path(&file) {
            SourceKind::Manifest => compile_manifest(self, &file, scope),
            SourceKind::Style => compile_style(self, &file, scope),
            SourceKind::Markup => compile_markup(self, &file, scope),
            SourceKind::Script => compile_script(self, &file, scope),
            SourceKind::Module => compile_verbatim(self, &file),
            SourceKind::Static => {
                debug!("skip"; "{} is not compiled", self.rel(&file).display());
            }
        }
    }
}

/// Copy a file through the output writer without looking inside.
pub fn compile_verbatim(session: &mut BuildSession<'_>, file: &Path) {
    if !file.is_file() {
        let rel = session.rel(file);
        session
            .diagnostics
            .error(DiagnosticKind::MissingSource, &rel, "source not found:");
        return;
    }
    session.emit(file, None);
}
