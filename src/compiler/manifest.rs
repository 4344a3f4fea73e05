//! Manifest graph resolver.
//!
//! Parses `app.json`, page and component manifests, and schedules every
//! page, component and subpackage page they declare. Entries are taken
//! from the end of each list first; the order is not significant, only
//! deterministic.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::resolve::{resolve_component, resolve_page, sibling_set};
use crate::diagnostic::DiagnosticKind;
use crate::ledger::ComponentLedger;
use crate::session::BuildSession;
use crate::source::PackageScope;

/// The fields of a manifest the compiler follows.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    pub pages: Vec<String>,
    pub using_components: Map<String, Value>,
    #[serde(alias = "Subpackages", alias = "subPackages")]
    pub subpackages: Vec<Subpackage>,
    pub lazy_code_loading: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Subpackage {
    pub root: Option<String>,
    pub name: Option<String>,
    pub pages: Vec<String>,
}

impl Subpackage {
    /// `root`, falling back to `name`.
    pub fn root_dir(&self) -> Option<&str> {
        self.root.as_deref().or(self.name.as_deref())
    }

    /// Page identifiers joined onto the subpackage root, last first.
    pub fn page_ids(&self) -> Vec<String> {
        let Some(root) = self.root_dir() else {
            return Vec::new();
        };
        let root = root.trim_end_matches('/');
        self.pages
            .iter()
            .rev()
            .map(|page| format!("{root}/{}", page.trim_start_matches('/')))
            .collect()
    }
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// `(tag, path)` pairs with string paths, in declaration order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &str)> {
        self.using_components
            .iter()
            .filter_map(|(tag, path)| Some((tag.as_str(), path.as_str()?)))
    }

    /// Ledger over this manifest's `usingComponents`.
    pub fn component_ledger(&self) -> ComponentLedger {
        ComponentLedger::from_declarations(
            self.components()
                .map(|(tag, path)| (tag.to_owned(), path.to_owned())),
        )
    }

    /// `lazyCodeLoading` is `true` or a non-empty mode string.
    pub fn lazy_code_loading_enabled(&self) -> bool {
        match &self.lazy_code_loading {
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(mode)) => !mode.is_empty(),
            _ => false,
        }
    }
}

/// Read the manifest next to `file`, if there is a readable one.
pub fn read_sibling_manifest(file: &Path) -> Option<Manifest> {
    let content = fs::read_to_string(file.with_extension("json")).ok()?;
    Manifest::parse(&content).ok()
}

pub fn compile_manifest(session: &mut BuildSession<'_>, file: &Path, scope: PackageScope) {
    let rel = session.rel(file);

    let Ok(content) = fs::read_to_string(file) else {
        session
            .diagnostics
            .error(DiagnosticKind::MissingManifest, &rel, "manifest not found:");
        return;
    };
    let manifest = match Manifest::parse(&content) {
        Ok(manifest) => manifest,
        Err(err) => {
            session.diagnostics.error(
                DiagnosticKind::InvalidManifest,
                &rel,
                format!("invalid manifest ({err}):"),
            );
            return;
        }
    };

    session.emit(file, None);

    if file == session.root_manifest() {
        if !manifest.lazy_code_loading_enabled() {
            session.diagnostics.error(
                DiagnosticKind::LazyCodeLoading,
                &rel,
                "`lazyCodeLoading` must be enabled in",
            );
        }
        session.global_components = manifest.component_ledger();
    }

    let root = session.root().to_path_buf();

    for page in manifest.pages.iter().rev() {
        match resolve_page(&root, page) {
            Some(script) => schedule_siblings(session, &script, scope),
            None => report_unresolved(session, page, &rel),
        }
    }

    let manifest_dir = file.parent().unwrap_or(&root);
    for (_, reference) in manifest.components() {
        match resolve_component(&root, manifest_dir, reference) {
            Some(script) => schedule_siblings(session, &script, scope),
            None => report_unresolved(session, reference, &rel),
        }
    }

    for subpackage in manifest.subpackages.iter().rev() {
        for page in subpackage.page_ids() {
            match resolve_page(&root, &page) {
                Some(script) => schedule_siblings(session, &script, PackageScope::Subpackage),
                None => report_unresolved(session, &page, &rel),
            }
        }
    }
}

fn schedule_siblings(session: &mut BuildSession<'_>, script: &Path, scope: PackageScope) {
    for file in sibling_set(script) {
        session.compile(&file, scope);
    }
}

fn report_unresolved(session: &mut BuildSession<'_>, reference: &str, rel: &Path) {
    session.diagnostics.error(
        DiagnosticKind::UnresolvedPath,
        rel,
        format!("optimize this path to save compile time: `{reference}`, declared in"),
    );
}
