//! Markup compiler.
//!
//! Markup is validated, not rewritten. The walk checks attribute values,
//! drains the component ledgers and collects the `wxs`, `import` and
//! `include` targets to compile next. The file is then copied as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::manifest::read_sibling_manifest;
use super::resolve::{reference_path, static_exists};
use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::ledger::ComponentLedger;
use crate::session::BuildSession;
use crate::source::{MARKUP_EXT, MODULE_EXT, PackageScope};

/// Remote `src` values are never checked on disk.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http(s)?://([\w-]+\.)+[\w-]+(/[\w\- ./?%&=]*)?").expect("valid url pattern")
});

/// Callbacks for a markup walk, in document order.
pub trait MarkupVisitor {
    fn visit_element(&mut self, _tag: &str) {}

    /// `value` is `None` for attributes written without `=`.
    fn visit_attribute(&mut self, _tag: &str, _key: &str, _value: Option<&str>) {}
}

/// Visit every element of `dom`, parents before children.
pub fn walk_markup<V: MarkupVisitor + ?Sized>(visitor: &mut V, dom: &tl::VDom<'_>) {
    let parser = dom.parser();
    for handle in dom.children() {
        walk_node(visitor, *handle, parser);
    }
}

fn walk_node<V: MarkupVisitor + ?Sized>(visitor: &mut V, handle: tl::NodeHandle, parser: &tl::Parser<'_>) {
    let Some(tl::Node::Tag(tag)) = handle.get(parser) else {
        return;
    };
    let name = tag.name().as_utf8_str();

    visitor.visit_element(&name);
    for (key, value) in tag.attributes().iter() {
        visitor.visit_attribute(&name, &key, value.as_deref());
    }
    for child in tag.children().top().iter() {
        walk_node(visitor, *child, parser);
    }
}

/// Whether a `src` value is exempt from the existence check.
fn is_dynamic_or_remote(value: &str) -> bool {
    value.contains('{') || URL_PATTERN.is_match(value)
}

/// Per-file checks of one markup file.
struct MarkupChecker<'a> {
    root: &'a Path,
    file: &'a Path,
    rel: &'a Path,
    scope: PackageScope,
    local: ComponentLedger,
    global: &'a mut ComponentLedger,
    diagnostics: &'a mut Diagnostics,
    follow: Vec<PathBuf>,
}

impl MarkupChecker<'_> {
    fn schedule(&mut self, value: &str, default_ext: &str) {
        if is_dynamic_or_remote(value) {
            return;
        }
        let mut target = reference_path(self.root, self.file, value);
        if target.extension().is_none() {
            target.set_extension(default_ext);
        }
        self.follow.push(target);
    }

    /// Report what the file declared but never used, and return the
    /// files to compile next.
    fn finish(self) -> Vec<PathBuf> {
        for (tag, path) in self.local.unused() {
            self.diagnostics.error(
                DiagnosticKind::UnusedComponent,
                self.rel,
                format!("`{tag}` ({path}) is declared but unused in"),
            );
        }
        self.follow
    }
}

impl MarkupVisitor for MarkupChecker<'_> {
    fn visit_element(&mut self, tag: &str) {
        if self.local.declares(tag) {
            self.local.take(tag);
            return;
        }
        if !self.global.declares(tag) {
            return;
        }
        self.global.take(tag);
        if self.scope.is_subpackage() {
            self.diagnostics.error(
                DiagnosticKind::MisplacedComponent,
                self.rel,
                format!("`{tag}` is declared in app.json but used in a subpackage, declare it in"),
            );
        }
    }

    fn visit_attribute(&mut self, tag: &str, key: &str, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        let value = value.trim();
        if value.is_empty() {
            self.diagnostics.warning(
                DiagnosticKind::EmptyAttribute,
                self.rel,
                format!("`{key}` of <{tag}> has no value in"),
            );
            return;
        }
        if key != "src" {
            return;
        }

        if !is_dynamic_or_remote(value) && !static_exists(self.root, self.file, value) {
            self.diagnostics.error(
                DiagnosticKind::MissingStatic,
                self.rel,
                format!("`{value}` does not exist, referenced in"),
            );
        }
        match tag {
            "wxs" => self.schedule(value, MODULE_EXT),
            "import" | "include" => self.schedule(value, MARKUP_EXT),
            _ => {}
        }
    }
}

pub fn compile_markup(session: &mut BuildSession<'_>, file: &Path, scope: PackageScope) {
    let rel = session.rel(file);
    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(err) => {
            session.diagnostics.error(
                DiagnosticKind::MissingSource,
                &rel,
                format!("cannot read markup ({err}):"),
            );
            return;
        }
    };

    let follow = match tl::parse(&content, tl::ParserOptions::default()) {
        Ok(dom) => {
            let config = session.config;
            let mut checker = MarkupChecker {
                root: &config.dir,
                file,
                rel: &rel,
                scope,
                local: read_sibling_manifest(file)
                    .map(|manifest| manifest.component_ledger())
                    .unwrap_or_default(),
                global: &mut session.global_components,
                diagnostics: &mut session.diagnostics,
                follow: Vec::new(),
            };
            walk_markup(&mut checker, &dom);
            checker.finish()
        }
        Err(err) => {
            session.diagnostics.warning(
                DiagnosticKind::ParseFailure,
                &rel,
                format!("markup not checked ({err}):"),
            );
            Vec::new()
        }
    };

    for target in follow {
        session.compile(&target, scope);
    }
    session.emit(file, None);
}
