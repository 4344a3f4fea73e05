//! Script compiler.
//!
//! Renames reads of a configured global identifier and follows `import`,
//! `export ... from` and `require('...')` references. Rewrites are spliced
//! into the original text by span, so formatting and comments survive.

use std::fs;
use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, AssignmentTargetPropertyIdentifier, CallExpression, ExportAllDeclaration,
    ExportNamedDeclaration, Expression, IdentifierReference, ImportDeclaration, ObjectProperty,
    Program, SimpleAssignmentTarget,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::span::{SourceType, Span};

use super::resolve::resolve_module;
use crate::config::JsConfig;
use crate::debug;
use crate::diagnostic::DiagnosticKind;
use crate::session::BuildSession;
use crate::source::PackageScope;

/// Collects identifier edits and module specifiers from a program.
pub struct ScriptRewriter<'c> {
    rename: Option<(&'c str, &'c str)>,
    edits: Vec<(Span, String)>,
    modules: Vec<String>,
}

impl<'c> ScriptRewriter<'c> {
    pub fn new(js: &'c JsConfig) -> Self {
        Self {
            rename: js.rename_rule(),
            edits: Vec::new(),
            modules: Vec::new(),
        }
    }

    fn renames(&self, name: &str) -> Option<&'c str> {
        self.rename
            .and_then(|(from, to)| (from == name).then_some(to))
    }

    /// Apply the collected edits to `source`.
    fn splice(&mut self, source: &str) -> String {
        self.edits.sort_by_key(|(span, _)| span.start);

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for (span, text) in &self.edits {
            let (start, end) = (span.start as usize, span.end as usize);
            if start < cursor || end > source.len() {
                continue;
            }
            out.push_str(&source[cursor..start]);
            out.push_str(text);
            cursor = end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

impl<'a> Visit<'a> for ScriptRewriter<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if let Some(to) = self.renames(it.name.as_str()) {
            self.edits.push((it.span, to.to_owned()));
        }
    }

    // Writes to the global stay as written: only reads are renamed.
    fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
        if let SimpleAssignmentTarget::AssignmentTargetIdentifier(_) = it {
            return;
        }
        walk::walk_simple_assignment_target(self, it);
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        if let Some(init) = &it.init {
            self.visit_expression(init);
        }
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        // `{ key }` keeps its key when the value is renamed.
        if it.shorthand
            && let Expression::Identifier(ident) = &it.value
            && let Some(to) = self.renames(ident.name.as_str())
        {
            self.edits
                .push((ident.span, format!("{}: {to}", ident.name)));
            return;
        }
        walk::walk_object_property(self, it);
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.modules.push(it.source.value.to_string());
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.modules.push(source.value.to_string());
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.modules.push(it.source.value.to_string());
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee
            && callee.name.as_str() == "require"
            && let Some(Argument::StringLiteral(spec)) = it.arguments.first()
        {
            self.modules.push(spec.value.to_string());
        }
        walk::walk_call_expression(self, it);
    }
}

/// A rewritten script and the module specifiers it references.
#[derive(Debug)]
pub struct ScriptOutput {
    pub code: String,
    pub modules: Vec<String>,
}

/// Rewrite a script. Module syntax is tried first, then a classic script.
pub fn rewrite_script(source: &str, js: &JsConfig) -> Result<ScriptOutput, String> {
    let allocator = Allocator::default();
    let mut ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let script = Parser::new(&allocator, source, SourceType::mjs().with_module(false)).parse();
        if script.panicked || !script.errors.is_empty() {
            return Err(ret
                .errors
                .first()
                .map_or_else(|| "parser gave up".to_owned(), ToString::to_string));
        }
        ret = script;
    }

    Ok(collect(&ret.program, source, js))
}

fn collect(program: &Program<'_>, source: &str, js: &JsConfig) -> ScriptOutput {
    let mut rewriter = ScriptRewriter::new(js);
    rewriter.visit_program(program);
    let code = rewriter.splice(source);
    ScriptOutput {
        code,
        modules: rewriter.modules,
    }
}

pub fn compile_script(session: &mut BuildSession<'_>, file: &Path, scope: PackageScope) {
    let rel = session.rel(file);
    let size = match fs::metadata(file) {
        Ok(meta) => meta.len(),
        Err(err) => {
            session.diagnostics.error(
                DiagnosticKind::MissingSource,
                &rel,
                format!("cannot read script ({err}):"),
            );
            return;
        }
    };

    if size > session.config.limits.script_transform {
        debug!("script"; "{} copied as is ({} KiB)", rel.display(), size / 1024);
        session.emit(file, None);
        return;
    }

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(err) => {
            session.diagnostics.error(
                DiagnosticKind::MissingSource,
                &rel,
                format!("cannot read script ({err}):"),
            );
            return;
        }
    };

    let output = match rewrite_script(&content, &session.config.js) {
        Ok(output) => output,
        Err(err) => {
            session.diagnostics.warning(
                DiagnosticKind::ParseFailure,
                &rel,
                format!("script not rewritten ({err}):"),
            );
            session.emit(file, None);
            return;
        }
    };

    let root = session.root().to_path_buf();
    for spec in &output.modules {
        match resolve_module(&root, file, spec) {
            Some(module) => session.compile(&module, scope),
            None => session.diagnostics.error(
                DiagnosticKind::UnresolvedModule,
                &rel,
                format!("optimize this module path to save compile time: `{spec}`, required in"),
            ),
        }
    }

    session.emit(file, Some(&output.code));
}
