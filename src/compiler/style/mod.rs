//! Style compiler.
//!
//! Rewrites component tag prefixes in selectors, substitutes variables in
//! declaration values and follows `@import` rules. Output is assembled
//! from the parse tree, so text the rewriter does not touch is preserved
//! byte for byte.

mod parse;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use parse::{ImportRule, StyleParseError, StyleVisitor, expr_terms, parse_stylesheet, walk};

use super::resolve::reference_path;
use crate::config::CssConfig;
use crate::debug;
use crate::diagnostic::DiagnosticKind;
use crate::session::BuildSession;
use crate::source::{PackageScope, STYLE_EXT};

/// Accumulates the rewritten sheet and the imports it meets.
pub struct StyleRewriter<'c> {
    code: String,
    prefix: Option<(&'c str, &'c str)>,
    variables: &'c BTreeMap<String, String>,
    imports: Vec<String>,
}

impl<'c> StyleRewriter<'c> {
    pub fn new(css: &'c CssConfig) -> Self {
        Self {
            code: String::new(),
            prefix: css.prefix_rule(),
            variables: &css.variable,
            imports: Vec::new(),
        }
    }

    /// Rewritten text and import targets, in source order.
    pub fn finish(self) -> (String, Vec<String>) {
        (self.code, self.imports)
    }
}

impl<'s> StyleVisitor<'s> for StyleRewriter<'_> {
    fn visit_selector(&mut self, text: &'s str) {
        match self.prefix {
            Some((from, to)) if text.starts_with(from) => {
                self.code.push_str(to);
                self.code.push_str(&text[from.len()..]);
            }
            _ => self.code.push_str(text),
        }
    }

    fn visit_expr(&mut self, text: &'s str) {
        if let Some(value) = self.variables.get(text) {
            self.code.push_str(value);
            return;
        }
        for (is_term, piece) in expr_terms(text) {
            match self.variables.get(piece) {
                Some(value) if is_term => self.code.push_str(value),
                _ => self.code.push_str(piece),
            }
        }
    }

    fn visit_terminal(&mut self, text: &'s str) {
        self.code.push_str(text);
    }

    fn visit_import(&mut self, import: &ImportRule<'s>) {
        self.imports.push(import.target.clone());
        self.code.push_str(import.text);
    }
}

/// Rewrite a style sheet. Returns the new text and the imports it names.
pub fn rewrite_style(source: &str, css: &CssConfig) -> Result<(String, Vec<String>), StyleParseError> {
    let sheet = parse_stylesheet(source)?;
    let mut rewriter = StyleRewriter::new(css);
    walk(&mut rewriter, &sheet.items);
    Ok(rewriter.finish())
}

/// Minify a style sheet, or `None` if it does not parse as CSS.
pub fn minify_style(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

pub fn compile_style(session: &mut BuildSession<'_>, file: &Path, scope: PackageScope) {
    // Pages and components may omit their style sheet.
    if !file.exists() {
        return;
    }
    let rel = session.rel(file);
    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(err) => {
            session.diagnostics.error(
                DiagnosticKind::MissingSource,
                &rel,
                format!("cannot read style ({err}):"),
            );
            return;
        }
    };

    let (code, imports) = match rewrite_style(&content, &session.config.css) {
        Ok((code, imports)) => (Some(code), imports),
        Err(err) => {
            session.diagnostics.warning(
                DiagnosticKind::ParseFailure,
                &rel,
                format!("style not rewritten, {} on line {}:", err.message, err.line),
            );
            (None, Vec::new())
        }
    };

    let ext_suffix = format!(".{STYLE_EXT}");
    for target in imports {
        if !target.ends_with(&ext_suffix) {
            session.diagnostics.error(
                DiagnosticKind::MissingExtension,
                &rel,
                format!("add the `{ext_suffix}` extension to `{target}`, imported in"),
            );
            continue;
        }
        let imported = reference_path(session.root(), file, &target);
        session.compile(&imported, scope);
    }

    let code = match code {
        Some(code) if session.config.css.minify => match minify_style(&code) {
            Some(minified) => Some(minified),
            None => {
                debug!("style"; "minify skipped for {}", rel.display());
                Some(code)
            }
        },
        code => code,
    };
    session.emit(file, code.as_deref());
}
