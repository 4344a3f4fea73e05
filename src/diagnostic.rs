//! Build diagnostics.
//!
//! Nothing reported here stops the build: every problem is attributed to
//! the file being processed and the traversal moves on. Diagnostics are
//! printed as they happen and kept for the final summary.

use std::fmt;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use rustc_hash::FxHashMap;

use crate::log;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Correctness problem (printed red).
    Error,
    /// Advisory issue (printed yellow).
    Warning,
    /// File passed its checks and was written (printed blue).
    Success,
}

impl Severity {
    /// Logger module name for this severity.
    pub const fn module(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "ok",
        }
    }
}

/// Every condition the compiler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Manifest file does not exist.
    MissingManifest,
    /// Manifest file is not valid JSON.
    InvalidManifest,
    /// Root manifest lacks `lazyCodeLoading`.
    LazyCodeLoading,
    /// Page or component path does not resolve to a file.
    UnresolvedPath,
    /// Script module reference does not resolve to a relative file.
    UnresolvedModule,
    /// Style import without the style extension.
    MissingExtension,
    /// Component declared but never used.
    UnusedComponent,
    /// Root-declared component used from a subpackage.
    MisplacedComponent,
    /// Markup `src` points at nothing.
    MissingStatic,
    /// Markup attribute with an empty value.
    EmptyAttribute,
    /// Referenced source file does not exist.
    MissingSource,
    /// Reference resolves above the source root.
    OutsideRoot,
    /// Style, markup or script could not be parsed.
    ParseFailure,
    /// Zero-byte source file.
    EmptyFile,
    /// Source file above the size ceiling.
    OversizedFile,
    /// Referenced asset above the asset size ceiling.
    OversizedAsset,
    /// Static asset never referenced by compiled output.
    UnusedAsset,
    /// Writing or copying to the destination failed.
    WriteFailure,
    /// File passed its checks and was written.
    Passed,
}

/// A single reported condition.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Source-root-relative file the diagnostic is about.
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.as_os_str().is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.message, self.file.display().dimmed())
        }
    }
}

/// Collector owned by the build session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    counts: FxHashMap<DiagnosticKind, usize>,
    quiet: bool,
}

impl Diagnostics {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Self::default()
        }
    }

    /// Record and print a diagnostic.
    pub fn report(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        file: &Path,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity,
            kind,
            file: file.to_path_buf(),
            message: message.into(),
        };

        if !(self.quiet && severity == Severity::Success) {
            log!(severity.module(); "{}", diagnostic);
        }

        *self.counts.entry(kind).or_default() += 1;
        // Success lines are only counted; keeping them would grow with the package.
        if severity != Severity::Success {
            self.entries.push(diagnostic);
        }
    }

    pub fn error(&mut self, kind: DiagnosticKind, file: &Path, message: impl Into<String>) {
        self.report(Severity::Error, kind, file, message);
    }

    pub fn warning(&mut self, kind: DiagnosticKind, file: &Path, message: impl Into<String>) {
        self.report(Severity::Warning, kind, file, message);
    }

    pub fn success(&mut self, file: &Path) {
        self.report(Severity::Success, DiagnosticKind::Passed, file, "passed checks:");
    }

    /// Number of diagnostics of `kind` reported so far.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Number of errors and warnings reported so far.
    pub fn totals(&self) -> (usize, usize) {
        self.entries
            .iter()
            .fold((0, 0), |(errors, warnings), d| match d.severity {
                Severity::Error => (errors + 1, warnings),
                Severity::Warning => (errors, warnings + 1),
                Severity::Success => (errors, warnings),
            })
    }

    /// Errors and warnings in report order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Errors and warnings of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }
}
