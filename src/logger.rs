//! Terminal output for the build.
//!
//! Every line is `[module] message`. Diagnostics use their severity as the
//! module (`error`, `warning`, `ok`); build progress uses `build`.
//!
//! ```ignore
//! log!("build"; "{} written", counted(n, "file"));
//! debug!("script"; "{} copied as is", rel.display());
//! ```

use owo_colors::OwoColorize;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Toggled once from the CLI before the build starts.
pub fn set_verbose(on: bool) {
    VERBOSE.store(on, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print a `[module] message` line.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like [`log!`], but only with `--verbose`. Arguments are not formatted
/// otherwise.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let line = format!("{} {message}", Prefix::of(module).paint(module));
    let mut out = stdout().lock();
    writeln!(out, "{line}").ok();
    out.flush().ok();
}

/// Prefix color class of a module name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Error,
    Passed,
    Build,
    Other,
}

impl Prefix {
    fn of(module: &str) -> Self {
        if module.eq_ignore_ascii_case("error") {
            Self::Error
        } else if module.eq_ignore_ascii_case("ok") {
            Self::Passed
        } else if module.eq_ignore_ascii_case("build") {
            Self::Build
        } else {
            Self::Other
        }
    }

    fn paint(self, module: &str) -> String {
        let tag = format!("[{module}]");
        match self {
            Self::Error => tag.bright_red().bold().to_string(),
            Self::Passed => tag.bright_blue().bold().to_string(),
            Self::Build => tag.bright_green().bold().to_string(),
            Self::Other => tag.bright_yellow().bold().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_class() {
        assert_eq!(Prefix::of("error"), Prefix::Error);
        assert_eq!(Prefix::of("OK"), Prefix::Passed);
        assert_eq!(Prefix::of("Build"), Prefix::Build);
        assert_eq!(Prefix::of("warning"), Prefix::Other);
        assert_eq!(Prefix::of("script"), Prefix::Other);
    }

    #[test]
    fn test_painted_prefix_keeps_module_name() {
        assert!(Prefix::Error.paint("error").contains("[error]"));
        assert!(Prefix::Build.paint("Build").contains("[Build]"));
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
