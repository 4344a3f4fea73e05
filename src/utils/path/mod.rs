//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `clean_path`, `join_clean`)

pub mod fs;

pub use fs::{clean_path, ensure_ext, join_clean, normalize_path, with_ext};
