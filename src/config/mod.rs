//! Build configuration management for `config.json`.
//!
//! # Fields
//!
//! | Field         | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `dir`         | Source root (CLI `--dir` wins)                   |
//! | `dist`/`out`  | Destination root, emptied before the build       |
//! | `css`         | Selector prefix and variable rewrites            |
//! | `js`          | Identifier rewrite                               |
//! | `limits`      | Size thresholds                                  |

mod error;
mod section;

pub use error::ConfigError;
pub use section::{CssConfig, JsConfig, LimitsConfig};

use crate::{cli::Cli, log, utils::path::normalize_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing config.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Where the config was read from; not part of the JSON.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Source root. Absolute after [`BuildConfig::load`].
    pub dir: PathBuf,

    /// Destination root. Absolute after [`BuildConfig::load`].
    #[serde(alias = "out")]
    pub dist: PathBuf,

    /// Style rewrite rules
    pub css: CssConfig,

    /// Script rewrite rule
    pub js: JsConfig,

    /// Size thresholds
    pub limits: LimitsConfig,

    /// Suppress per-file success lines (CLI only)
    #[serde(skip)]
    pub quiet: bool,
}

impl BuildConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The config file is resolved against the working directory; a missing
    /// file is fatal.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = cwd.join(&cli.config);
        if !config_path.is_file() {
            return Err(ConfigError::NotFound(config_path).into());
        }

        let mut config = Self::from_path(&config_path)?;
        config.config_path = config_path;
        config.apply_cli(cli, &cwd);
        config.finalize()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        Self::parse_with_ignored(content).map(|(config, _)| config)
    }

    /// Build a configuration for an explicit source/destination pair.
    ///
    /// Used by tests and by callers that assemble configuration in code.
    pub fn for_dirs(dir: impl Into<PathBuf>, dist: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self {
            dir: dir.into(),
            dist: dist.into(),
            ..Self::default()
        };
        config.finalize()?;
        Ok(config)
    }

    /// Read and parse `path`, warning about keys no section knows.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .map_err(|err| ConfigError::Json(path.to_path_buf(), err))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse JSON content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), serde_json::Error> {
        let mut ignored = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(content);
        let config: Self = serde_ignored::deserialize(&mut deserializer, |path| {
            ignored.push(path.to_string());
        })?;
        deserializer.end()?;
        Ok((config, ignored))
    }

    /// One warning line listing every ignored key.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} ignored: {}", display_path, fields.join(", "));
    }

    /// CLI options take precedence over file values.
    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.verbose);
        self.quiet = cli.quiet;

        if let Some(dir) = &cli.dir {
            self.dir = dir.clone();
        }
        if let Some(out) = &cli.out {
            self.dist = out.clone();
        }
        if self.dist.as_os_str().is_empty() {
            self.dist = cwd.join("dist");
        }
    }

    /// Normalize paths and validate the result.
    fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "no source directory given (use --dir or `dir`)".into(),
            ));
        }
        if !self.dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "`{}` is not a directory",
                self.dir.display()
            )));
        }

        self.dir = normalize_path(&self.dir);
        self.dist = normalize_path(&self.dist);
        self.validate()
    }

    /// Validate normalized configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.starts_with(&self.dist) {
            return Err(ConfigError::Validation(format!(
                "output `{}` would erase the source directory",
                self.dist.display()
            )));
        }

        let limits = &self.limits;
        if limits.script_transform == 0 || limits.file_warn == 0 || limits.asset == 0 {
            return Err(ConfigError::Validation(
                "`limits` values must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Get path relative to the source root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_json_defaults() {
        let config = BuildConfig::from_json("{}").unwrap();
        assert!(config.css.prefix_rule().is_none());
        assert_eq!(config.js.target, "wx");
        assert_eq!(config.limits.file_warn, 1024 * 1024);
    }

    #[test]
    fn test_out_alias() {
        let config = BuildConfig::from_json(r#"{"out": "build"}"#).unwrap();
        assert_eq!(config.dist, PathBuf::from("build"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            BuildConfig::parse_with_ignored(r#"{"dir": "a", "watch": true, "css": {"foo": 1}}"#)
                .unwrap();
        assert_eq!(ignored, vec!["watch".to_string(), "css.foo".to_string()]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(BuildConfig::from_json("{ dir: ").is_err());
    }

    #[test]
    fn test_for_dirs_rejects_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = BuildConfig::for_dirs(tmp.path().join("missing"), tmp.path().join("dist"))
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_for_dirs_rejects_output_over_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("app");
        fs::create_dir_all(&src).unwrap();

        assert!(BuildConfig::for_dirs(&src, &src).is_err());
        assert!(BuildConfig::for_dirs(&src, tmp.path()).is_err());
        assert!(BuildConfig::for_dirs(&src, tmp.path().join("dist")).is_ok());
    }

    #[test]
    fn test_root_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("app");
        fs::create_dir_all(&src).unwrap();
        let config = BuildConfig::for_dirs(&src, tmp.path().join("dist")).unwrap();

        let file = config.dir.join("pages/index/index.js");
        assert_eq!(
            config.root_relative(&file),
            PathBuf::from("pages/index/index.js")
        );
        // Paths outside the root are shown as given.
        assert_eq!(config.root_relative(tmp.path()), tmp.path());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut config = BuildConfig::for_dirs(tmp.path(), tmp.path().join("dist")).unwrap();
        config.limits.asset = 0;
        assert!(config.validate().is_err());
    }
}
