//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Compile the reachable part of a mini-program package into an output tree
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Mini-program source directory (overrides `dir` in the config file)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = "config.json", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory, emptied before the build (default: dist)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Only print errors, warnings and the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
