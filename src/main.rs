//! wxpack - A reachability-driven compiler for mini-program packages.

#![allow(dead_code)]

mod asset;
mod build;
mod cli;
mod compiler;
mod config;
mod diagnostic;
mod ledger;
mod logger;
mod output;
mod session;
mod source;
mod utils;

use clap::{ColorChoice, Parser};
use cli::Cli;
use config::BuildConfig;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = match BuildConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            log!("error"; "{:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = build::build(&config) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}
