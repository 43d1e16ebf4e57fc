//! csspress - build-time CSS module assembler
//!
//! Main entry point for the command-line tool.
//!
//! # Execution Flow
//!
//! 1. Parse the command line (config path, `--replace` rules, `--quiet`)
//! 2. Initialize console logging (info level, `warn` when quiet)
//! 3. Load and validate the JSON build configuration
//! 4. Build every module: preprocess, inline imports, minify, replace,
//!    wrap, write
//!
//! Any fatal error prints its message chain to stderr and the process exits
//! with a non-zero status. Output files already written for earlier modules
//! are left on disk.

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use csspress::cli::Cli;
use csspress::services::LightningMinifier;
use csspress::{config, logging, paths, CssCompressor, APP_NAME, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::setup(cli.quiet);
    tracing::info!("{} v{}", APP_NAME, VERSION);

    // The config path may be relative to the invocation directory; module
    // paths inside it resolve against the config file's own directory.
    let cwd = Utf8PathBuf::try_from(std::env::current_dir()?)?;
    let config_path = paths::resolve(&cwd, cli.config.as_str());

    let config = config::load(&config_path, cli.replaces, cli.quiet)?;
    tracing::info!(
        "loaded {} with {} module(s)",
        config_path,
        config.modules.len()
    );

    CssCompressor::new(config, LightningMinifier).compress().await
}
