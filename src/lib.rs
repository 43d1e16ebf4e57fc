// csspress - build-time CSS module assembler
//
// This is the library crate containing the configuration model and the
// module build pipeline. The binary crate (main.rs) provides the CLI entry
// point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod paths;
pub mod services;
pub mod text;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ModuleError};
pub use models::{Config, Module, Replace, OUTPUT_WRAPPER_MARKER};
pub use services::{CssCompressor, LightningMinifier, Minifier};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
