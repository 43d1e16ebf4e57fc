//! Configuration loading.
//!
//! The config document is consumed as a generic JSON value tree: a closed
//! schema of recognized options ([`options`]) type-checks each present key
//! and stores its raw value on a [`builder::RawConfig`], which performs all
//! validation and path resolution in one deferred `build` step. Keys outside
//! the schema are warned about but never fail the build.

mod builder;
mod options;

use crate::models::{Config, Replace};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::fs;
use std::io;
use thiserror::Error;

pub use builder::ModuleError;

/// Errors raised while loading or validating the configuration document.
/// All of them are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {0} does not contain a JSON object at its root")]
    NotAnObject(Utf8PathBuf),

    #[error("option '{option}' must be {expected}, found: {found}")]
    WrongShape {
        option: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("option '{0}' is required")]
    MissingOption(&'static str),

    #[error("option 'modules' must declare at least one module")]
    NoModules,

    #[error("unknown charset '{0}'")]
    UnknownCharset(String),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// Load and validate the configuration document at `path`.
///
/// `replaces` and `quiet` come from the command line and are folded into
/// the resulting [`Config`]. Relative paths in the document resolve against
/// the document's own directory (via the `root` option).
pub fn load(path: &Utf8Path, replaces: Vec<Replace>, quiet: bool) -> Result<Config, ConfigError> {
    let raw_text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;

    let document: Value = serde_json::from_str(&raw_text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;

    let Value::Object(entries) = document else {
        return Err(ConfigError::NotAnObject(path.to_owned()));
    };

    let mut raw = builder::RawConfig::default();
    for option in options::OPTIONS {
        if let Some(value) = entries.get(option.name) {
            (option.apply)(&mut raw, value)?;
        }
    }

    // Typos in config files should be visible but must not break builds.
    for key in entries.keys() {
        if !options::OPTIONS.iter().any(|option| option.name == key) {
            tracing::warn!("unused option \"{}\" in {}", key, path);
        }
    }

    for replace in &replaces {
        tracing::info!("replace: {} => {}", replace.search, replace.replacement);
    }

    let config_dir = path.parent().unwrap_or(Utf8Path::new("."));
    raw.build(config_dir, replaces, quiet)
}
