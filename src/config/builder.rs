//! Deferred-validation configuration builder.
//!
//! Raw option values accumulate on [`RawConfig`] in whatever order the
//! schema applies them; [`RawConfig::build`] then derives defaults, resolves
//! every path against the root directory, and validates module declarations
//! in a single pass, producing the immutable [`Config`].

use super::options::{DEFAULT_CHARSET, DEFAULT_ROOT};
use super::ConfigError;
use crate::models::{Config, Module, Replace, TEMPLATE_MARKER};
use crate::{paths, text};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use thiserror::Error;

/// A module declaration that cannot be turned into a [`Module`]. Fatal.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("module '{module}' must specify inputs using the \"inputs\" key")]
    MissingInputs { module: String },

    #[error("module '{module}' has no inputs")]
    EmptyInputs { module: String },

    #[error(
        "inputs of module '{module}' must be a single string or an array of strings, found: {found}"
    )]
    InvalidInputs { module: String, found: String },

    #[error("inputs of module '{module}' contained an element that is not a string: {found}")]
    NonStringInput { module: String, found: String },

    #[error("output of module '{module}' must be a string, found: {found}")]
    NonStringOutput { module: String, found: String },

    #[error(
        "module '{module}' must be declared as a single string, an array of strings, or an object, found: {found}"
    )]
    InvalidShape { module: String, found: String },

    #[error(
        "module '{module}' has no output path; specify the global 'output-path' option or the module's own 'output' key"
    )]
    MissingOutput { module: String },
}

/// Mutable accumulator for raw option values, prior to validation.
#[derive(Debug, Default)]
pub(crate) struct RawConfig {
    pub root: Option<String>,
    pub output_path: Option<String>,
    pub output_wrapper: Option<String>,
    pub modules: Option<Map<String, Value>>,
    pub charset: Option<String>,
    pub preprocess: Option<String>,
}

impl RawConfig {
    /// Validate the accumulated options and produce the immutable config.
    ///
    /// `config_dir` is the directory of the config document itself; the
    /// `root` option (default `"."`) resolves against it, and everything
    /// else resolves against the resulting root.
    pub fn build(
        self,
        config_dir: &Utf8Path,
        replaces: Vec<Replace>,
        quiet: bool,
    ) -> Result<Config, ConfigError> {
        let root = paths::resolve(config_dir, self.root.as_deref().unwrap_or(DEFAULT_ROOT));

        let charset_label = self.charset.as_deref().unwrap_or(DEFAULT_CHARSET);
        let charset = text::lookup_charset(charset_label)
            .ok_or_else(|| ConfigError::UnknownCharset(charset_label.to_string()))?;

        let declarations = self.modules.ok_or(ConfigError::MissingOption("modules"))?;
        if declarations.is_empty() {
            return Err(ConfigError::NoModules);
        }

        let mut modules = Vec::with_capacity(declarations.len());
        for (name, info) in &declarations {
            modules.push(build_module(
                name,
                info,
                self.output_path.as_deref(),
                &root,
            )?);
        }

        Ok(Config {
            root,
            charset,
            output_wrapper: self.output_wrapper,
            modules,
            replaces,
            preprocess_command: self.preprocess,
            quiet,
        })
    }
}

fn build_module(
    name: &str,
    info: &Value,
    output_template: Option<&str>,
    root: &Utf8Path,
) -> Result<Module, ModuleError> {
    let (inputs_value, own_output) = match info {
        Value::String(_) | Value::Array(_) => (info, None),

        Value::Object(entries) => {
            let inputs = entries.get("inputs").ok_or_else(|| ModuleError::MissingInputs {
                module: name.to_string(),
            })?;

            let output = match entries.get("output") {
                None | Some(Value::Null) => None,
                Some(Value::String(path)) => Some(path.as_str()),
                Some(other) => {
                    return Err(ModuleError::NonStringOutput {
                        module: name.to_string(),
                        found: other.to_string(),
                    });
                }
            };

            (inputs, output)
        }

        other => {
            return Err(ModuleError::InvalidShape {
                module: name.to_string(),
                found: other.to_string(),
            });
        }
    };

    let inputs = extract_inputs(name, inputs_value, root)?;
    let output_path = module_output_path(name, own_output, output_template, root)?;

    Ok(Module {
        name: name.to_string(),
        inputs,
        output_path,
    })
}

fn extract_inputs(
    name: &str,
    value: &Value,
    root: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>, ModuleError> {
    let inputs = match value {
        Value::String(path) => vec![paths::resolve(root, path)],

        Value::Array(items) => {
            let mut inputs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(path) => inputs.push(paths::resolve(root, path)),
                    other => {
                        return Err(ModuleError::NonStringInput {
                            module: name.to_string(),
                            found: other.to_string(),
                        });
                    }
                }
            }
            inputs
        }

        other => {
            return Err(ModuleError::InvalidInputs {
                module: name.to_string(),
                found: other.to_string(),
            });
        }
    };

    if inputs.is_empty() {
        return Err(ModuleError::EmptyInputs {
            module: name.to_string(),
        });
    }

    Ok(inputs)
}

/// A module-level `output` overrides the global template entirely. The
/// chosen template gets the module name substituted exactly once, then
/// resolves against the root.
fn module_output_path(
    name: &str,
    own_output: Option<&str>,
    output_template: Option<&str>,
    root: &Utf8Path,
) -> Result<Utf8PathBuf, ModuleError> {
    let template = own_output
        .or(output_template)
        .ok_or_else(|| ModuleError::MissingOutput {
            module: name.to_string(),
        })?;

    Ok(paths::resolve(root, &template.replacen(TEMPLATE_MARKER, name, 1)))
}
