//! The per-module build pipeline.
//!
//! Every module runs the same strictly sequential stages:
//! preprocess -> inline imports -> minify -> replace -> wrap -> write.
//! Modules build independently, in declaration order; the first failure
//! aborts the run, leaving output already written for earlier modules on
//! disk as-is.

use crate::models::{Config, Module, OUTPUT_WRAPPER_MARKER};
use crate::services::imports::ImportInliner;
use crate::services::minify::Minifier;
use crate::services::preprocess::{self, PREPROCESS_TIMEOUT};
use crate::text;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use encoding_rs::Encoding;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use thiserror::Error;

/// Failures in the replace, wrap, and write stages. All fatal.
#[derive(Error, Debug)]
pub enum CompressError {
    #[error("invalid replace pattern '{pattern}': {source}")]
    InvalidReplace {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("output wrapper does not contain the {} marker", OUTPUT_WRAPPER_MARKER)]
    WrapperMarkerMissing,

    #[error("unable to create output directory {directory}: {source}")]
    OutputDirectory {
        directory: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pipeline orchestrator: drives every configured module through the build
/// stages using the given minifier backend.
pub struct CssCompressor<M> {
    config: Config,
    minifier: M,
}

impl<M: Minifier> CssCompressor<M> {
    pub fn new(config: Config, minifier: M) -> Self {
        Self { config, minifier }
    }

    /// Build every module in declaration order.
    pub async fn compress(&self) -> Result<()> {
        let replaces = compile_replaces(&self.config)?;
        let inliner = ImportInliner::new(self.config.charset);

        for module in &self.config.modules {
            self.build_module(module, &inliner, &replaces)
                .await
                .with_context(|| format!("failed to build module '{}'", module.name))?;
        }

        Ok(())
    }

    async fn build_module(
        &self,
        module: &Module,
        inliner: &ImportInliner,
        replaces: &[(Regex, String)],
    ) -> Result<()> {
        // One inlined-set per module: a dependency shared between two
        // top-level inputs is emitted only once.
        let mut inlined = HashSet::new();
        let mut css = String::new();

        for input in &module.inputs {
            let chunk = match &self.config.preprocess_command {
                Some(command) => {
                    let preprocessed =
                        preprocess::run(command, input, self.config.charset, PREPROCESS_TIMEOUT)
                            .await?;
                    inliner.resolve_content(input, &preprocessed, &mut inlined)?
                }
                None => inliner.resolve_file(input, &mut inlined)?,
            };
            css.push_str(&chunk);
        }

        let minified = self.minifier.minify(&css, None)?;

        let mut result = minified;
        for (pattern, replacement) in replaces {
            // Later rules see the output of earlier rules.
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        let result = match &self.config.output_wrapper {
            Some(wrapper) => {
                // A wrapper without the marker would silently discard the
                // entire compressed output.
                if !wrapper.contains(OUTPUT_WRAPPER_MARKER) {
                    return Err(CompressError::WrapperMarkerMissing.into());
                }
                wrapper.replacen(OUTPUT_WRAPPER_MARKER, &result, 1)
            }
            None => result,
        };

        write_output(&module.output_path, &result, self.config.charset)?;

        tracing::info!(
            "built module '{}' -> {} ({} bytes)",
            module.name,
            module.output_path,
            result.len()
        );

        Ok(())
    }
}

fn compile_replaces(config: &Config) -> Result<Vec<(Regex, String)>, CompressError> {
    config
        .replaces
        .iter()
        .map(|replace| {
            let pattern =
                Regex::new(&replace.search).map_err(|source| CompressError::InvalidReplace {
                    pattern: replace.search.clone(),
                    source,
                })?;
            Ok((pattern, replace.replacement.clone()))
        })
        .collect()
}

fn write_output(
    path: &Utf8Path,
    content: &str,
    charset: &'static Encoding,
) -> Result<(), CompressError> {
    if let Some(directory) = path.parent() {
        fs::create_dir_all(directory).map_err(|source| CompressError::OutputDirectory {
            directory: directory.to_owned(),
            source,
        })?;
    }

    text::write(path, content, charset).map_err(|source| CompressError::Write {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Replace;
    use crate::services::minify::MinifyError;
    use encoding_rs::UTF_8;
    use tempfile::TempDir;

    /// Passes CSS through untouched so stage interactions stay observable.
    struct PassthroughMinifier;

    impl Minifier for PassthroughMinifier {
        fn minify(&self, css: &str, _line_break_column: Option<u32>) -> Result<String, MinifyError> {
            Ok(css.to_string())
        }
    }

    struct Workspace {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
            Workspace { _dir: dir, root }
        }

        fn file(&self, name: &str, content: &str) -> Utf8PathBuf {
            let path = self.root.join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn config(&self, inputs: Vec<Utf8PathBuf>) -> Config {
            Config {
                root: self.root.clone(),
                charset: UTF_8,
                output_wrapper: None,
                modules: vec![Module {
                    name: "app".to_string(),
                    inputs,
                    output_path: self.root.join("out/app.min.css"),
                }],
                replaces: Vec::new(),
                preprocess_command: None,
                quiet: true,
            }
        }

        fn output(&self) -> String {
            std::fs::read_to_string(self.root.join("out/app.min.css")).unwrap()
        }
    }

    #[tokio::test]
    async fn inputs_concatenate_in_declaration_order() {
        let ws = Workspace::new();
        let x = ws.file("x.css", "x{}");
        let y = ws.file("y.css", "y{}");
        let config = ws.config(vec![x, y]);

        CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap();

        assert_eq!(ws.output(), "x{}y{}");
    }

    #[tokio::test]
    async fn replaces_apply_sequentially() {
        let ws = Workspace::new();
        let input = ws.file("a.css", "a.b");
        let mut config = ws.config(vec![input]);
        config.replaces = vec![
            Replace { search: ".".into(), replacement: "X".into() },
            Replace { search: "X".into(), replacement: "Y".into() },
        ];

        CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap();

        assert_eq!(ws.output(), "YYY");
    }

    #[tokio::test]
    async fn wrapper_embeds_the_minified_output() {
        let ws = Workspace::new();
        let input = ws.file("a.css", "a{color:red}");
        let mut config = ws.config(vec![input]);
        config.output_wrapper = Some("/*!%output%*/".to_string());

        CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap();

        assert_eq!(ws.output(), "/*!a{color:red}*/");
    }

    #[tokio::test]
    async fn wrapper_without_marker_fails_the_build() {
        let ws = Workspace::new();
        let input = ws.file("a.css", "a{}");
        let mut config = ws.config(vec![input]);
        config.output_wrapper = Some("/* no marker */".to_string());

        let err = CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CompressError>(),
            Some(CompressError::WrapperMarkerMissing)
        ));
        assert!(!ws.root.join("out/app.min.css").exists());
    }

    #[tokio::test]
    async fn invalid_replace_pattern_fails_before_any_module_builds() {
        let ws = Workspace::new();
        let input = ws.file("a.css", "a{}");
        let mut config = ws.config(vec![input]);
        config.replaces = vec![Replace { search: "(".into(), replacement: "x".into() }];

        let err = CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CompressError>(),
            Some(CompressError::InvalidReplace { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn preprocess_output_feeds_import_inlining() {
        let ws = Workspace::new();
        ws.file("dep.css", "D{}");
        let input = ws.file("a.css", "raw");
        let mut config = ws.config(vec![input]);
        // sed turns `raw` into an import statement, proving the pipeline
        // inlines imports from preprocessed text rather than disk content.
        config.preprocess_command =
            Some("sed 's/raw/@import \"dep.css\";P{}/' %s".to_string());

        CssCompressor::new(config, PassthroughMinifier)
            .compress()
            .await
            .unwrap();

        assert_eq!(ws.output(), "D{}P{}");
    }
}
