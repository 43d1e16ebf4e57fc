use crate::{paths, text};
use camino::{Utf8Path, Utf8PathBuf};
use encoding_rs::Encoding;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/*
  CSS imports are allowed in 2 syntaxes:
    1. @import url("style.css")
    2. @import "style.css"
  so the pattern expects a valid input CSS. The capture is the file path;
  the rest of the statement up to the next `;` or end of line is consumed
  so the whole statement is removed, not just its path.
*/
const IMPORT_PATTERN: &str =
    r#"(?m)@import\s+(?:url\(\s*)?["']?([\w\\/\-_.:?]+?\.css)[^;$]*?(;|$)"#;

/// File-read failure while following an import chain. Fatal.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replaces every `@import` statement with the recursively resolved content
/// of the imported file.
///
/// One `inlined` set is threaded through a whole module's build so that a
/// file imported from two siblings is emitted once, and so that any import
/// cycle terminates: a canonical path seen before resolves to empty text.
pub struct ImportInliner {
    import_pattern: Regex,
    charset: &'static Encoding,
}

impl ImportInliner {
    pub fn new(charset: &'static Encoding) -> Self {
        Self {
            import_pattern: Regex::new(IMPORT_PATTERN).expect("invalid import regex"),
            charset,
        }
    }

    /// Read `path` and inline its whole import graph.
    pub fn resolve_file(
        &self,
        path: &Utf8Path,
        inlined: &mut HashSet<Utf8PathBuf>,
    ) -> Result<String, ImportError> {
        if !mark_inlined(path, inlined)? {
            return Ok(String::new());
        }

        let content = text::read(path, self.charset).map_err(|source| ImportError::Read {
            path: path.to_owned(),
            source,
        })?;

        self.inline(path, &content, inlined)
    }

    /// Like [`resolve_file`](Self::resolve_file), but for text an earlier
    /// stage (preprocessing) already produced for `path`.
    pub fn resolve_content(
        &self,
        path: &Utf8Path,
        content: &str,
        inlined: &mut HashSet<Utf8PathBuf>,
    ) -> Result<String, ImportError> {
        if !mark_inlined(path, inlined)? {
            return Ok(String::new());
        }

        self.inline(path, content, inlined)
    }

    fn inline(
        &self,
        path: &Utf8Path,
        content: &str,
        inlined: &mut HashSet<Utf8PathBuf>,
    ) -> Result<String, ImportError> {
        // Relative imports resolve against the importing file's own
        // directory, not the module root.
        let base = path.parent().unwrap_or(Utf8Path::new(""));

        let mut result = String::with_capacity(content.len());
        let mut tail_start = 0;

        for captures in self.import_pattern.captures_iter(content) {
            let statement = captures.get(0).expect("group 0 is the whole match");
            let import_path = &captures[1];

            result.push_str(&content[tail_start..statement.start()]);

            // Absolute targets cannot be embedded; the statement is dropped.
            if !is_absolute_import(import_path) {
                let target = paths::resolve(base, import_path);
                result.push_str(&self.resolve_file(&target, inlined)?);
            }

            tail_start = statement.end();
        }

        result.push_str(&content[tail_start..]);
        Ok(result)
    }
}

/// Record `path` in the inlined set. Returns false when its canonical form
/// was already present.
fn mark_inlined(
    path: &Utf8Path,
    inlined: &mut HashSet<Utf8PathBuf>,
) -> Result<bool, ImportError> {
    let canonical = paths::canonicalize(path).map_err(|source| ImportError::Read {
        path: path.to_owned(),
        source,
    })?;
    Ok(inlined.insert(canonical))
}

/// An import target is absolute when it is an absolute URI (has a scheme)
/// or an absolute filesystem path.
fn is_absolute_import(path: &str) -> bool {
    Url::parse(path).is_ok() || Utf8Path::new(path).is_absolute()
}
