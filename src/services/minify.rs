use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use thiserror::Error;

/// CSS could not be parsed or minified. Fatal for the whole run, since
/// malformed input usually means a configuration or upstream content defect.
#[derive(Error, Debug)]
#[error("css minification failed: {0}")]
pub struct MinifyError(pub String);

/// External minifier capability: raw CSS text plus an optional line-break
/// column hint in, minified text out.
///
/// The pipeline always passes `None` for the hint (unbounded line length);
/// the parameter exists so alternative backends that support line wrapping
/// can honor it.
pub trait Minifier {
    fn minify(&self, css: &str, line_break_column: Option<u32>) -> Result<String, MinifyError>;
}

/// Production minifier backed by lightningcss. Ignores the line-break hint;
/// its output is always a single line.
pub struct LightningMinifier;

impl Minifier for LightningMinifier {
    fn minify(&self, css: &str, _line_break_column: Option<u32>) -> Result<String, MinifyError> {
        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| MinifyError(format!("{e:?}")))?;

        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| MinifyError(format!("{e:?}")))?;

        let output = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| MinifyError(format!("{e:?}")))?;

        Ok(output.code)
    }
}
