use crate::models::Replace;
use camino::Utf8PathBuf;
use clap::Parser;

/// The `search::replacement` delimiter for `--replace` rules.
const REPLACE_SPLITTER: &str = "::";

/// Build-time CSS module assembler: inlines @import chains, minifies, and
/// writes wrapped output files.
#[derive(Parser, Debug)]
#[command(name = "csspress", version, about)]
pub struct Cli {
    /// Path to the JSON build configuration
    pub config: Utf8PathBuf,

    /// Regex substitution applied to every module's minified CSS, in the
    /// given order; repeatable
    #[arg(long = "replace", value_name = "SEARCH::REPLACEMENT", value_parser = parse_replace)]
    pub replaces: Vec<Replace>,

    /// Suppress informational diagnostics
    #[arg(long, short)]
    pub quiet: bool,
}

/// Split a raw `--replace` value at the first `::` occurrence.
fn parse_replace(raw: &str) -> Result<Replace, String> {
    match raw.split_once(REPLACE_SPLITTER) {
        Some((search, replacement)) => Ok(Replace {
            search: search.to_string(),
            replacement: replacement.to_string(),
        }),
        None => Err(format!(
            "replace '{raw}' does not contain the splitter '{REPLACE_SPLITTER}'"
        )),
    }
}
