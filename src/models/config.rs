use camino::Utf8PathBuf;
use encoding_rs::Encoding;

/// Marker inside the output wrapper that is substituted with the final
/// minified CSS. A configured wrapper that lacks this marker fails the
/// build at the wrap stage.
pub const OUTPUT_WRAPPER_MARKER: &str = "%output%";

/// Marker used by the two template options: the `output-path` template
/// (substituted with the module name) and the `preprocess` command template
/// (substituted with the input file path). Substituted exactly once.
pub const TEMPLATE_MARKER: &str = "%s";

/// Immutable build configuration.
///
/// Constructed once by [`crate::config::load`] before any module is
/// processed and read-only for the remainder of the run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory all relative module paths were resolved against.
    pub root: Utf8PathBuf,

    /// Text encoding used for every CSS read and write.
    pub charset: &'static Encoding,

    /// Optional template the final minified CSS is embedded into via
    /// [`OUTPUT_WRAPPER_MARKER`].
    pub output_wrapper: Option<String>,

    /// Modules in declaration order.
    pub modules: Vec<Module>,

    /// Replace rules in declaration order, applied after minification.
    pub replaces: Vec<Replace>,

    /// Optional external command template each top-level input is piped
    /// through before import inlining.
    pub preprocess_command: Option<String>,

    /// Suppress informational diagnostics.
    pub quiet: bool,
}

/// A named unit of build configuration mapping one or more CSS input files
/// to exactly one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,

    /// Absolute input paths; order is concatenation order.
    pub inputs: Vec<Utf8PathBuf>,

    /// Absolute output path, already templated with the module name.
    pub output_path: Utf8PathBuf,
}

/// A regular-expression substitution applied to the minified CSS.
///
/// The replacement may reference capture groups from the search pattern
/// (`$1`, `$name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub search: String,
    pub replacement: String,
}
