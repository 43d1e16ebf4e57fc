pub mod compress;
pub mod imports;
pub mod minify;
pub mod preprocess;

pub use compress::{CompressError, CssCompressor};
pub use imports::{ImportError, ImportInliner};
pub use minify::{LightningMinifier, Minifier, MinifyError};
pub use preprocess::PreprocessError;
