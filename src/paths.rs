use camino::{Utf8Path, Utf8PathBuf};
use path_clean::PathClean;
use std::io;

/// Resolve a raw path against a root directory.
///
/// Absolute paths pass through untouched apart from lexical normalization;
/// relative paths are joined to `root` first. No filesystem access happens
/// here, so the result may name a file that does not exist yet.
pub fn resolve(root: &Utf8Path, raw: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(raw);
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&root.join(path))
    }
}

/// Canonical identity of a path, used only for duplicate detection while
/// inlining imports. Resolves symlinks and `.`/`..` segments, so two
/// spellings of the same file compare equal. Fails if the file does not
/// exist.
pub fn canonicalize(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    path.canonicalize_utf8()
}

/// Lexical `.`/`..` normalization without touching the filesystem.
fn clean(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.as_std_path().clean())
        .expect("cleaning a UTF-8 path yields a UTF-8 path")
}
