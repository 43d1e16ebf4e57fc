use camino::Utf8Path;
use encoding_rs::Encoding;
use std::fs;
use std::io;

/// Look up a text encoding by its WHATWG label ("UTF-8", "windows-1251", ...).
pub fn lookup_charset(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}

/// Read a file and decode it with the given encoding.
///
/// Malformed byte sequences decode to U+FFFD replacement characters rather
/// than failing, matching lenient reader behavior.
pub fn read(path: &Utf8Path, encoding: &'static Encoding) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

/// Encode text with the given encoding and write it, fully overwriting any
/// existing file.
pub fn write(path: &Utf8Path, text: &str, encoding: &'static Encoding) -> io::Result<()> {
    let (bytes, _, _) = encoding.encode(text);
    fs::write(path, bytes)
}
