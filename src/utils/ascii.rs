// src/utils/ascii.rs
use std::fmt::{self, Write};

/// Writes raw tag bytes as text, one char per byte. NUL bytes are kept.
pub(crate) fn write_raw(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        f.write_char(char::from(b))?;
    }
    Ok(())
}

/// Tag bytes without the trailing NUL padding.
pub(crate) fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

pub(crate) fn to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
