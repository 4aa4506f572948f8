//! Tolerant text decoding for user and reference files
//!
//! Files come from spreadsheet exports and text editors on Windows as often
//! as from UTF-8 tools. Valid UTF-8 (with or without BOM) is used as is;
//! anything else is read as Latin-1 so accented labels stay readable.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode raw bytes as UTF-8, falling back to Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Read a whole file with [`decode_text`]
pub fn read_text_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_text(&bytes))
}
