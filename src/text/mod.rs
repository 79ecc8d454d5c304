// SPDX-License-Identifier: MIT
//! Directory-based text representation
//!
//! One INI-like file per bundle file plus one manifest per bundle:
//!
//! ```text
//! [Main]
//! Key1=Value1
//! Key1=Value2
//! Desc||=Line A
//! Desc||=Line B
//! ```
//!
//! A `key||=line` record is one physical line of a multi-line value; adjacent
//! records sharing a key are joined with CRLF when read back.

pub mod reader;
pub mod writer;

pub use reader::{parse_sections, read_text, read_text_with};
pub use writer::{render_file, write_text, write_text_with};

use std::path::Path;

use crate::error::{BundleError, Result};

/// Suffix on a key marking a folded line of a multi-line value
pub const CONTINUATION_MARKER: &str = "||";

pub const KEY_VALUE_SEPARATOR: char = '=';

/// Read a UTF-8 text file, dropping a leading byte order mark
fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| BundleError::io(path, e))?;
    let mut text = String::from_utf8(bytes).map_err(|e| {
        BundleError::format(path.display().to_string(), format!("not valid UTF-8: {}", e))
    })?;

    if text.starts_with('\u{feff}') {
        text.remove(0);
    }

    Ok(text)
}
