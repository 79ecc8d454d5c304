// SPDX-License-Identifier: MIT
//! Folding of multi-line values into single-line text records and back

use thiserror::Error;

/// Line break used inside values once they are joined back together
pub const CANONICAL_LINE_BREAK: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    #[error("mixed line endings ({crlf} CRLF, {cr} bare CR, {lf} bare LF)")]
    MixedLineEndings { crlf: usize, cr: usize, lf: usize },
}

/// Kind of line break found in a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    CrLf,
    Cr,
    Lf,
}

impl LineBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
            LineBreak::Lf => "\n",
        }
    }
}

/// Result of splitting a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Folded<'a> {
    /// No line break; the value is written verbatim
    Single(&'a str),
    /// One entry per physical line, in order
    Lines(Vec<&'a str>),
}

/// Find the single line-break kind used by `value`, if any
pub fn detect_line_break(value: &str) -> Result<Option<LineBreak>, FoldError> {
    let bytes = value.as_bytes();
    let (mut crlf, mut cr, mut lf) = (0, 0, 0);

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 1;
            }
            b'\r' => cr += 1,
            b'\n' => lf += 1,
            _ => {}
        }
        i += 1;
    }

    match (crlf > 0, cr > 0, lf > 0) {
        (false, false, false) => Ok(None),
        (true, false, false) => Ok(Some(LineBreak::CrLf)),
        (false, true, false) => Ok(Some(LineBreak::Cr)),
        (false, false, true) => Ok(Some(LineBreak::Lf)),
        _ => Err(FoldError::MixedLineEndings { crlf, cr, lf }),
    }
}

/// Split a value into physical lines.
///
/// Bare CR and bare LF values come back from [`join_lines`] as CRLF.
pub fn split_value(value: &str) -> Result<Folded<'_>, FoldError> {
    match detect_line_break(value)? {
        None => Ok(Folded::Single(value)),
        Some(line_break) => Ok(Folded::Lines(value.split(line_break.as_str()).collect())),
    }
}

pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut joined = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            joined.push_str(CANONICAL_LINE_BREAK);
        }
        joined.push_str(line.as_ref());
    }
    joined
}
