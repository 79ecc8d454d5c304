// SPDX-License-Identifier: MIT
//! Binary bundle wire format
//!
//! ```text
//! Bundle    := Int32 fileCount, File*
//! File      := String name, Int32 sectionCount, Section*
//! Section   := String name, Int32 pairCount, Pair*
//! Pair      := String key, String value
//! String    := Int32 len, u16[-len]        (len <= 0, UTF-16LE, last unit is 0)
//! ```
//!
//! All integers are little-endian and signed. The string length field counts
//! 2-byte code units including the null terminator and is stored negated; an
//! empty string is a bare `0` with no payload.

use thiserror::Error;

/// Size of every integer field in bytes
pub const INT_SIZE: usize = 4;

/// Size of one text code unit in bytes
pub const CODE_UNIT_SIZE: usize = 2;

/// Smallest possible encoding of a file, section or pair (two empty fields)
pub const MIN_ELEMENT_SIZE: usize = 2 * INT_SIZE;

/// Errors from the length-prefixed string primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringCodecError {
    #[error("positive length marker {0} is not a supported string encoding")]
    PositiveLength(i32),

    #[error("string of {0} code units does not fit the length field")]
    TooLong(usize),

    #[error("payload is not valid UTF-16 text")]
    InvalidUtf16,
}

/// Signed length prefix of an encoded string.
///
/// The raw value is never positive: `0` marks an empty string, `-(n + 1)`
/// marks `n` code units followed by a terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMarker(i32);

impl LengthMarker {
    pub const EMPTY: Self = Self(0);

    /// Marker for a string of `code_units` UTF-16 units (terminator excluded)
    pub fn for_text(code_units: usize) -> Result<Self, StringCodecError> {
        if code_units == 0 {
            return Ok(Self::EMPTY);
        }

        let with_terminator = code_units
            .checked_add(1)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(StringCodecError::TooLong(code_units))?;

        Ok(Self(-with_terminator))
    }

    /// Validate a marker read from a stream
    pub fn from_raw(raw: i32) -> Result<Self, StringCodecError> {
        if raw > 0 {
            return Err(StringCodecError::PositiveLength(raw));
        }
        Ok(Self(raw))
    }

    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of payload bytes following the marker, terminator included.
    ///
    /// `None` when the count does not fit in `usize`.
    #[inline]
    pub fn byte_count(self) -> Option<usize> {
        usize::try_from(self.0.unsigned_abs())
            .ok()?
            .checked_mul(CODE_UNIT_SIZE)
    }
}

/// Append a little-endian `i32`
#[inline]
pub fn write_i32(buffer: &mut Vec<u8>, value: i32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

/// Append `value` as a length-prefixed, null-terminated UTF-16LE string
pub fn encode_string(value: &str, buffer: &mut Vec<u8>) -> Result<(), StringCodecError> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let marker = LengthMarker::for_text(units.len())?;

    buffer.reserve(INT_SIZE + marker.byte_count().unwrap_or(0));
    write_i32(buffer, marker.raw());

    if !marker.is_empty() {
        for unit in units {
            buffer.extend_from_slice(&unit.to_le_bytes());
        }
        buffer.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(())
}

/// Decode a string payload of `marker.byte_count()` bytes.
///
/// The trailing code unit is the terminator and is dropped without inspection.
pub fn decode_text(payload: &[u8]) -> Result<String, StringCodecError> {
    let text_len = payload.len().saturating_sub(CODE_UNIT_SIZE);
    let units: Vec<u16> = payload[..text_len]
        .chunks_exact(CODE_UNIT_SIZE)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|_| StringCodecError::InvalidUtf16)
}
