// SPDX-License-Identifier: MIT
//! Binary bundle reader

use std::path::Path;

use tracing::{debug, info};

use crate::error::{BundleError, Result};
use crate::format::{decode_text, LengthMarker, INT_SIZE, MIN_ELEMENT_SIZE};
use crate::model::{Bundle, BundleFile, Pair, Section};

/// Sequential decoder over a borrowed byte slice
pub struct BundleReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BundleReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Decode the whole stream; `name` becomes the bundle name
    pub fn read_bundle(mut self, name: impl Into<String>) -> Result<Bundle> {
        let file_count = self.read_count("file count")?;
        let mut files = Vec::with_capacity(file_count);

        for file_index in 0..file_count {
            files.push(self.read_file(file_index)?);
        }

        if self.remaining() > 0 {
            return Err(self.error(
                "end of bundle",
                format!("{} trailing bytes after the last file", self.remaining()),
            ));
        }

        Ok(Bundle {
            name: name.into(),
            files,
        })
    }

    fn read_file(&mut self, file_index: usize) -> Result<BundleFile> {
        let name = self.read_string(&format!("file {} name", file_index))?;
        let section_count = self.read_count(&format!("file {} section count", file_index))?;

        let mut sections = Vec::with_capacity(section_count);
        for section_index in 0..section_count {
            sections.push(self.read_section(file_index, section_index)?);
        }

        Ok(BundleFile { name, sections })
    }

    fn read_section(&mut self, file_index: usize, section_index: usize) -> Result<Section> {
        let what = format!("file {} section {}", file_index, section_index);
        let name = self.read_string(&format!("{} name", what))?;
        let pair_count = self.read_count(&format!("{} pair count", what))?;

        let mut pairs = Vec::with_capacity(pair_count);
        for pair_index in 0..pair_count {
            let key = self.read_string(&format!("{} pair {} key", what, pair_index))?;
            let value = self.read_string(&format!("{} pair {} value", what, pair_index))?;
            pairs.push(Pair { key, value });
        }

        Ok(Section { name, pairs })
    }

    fn read_i32(&mut self, what: &str) -> Result<i32> {
        let bytes = self.take(INT_SIZE, what)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an element count and check the stream can hold that many elements
    fn read_count(&mut self, what: &str) -> Result<usize> {
        let start = self.pos;
        let raw = self.read_i32(what)?;

        let count = usize::try_from(raw).map_err(|_| {
            BundleError::format(
                format!("binary stream at offset {} ({})", start, what),
                format!("negative count {}", raw),
            )
        })?;

        if count > self.remaining() / MIN_ELEMENT_SIZE {
            return Err(BundleError::format(
                format!("binary stream at offset {} ({})", start, what),
                format!(
                    "count {} exceeds what the remaining {} bytes can hold",
                    count,
                    self.remaining()
                ),
            ));
        }

        Ok(count)
    }

    fn read_string(&mut self, what: &str) -> Result<String> {
        let start = self.pos;
        let raw = self.read_i32(what)?;
        let context = || format!("binary stream at offset {} ({})", start, what);

        let marker =
            LengthMarker::from_raw(raw).map_err(|e| BundleError::format(context(), e.to_string()))?;
        if marker.is_empty() {
            return Ok(String::new());
        }

        // A count that overflows usize can never fit in the remaining bytes
        let len = marker.byte_count().unwrap_or(usize::MAX);
        let payload = self.take(len, what)?;
        decode_text(payload).map_err(|e| BundleError::format(context(), e.to_string()))
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(
                what,
                format!(
                    "truncated stream: need {} bytes, {} remaining",
                    len,
                    self.remaining()
                ),
            ));
        }

        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn error(&self, what: &str, message: String) -> BundleError {
        BundleError::format(
            format!("binary stream at offset {} ({})", self.pos, what),
            message,
        )
    }
}

/// Decode a bundle from memory
pub fn decode_bundle(data: &[u8], name: impl Into<String>) -> Result<Bundle> {
    BundleReader::new(data).read_bundle(name)
}

/// Read a binary bundle file; `name` is recorded as the bundle name
pub fn read_binary(name: &str, path: &Path) -> Result<Bundle> {
    info!("Reading binary bundle {} from {}", name, path.display());

    let data = std::fs::read(path).map_err(|e| BundleError::io(path, e))?;
    let bundle = decode_bundle(&data, name)?;

    let stats = bundle.stats();
    debug!(
        "Decoded {} bytes: files={}, sections={}, pairs={}",
        data.len(),
        stats.files,
        stats.sections,
        stats.pairs
    );

    Ok(bundle)
}
