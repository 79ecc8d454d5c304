// SPDX-License-Identifier: MIT
//! Binary bundle writer

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{BundleError, Result};
use crate::format::{encode_string, write_i32};
use crate::model::{Bundle, BundleFile, Section};

/// Serializer building the binary form in memory
#[derive(Debug, Default)]
pub struct BundleWriter {
    buffer: Vec<u8>,
}

impl BundleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append the whole bundle; the bundle name is not part of the stream
    pub fn write_bundle(&mut self, bundle: &Bundle) -> Result<()> {
        self.write_count(bundle.files.len(), "file count")?;

        for (file_index, file) in bundle.files.iter().enumerate() {
            self.write_file(file_index, file)?;
        }

        Ok(())
    }

    fn write_file(&mut self, file_index: usize, file: &BundleFile) -> Result<()> {
        let what = format!("file {} ({})", file_index, file.name);
        self.write_string(&file.name, &what)?;
        self.write_count(file.sections.len(), &what)?;

        for section in &file.sections {
            self.write_section(&what, section)?;
        }

        Ok(())
    }

    fn write_section(&mut self, file_what: &str, section: &Section) -> Result<()> {
        let what = format!("{} section [{}]", file_what, section.name);
        self.write_string(&section.name, &what)?;
        self.write_count(section.pairs.len(), &what)?;

        for pair in &section.pairs {
            self.write_string(&pair.key, &what)?;
            self.write_string(&pair.value, &what)?;
        }

        Ok(())
    }

    fn write_count(&mut self, count: usize, what: &str) -> Result<()> {
        let count = i32::try_from(count).map_err(|_| {
            BundleError::format(what, format!("count {} does not fit a 32-bit field", count))
        })?;
        write_i32(&mut self.buffer, count);
        Ok(())
    }

    fn write_string(&mut self, value: &str, what: &str) -> Result<()> {
        encode_string(value, &mut self.buffer).map_err(|e| BundleError::format(what, e.to_string()))
    }

    pub fn finalize(self) -> Vec<u8> {
        self.buffer
    }
}

/// Encode a bundle to its binary form
pub fn encode_bundle(bundle: &Bundle) -> Result<Vec<u8>> {
    let mut writer = BundleWriter::new();
    writer.write_bundle(bundle)?;
    Ok(writer.finalize())
}

/// Write a bundle to `path`, replacing any existing file
pub fn write_binary(bundle: &Bundle, path: &Path) -> Result<()> {
    info!("Writing binary bundle {} to {}", bundle.name, path.display());

    let data = encode_bundle(bundle)?;

    let mut file = std::fs::File::create(path).map_err(|e| BundleError::io(path, e))?;
    file.write_all(&data)
        .and_then(|_| file.flush())
        .map_err(|e| BundleError::io(path, e))?;

    info!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
