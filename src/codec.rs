// SPDX-License-Identifier: MIT
//! The four bundle operations behind one configurable entry point

use std::path::Path;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::model::Bundle;
use crate::{reader, text, writer};

/// Converts bundles between the binary file and the text directory forms.
///
/// Holds no state besides its configuration; every call builds a fresh
/// [`Bundle`] or consumes a borrowed one.
#[derive(Debug, Clone, Default)]
pub struct BundleCodec {
    config: CodecConfig,
}

impl BundleCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn read_binary(&self, name: &str, path: &Path) -> Result<Bundle> {
        reader::read_binary(name, path)
    }

    pub fn write_binary(&self, bundle: &Bundle, path: &Path) -> Result<()> {
        writer::write_binary(bundle, path)
    }

    pub fn read_text(&self, dir: &Path, name: &str) -> Result<Bundle> {
        text::read_text_with(dir, name, &self.config)
    }

    pub fn write_text(&self, bundle: &Bundle, dir: &Path) -> Result<Manifest> {
        text::write_text_with(bundle, dir, &self.config)
    }
}
