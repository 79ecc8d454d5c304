// SPDX-License-Identifier: MIT
//! In-memory bundle model shared by the binary and text codecs
//!
//! Pairs are kept as an ordered list, never a map: duplicate keys and their
//! order are part of the round-trip contract.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Top-level container: an ordered list of files.
///
/// `name` is supplied by the caller; the binary form does not store it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub name: String,
    pub files: Vec<BundleFile>,
}

/// Named list of sections. The name may contain path-like separators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleFile {
    pub name: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub pairs: Vec<Pair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: BundleFile) -> Self {
        self.files.push(file);
        self
    }

    /// Find the first file with the given logical name
    pub fn file(&self, name: &str) -> Option<&BundleFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Count files, sections and pairs
    pub fn stats(&self) -> BundleStats {
        let mut stats = BundleStats {
            files: self.files.len(),
            ..BundleStats::default()
        };

        for section in self.files.iter().flat_map(|f| &f.sections) {
            stats.sections += 1;
            stats.pairs += section.pairs.len();
            stats.multiline_values += section
                .pairs
                .iter()
                .filter(|p| p.value.contains(['\r', '\n']))
                .count();
            let mut seen = HashSet::with_capacity(section.pairs.len());
            stats.duplicate_keys += section
                .pairs
                .iter()
                .filter(|p| !seen.insert(p.key.as_str()))
                .count();
        }

        stats
    }
}

impl BundleFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn with_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push(Pair::new(key, value));
    }

    /// All values stored under `key`, in order
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Bundle statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BundleStats {
    pub files: usize,
    pub sections: usize,
    pub pairs: usize,
    /// Values containing at least one line break
    pub multiline_values: usize,
    /// Pairs whose key already appeared earlier in the same section
    pub duplicate_keys: usize,
}
