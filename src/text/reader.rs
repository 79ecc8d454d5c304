// SPDX-License-Identifier: MIT
//! Text bundle reader

use std::path::Path;

use tracing::{debug, info};

use super::{read_utf8, CONTINUATION_MARKER, KEY_VALUE_SEPARATOR};
use crate::config::CodecConfig;
use crate::error::{BundleError, Result};
use crate::folding::CANONICAL_LINE_BREAK;
use crate::manifest::{manifest_file_name, Manifest};
use crate::model::{Bundle, BundleFile, Pair, Section};

enum ParseState {
    NoSection,
    InSection(Section),
}

/// Line-by-line parser for one bundle file
struct SectionParser<'a> {
    source: &'a str,
    sections: Vec<Section>,
    state: ParseState,
}

impl<'a> SectionParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            sections: Vec::new(),
            state: ParseState::NoSection,
        }
    }

    fn context(&self, line_no: usize) -> String {
        format!("{} line {}", self.source, line_no)
    }

    fn feed(&mut self, line_no: usize, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            return self.open_section(line_no, &line[1..line.len() - 1]);
        }

        let Some((left, right)) = line.split_once(KEY_VALUE_SEPARATOR) else {
            return Err(BundleError::format(
                self.context(line_no),
                format!("expected 'key=value', found {:?}", line),
            ));
        };

        let section = match &mut self.state {
            ParseState::InSection(section) => section,
            ParseState::NoSection => {
                return Err(BundleError::format(
                    self.context(line_no),
                    "key/value pair before the first section header",
                ))
            }
        };

        match left.strip_suffix(CONTINUATION_MARKER) {
            Some(key) => match section.pairs.last_mut() {
                Some(last) if last.key == key => {
                    last.value.push_str(CANONICAL_LINE_BREAK);
                    last.value.push_str(right);
                }
                _ => section.push(key, right),
            },
            None => section.pairs.push(Pair::new(left, right)),
        }

        Ok(())
    }

    fn open_section(&mut self, line_no: usize, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(BundleError::format(
                self.context(line_no),
                "section header has an empty name",
            ));
        }

        let previous = std::mem::replace(&mut self.state, ParseState::InSection(Section::new(name)));
        if let ParseState::InSection(section) = previous {
            self.sections.push(section);
        }

        Ok(())
    }

    fn finish(mut self) -> Vec<Section> {
        if let ParseState::InSection(section) = self.state {
            self.sections.push(section);
        }
        self.sections
    }
}

/// Parse the sections of one text file; `source` names it in error messages
pub fn parse_sections(text: &str, source: &str) -> Result<Vec<Section>> {
    let mut parser = SectionParser::new(source);

    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line)?;
    }

    Ok(parser.finish())
}

/// Read a text bundle from `dir` with the default configuration
pub fn read_text(dir: &Path, name: &str) -> Result<Bundle> {
    read_text_with(dir, name, &CodecConfig::default())
}

/// Read a text bundle; `name` only locates the manifest, whose first line
/// becomes the bundle name
pub fn read_text_with(dir: &Path, name: &str, config: &CodecConfig) -> Result<Bundle> {
    let manifest_name = manifest_file_name(name, &config.manifest_extension)?;
    let manifest_path = dir.join(&manifest_name);
    info!("Reading text bundle from {}", manifest_path.display());

    let manifest = Manifest::parse(&read_utf8(&manifest_path)?, &manifest_name)?;

    let mut files = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        let path = dir.join(&entry.escaped_path);
        let sections = parse_sections(&read_utf8(&path)?, &entry.escaped_path)?;
        debug!(
            "Parsed {} ({} sections) as {:?}",
            path.display(),
            sections.len(),
            entry.original_name
        );

        files.push(BundleFile {
            name: entry.original_name.clone(),
            sections,
        });
    }

    info!(
        "Read text bundle {} with {} files",
        manifest.bundle_name,
        files.len()
    );

    Ok(Bundle {
        name: manifest.bundle_name,
        files,
    })
}
