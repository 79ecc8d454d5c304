// SPDX-License-Identifier: MIT
//! Manifest mapping on-disk file names to logical file names
//!
//! ```text
//! Demo.bin                 bundle name
//! 2                        file count
//! a_b.cfg;;a\b.cfg         escapedRelativePath;;originalFileName
//! a___b.cfg;;a/../b.cfg
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::config::{CodecConfig, TextLineEnding};
use crate::error::{BundleError, Result};
use crate::model::Bundle;

/// Separator between the escaped path and the original name
pub const ENTRY_SEPARATOR: &str = ";;";

const SEPARATOR_CHAR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub escaped_path: String,
    pub original_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub bundle_name: String,
    pub entries: Vec<ManifestEntry>,
}

/// Turn a logical file name into a single on-disk path component.
///
/// Separators and `..` become `escape_char`. Distinct names can map to the
/// same result; [`Manifest::for_bundle`] rejects such collisions.
pub fn escape_name(name: &str, escape_char: char) -> Result<String> {
    if name.is_empty() {
        return Err(BundleError::format("file name", "empty file name"));
    }

    let mut buf = [0u8; 4];
    let replacement: &str = escape_char.encode_utf8(&mut buf);

    let escaped = name.replace(['/', '\\'], replacement).replace("..", replacement);
    if escaped == "." {
        return Ok(replacement.to_string());
    }

    Ok(escaped)
}

/// Manifest file name for a bundle: last path component, extension swapped
pub fn manifest_file_name(bundle_name: &str, extension: &str) -> Result<String> {
    let base = bundle_name.rsplit(['/', '\\']).next().unwrap_or(bundle_name);
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };

    if stem.is_empty() || stem == "." || stem == ".." {
        return Err(BundleError::format(
            "bundle name",
            format!("cannot derive a manifest file name from '{}'", bundle_name),
        ));
    }

    Ok(format!("{}.{}", stem, extension))
}

/// Check that a path taken from a manifest stays inside its directory
pub fn validate_escaped_path(path: &str, context: &str) -> Result<()> {
    if path.is_empty() || path == "." || path == ".." || path.contains(['/', '\\']) {
        return Err(BundleError::format(
            context,
            format!("'{}' is not a plain file name", path),
        ));
    }
    Ok(())
}

fn check_single_line(value: &str, what: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        return Err(BundleError::format(
            what,
            format!("{:?} contains a line break", value),
        ));
    }
    Ok(())
}

/// An entry line is split at the first `;;`, so neither field may contain it
/// or touch it with a lone `;`
fn check_entry_field(value: &str, what: &str) -> Result<()> {
    if value.contains(ENTRY_SEPARATOR)
        || value.starts_with(SEPARATOR_CHAR)
        || value.ends_with(SEPARATOR_CHAR)
    {
        return Err(BundleError::format(
            what,
            format!(
                "'{}' contains '{}' or starts or ends with '{}'",
                value, ENTRY_SEPARATOR, SEPARATOR_CHAR
            ),
        ));
    }
    Ok(())
}

impl Manifest {
    /// Build the manifest for `bundle`, escaping every file name
    pub fn for_bundle(bundle: &Bundle, config: &CodecConfig) -> Result<Self> {
        check_single_line(&bundle.name, "bundle name")?;

        let manifest_name = manifest_file_name(&bundle.name, &config.manifest_extension)?;
        let mut taken: HashMap<String, String> = HashMap::new();
        taken.insert(manifest_name.to_ascii_lowercase(), manifest_name.clone());

        let mut entries = Vec::with_capacity(bundle.files.len());
        for (index, file) in bundle.files.iter().enumerate() {
            let what = format!("file {} name", index);
            check_single_line(&file.name, &what)?;
            check_entry_field(&file.name, &what)?;

            let escaped_path = escape_name(&file.name, config.escape_char)?;
            check_entry_field(&escaped_path, &what)?;
            if escaped_path != file.name {
                debug!("Escaped file name {:?} -> {:?}", file.name, escaped_path);
            }

            if let Some(existing) = taken.insert(escaped_path.to_ascii_lowercase(), file.name.clone())
            {
                return Err(BundleError::format(
                    what,
                    format!(
                        "'{}' escapes to '{}', which collides with '{}'",
                        file.name, escaped_path, existing
                    ),
                ));
            }

            entries.push(ManifestEntry {
                escaped_path,
                original_name: file.name.clone(),
            });
        }

        Ok(Self {
            bundle_name: bundle.name.clone(),
            entries,
        })
    }

    pub fn render(&self, line_ending: TextLineEnding) -> String {
        let eol = line_ending.as_str();
        let mut out = String::new();

        out.push_str(&self.bundle_name);
        out.push_str(eol);
        out.push_str(&self.entries.len().to_string());
        out.push_str(eol);

        for entry in &self.entries {
            out.push_str(&entry.escaped_path);
            out.push_str(ENTRY_SEPARATOR);
            out.push_str(&entry.original_name);
            out.push_str(eol);
        }

        out
    }

    /// Parse manifest text; `source` names the file in error messages
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));
        let context = |line_no: usize| format!("manifest {} line {}", source, line_no);

        let (_, bundle_name) = lines
            .next()
            .ok_or_else(|| BundleError::format(context(1), "missing bundle name"))?;

        let (count_line, count_text) = lines
            .next()
            .ok_or_else(|| BundleError::format(context(2), "missing file count"))?;
        let count: usize = count_text.trim().parse().map_err(|_| {
            BundleError::format(
                context(count_line),
                format!("invalid file count '{}'", count_text),
            )
        })?;

        let mut entries = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            let (line_no, line) = lines.next().ok_or_else(|| {
                BundleError::format(
                    context(count_line + index + 1),
                    format!("manifest declares {} files but lists {}", count, index),
                )
            })?;

            let parts: Vec<&str> = line.split(ENTRY_SEPARATOR).collect();
            let [escaped_path, original_name] = parts[..] else {
                return Err(BundleError::format(
                    context(line_no),
                    format!(
                        "expected 'path{}name', found {} parts",
                        ENTRY_SEPARATOR,
                        parts.len()
                    ),
                ));
            };
            validate_escaped_path(escaped_path, &context(line_no))?;

            entries.push(ManifestEntry {
                escaped_path: escaped_path.to_string(),
                original_name: original_name.to_string(),
            });
        }

        if let Some((line_no, _)) = lines.find(|(_, line)| !line.trim().is_empty()) {
            return Err(BundleError::format(
                context(line_no),
                format!("unexpected content after {} declared files", count),
            ));
        }

        Ok(Self {
            bundle_name: bundle_name.to_string(),
            entries,
        })
    }
}
