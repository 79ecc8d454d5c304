// SPDX-License-Identifier: MIT
//! Text bundle writer

use std::path::Path;

use tracing::{debug, info};

use super::{CONTINUATION_MARKER, KEY_VALUE_SEPARATOR};
use crate::config::{CodecConfig, TextLineEnding};
use crate::error::{BundleError, Result};
use crate::folding::{split_value, Folded};
use crate::manifest::{manifest_file_name, Manifest};
use crate::model::{Bundle, BundleFile, Pair, Section};

fn check_section_name(name: &str, context: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BundleError::format(context, "section name is empty"));
    }
    if name.contains(['\r', '\n']) {
        return Err(BundleError::format(context, "section name contains a line break"));
    }
    Ok(())
}

fn check_key(key: &str, context: &str) -> Result<()> {
    let problem = if key.contains(['\r', '\n']) {
        "contains a line break"
    } else if key.contains(KEY_VALUE_SEPARATOR) {
        "contains '='"
    } else if key.starts_with('[') {
        "starts with '['"
    } else if key.ends_with(CONTINUATION_MARKER) {
        "ends with the '||' continuation marker"
    } else {
        return Ok(());
    };

    Err(BundleError::format(context, format!("key {:?} {}", key, problem)))
}

fn render_section(
    out: &mut String,
    file_name: &str,
    section: &Section,
    eol: &str,
) -> Result<()> {
    let section_context = format!("file '{}' section [{}]", file_name, section.name);
    check_section_name(&section.name, &section_context)?;

    out.push('[');
    out.push_str(&section.name);
    out.push(']');
    out.push_str(eol);

    let mut previous: Option<&Pair> = None;
    for pair in &section.pairs {
        let context = format!("{} key '{}'", section_context, pair.key);
        check_key(&pair.key, &context)?;

        match split_value(&pair.value).map_err(|e| BundleError::format(&context, e.to_string()))? {
            Folded::Single(value) => {
                out.push_str(&pair.key);
                out.push(KEY_VALUE_SEPARATOR);
                out.push_str(value);
                out.push_str(eol);
            }
            Folded::Lines(lines) => {
                // Continuation records would be merged into the preceding pair
                if previous.is_some_and(|p| p.key == pair.key) {
                    return Err(BundleError::format(
                        context,
                        "multi-line value directly follows a pair with the same key",
                    ));
                }

                for line in lines {
                    out.push_str(&pair.key);
                    out.push_str(CONTINUATION_MARKER);
                    out.push(KEY_VALUE_SEPARATOR);
                    out.push_str(line);
                    out.push_str(eol);
                }
            }
        }

        previous = Some(pair);
    }

    Ok(())
}

/// Render one bundle file as INI-like text
pub fn render_file(file: &BundleFile, line_ending: TextLineEnding) -> Result<String> {
    let eol = line_ending.as_str();
    let mut out = String::new();

    for section in &file.sections {
        render_section(&mut out, &file.name, section, eol)?;
    }

    Ok(out)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| BundleError::io(path, e))
}

/// Write `bundle` under `dir` with the default configuration
pub fn write_text(bundle: &Bundle, dir: &Path) -> Result<Manifest> {
    write_text_with(bundle, dir, &CodecConfig::default())
}

/// Write one text file per bundle file plus the manifest.
///
/// Everything is rendered and validated before the first file is written.
pub fn write_text_with(bundle: &Bundle, dir: &Path, config: &CodecConfig) -> Result<Manifest> {
    info!(
        "Writing text bundle {} ({} files) to {}",
        bundle.name,
        bundle.files.len(),
        dir.display()
    );

    let manifest = Manifest::for_bundle(bundle, config)?;
    let manifest_name = manifest_file_name(&bundle.name, &config.manifest_extension)?;

    let rendered = bundle
        .files
        .iter()
        .map(|file| render_file(file, config.text_line_ending))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(dir).map_err(|e| BundleError::io(dir, e))?;

    for (entry, contents) in manifest.entries.iter().zip(&rendered) {
        let path = dir.join(&entry.escaped_path);
        write_file(&path, contents)?;
        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    }

    let manifest_path = dir.join(&manifest_name);
    write_file(&manifest_path, &manifest.render(config.text_line_ending))?;

    info!("Wrote manifest {}", manifest_path.display());
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(section: Section) -> BundleFile {
        BundleFile::new("Cfg").with_section(section)
    }

    #[test]
    fn test_duplicate_keys_written_separately() {
        let file = file_with(
            Section::new("Main")
                .with_pair("Key1", "Value1")
                .with_pair("Key1", "Value2"),
        );

        let text = render_file(&file, TextLineEnding::Lf).unwrap();
        assert_eq!(text, "[Main]\nKey1=Value1\nKey1=Value2\n");
    }

    #[test]
    fn test_multiline_value_folded() {
        let file = file_with(Section::new("Main").with_pair("Desc", "Line A\r\nLine B"));

        let text = render_file(&file, TextLineEnding::CrLf).unwrap();
        assert_eq!(text, "[Main]\r\nDesc||=Line A\r\nDesc||=Line B\r\n");
    }

    #[test]
    fn test_value_with_equals_kept_verbatim() {
        let file = file_with(Section::new("Main").with_pair("Url", "a=b=c"));
        let text = render_file(&file, TextLineEnding::Lf).unwrap();
        assert_eq!(text, "[Main]\nUrl=a=b=c\n");
    }

    #[test]
    fn test_mixed_line_endings_rejected() {
        let file = file_with(Section::new("Main").with_pair("Bad", "a\rb\nc"));

        let err = render_file(&file, TextLineEnding::Lf).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("mixed line endings"));
        assert!(err.to_string().contains("key 'Bad'"));
    }

    #[test]
    fn test_blank_section_name_rejected() {
        for name in ["", "   "] {
            let file = file_with(Section::new(name));
            assert!(render_file(&file, TextLineEnding::Lf).is_err());
        }
    }

    #[test]
    fn test_unrepresentable_keys_rejected() {
        for key in ["a=b", "[a", "a||", "a\nb"] {
            let file = file_with(Section::new("Main").with_pair(key, "v"));
            assert!(
                render_file(&file, TextLineEnding::Lf).is_err(),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_ambiguous_continuation_rejected() {
        let file = file_with(
            Section::new("Main")
                .with_pair("Desc", "x")
                .with_pair("Desc", "a\r\nb"),
        );
        assert!(render_file(&file, TextLineEnding::Lf).is_err());

        let file = file_with(
            Section::new("Main")
                .with_pair("Desc", "a\r\nb")
                .with_pair("Other", "x")
                .with_pair("Desc", "c\r\nd"),
        );
        assert!(render_file(&file, TextLineEnding::Lf).is_ok());
    }

    #[test]
    fn test_write_text_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let bundle = Bundle::new("Demo.bin")
            .with_file(file_with(Section::new("Main").with_pair("Key1", "Value1")));

        let manifest = write_text(&bundle, &out).unwrap();

        assert_eq!(manifest.entries[0].escaped_path, "Cfg");
        assert_eq!(
            std::fs::read_to_string(out.join("Cfg")).unwrap(),
            "[Main]\r\nKey1=Value1\r\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("Demo.manifest")).unwrap(),
            "Demo.bin\r\n1\r\nCfg;;Cfg\r\n"
        );
    }

    #[test]
    fn test_invalid_bundle_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let bundle = Bundle::new("Demo.bin")
            .with_file(file_with(Section::new("Main").with_pair("Key1", "Value1")))
            .with_file(
                BundleFile::new("Bad").with_section(Section::new("S").with_pair("k", "a\rb\nc")),
            );

        assert!(write_text(&bundle, &out).is_err());
        assert!(!out.exists());
    }
}
