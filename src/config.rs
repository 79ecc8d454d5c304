// SPDX-License-Identifier: MIT
use std::fmt;
use std::str::FromStr;

/// Terminator written after each physical line of the text representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLineEnding {
    #[default]
    CrLf,
    Lf,
}

impl TextLineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            TextLineEnding::CrLf => "\r\n",
            TextLineEnding::Lf => "\n",
        }
    }
}

impl FromStr for TextLineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" => Ok(TextLineEnding::CrLf),
            "lf" => Ok(TextLineEnding::Lf),
            other => Err(format!("unknown line ending '{}' (expected crlf or lf)", other)),
        }
    }
}

impl fmt::Display for TextLineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextLineEnding::CrLf => f.write_str("crlf"),
            TextLineEnding::Lf => f.write_str("lf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub text_line_ending: TextLineEnding,
    /// Extension of the manifest file (`Demo.bin` -> `Demo.<ext>`)
    pub manifest_extension: String,
    /// Replacement for path separators and `..` in on-disk file names
    pub escape_char: char,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            text_line_ending: TextLineEnding::CrLf,
            manifest_extension: "manifest".to_string(),
            escape_char: '_',
        }
    }
}

impl CodecConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            text_line_ending: std::env::var("BUNDLE_TEXT_LINE_ENDING")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.text_line_ending),
            manifest_extension: std::env::var("BUNDLE_MANIFEST_EXTENSION")
                .unwrap_or(defaults.manifest_extension),
            escape_char: std::env::var("BUNDLE_ESCAPE_CHAR")
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(defaults.escape_char),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let ext = &self.manifest_extension;
        if ext.trim().is_empty() {
            return Err("BUNDLE_MANIFEST_EXTENSION cannot be empty".to_string());
        }
        if ext.contains(['/', '\\', '\r', '\n']) || ext.contains("..") {
            return Err(format!(
                "BUNDLE_MANIFEST_EXTENSION must be a plain extension, got '{}'",
                ext
            ));
        }

        if matches!(self.escape_char, '/' | '\\' | '.' | ';' | '=' | '\r' | '\n') {
            return Err(format!(
                "BUNDLE_ESCAPE_CHAR cannot be {:?}",
                self.escape_char
            ));
        }

        Ok(())
    }
}
