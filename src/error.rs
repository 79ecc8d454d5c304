// SPDX-License-Identifier: MIT
//! Error types shared by the binary and text codecs

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading or writing a bundle
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Invalid format in {context}: {message}")]
    Format { context: String, message: String },

    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BundleError>;

impl BundleError {
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O failure, turning `NotFound` into [`BundleError::MissingResource`]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingResource(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_missing_resource(&self) -> bool {
        matches!(self, Self::MissingResource(_))
    }
}
