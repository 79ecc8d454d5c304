// SPDX-License-Identifier: MIT
//! # Resource Bundle Codec
//!
//! Converts binary resource bundles (a list of named files, each holding named
//! sections of key/value pairs) into an editable directory of text files and
//! back, without losing content across repeated round trips.
//!
//! ## Forms
//!
//! - **Binary**: a single little-endian stream of counts and length-prefixed
//!   UTF-16 strings, see [`format`].
//! - **Text**: one INI-like file per bundle file plus a manifest that maps
//!   escaped on-disk names back to the original file names, see [`text`] and
//!   [`manifest`].
//!
//! Both forms share the [`Bundle`] model. Pairs are an ordered list, so
//! duplicate keys survive every conversion. Values containing line breaks are
//! folded into several `key||=line` records in text form and rejoined with
//! CRLF ([`folding`]).
//!
//! ## Usage
//!
//! ```no_run
//! use resource_bundle::BundleCodec;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), resource_bundle::BundleError> {
//! let codec = BundleCodec::new();
//!
//! // Unpack
//! let bundle = codec.read_binary("Demo.bin", Path::new("Demo.bin"))?;
//! codec.write_text(&bundle, Path::new("Demo"))?;
//!
//! // Pack
//! let edited = codec.read_text(Path::new("Demo"), "Demo.bin")?;
//! codec.write_binary(&edited, Path::new("Demo.bin"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Limits
//!
//! - Values mixing different line-break kinds are rejected on text export.
//! - Bare CR or bare LF inside a value comes back as CRLF.
//! - File names that escape to the same on-disk name are rejected. The check
//!   ignores ASCII case, so `Cfg` and `CFG` are rejected even on a
//!   case-sensitive filesystem; the text directory stays portable to
//!   case-insensitive ones.
//! - File names may not contain `;;` or start or end with `;`.
//! - Writes are not atomic; a failed export may leave partial output.

pub mod codec;
pub mod config;
pub mod error;
pub mod folding;
pub mod format;
pub mod manifest;
pub mod model;
pub mod reader;
pub mod text;
pub mod writer;

// Re-export main types
pub use codec::BundleCodec;
pub use config::{CodecConfig, TextLineEnding};
pub use error::{BundleError, Result};
pub use folding::{join_lines, split_value, FoldError, Folded};
pub use manifest::{escape_name, Manifest, ManifestEntry};
pub use model::{Bundle, BundleFile, BundleStats, Pair, Section};
pub use reader::{decode_bundle, read_binary, BundleReader};
pub use text::{read_text, write_text};
pub use writer::{encode_bundle, write_binary, BundleWriter};
