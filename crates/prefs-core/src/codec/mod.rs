//! Container codecs for preference documents.
//!
//! Two encodings of the same logical tree:
//!
//! - [`xml`] – an XML property list, prefixed with the standard XML
//!   declaration and the Apple `PropertyList-1.0` DOCTYPE.
//! - [`json`] – a JSON object `{"version": ..., "dict": {...}}` mirroring
//!   the `<plist>` element.
//!
//! Encoding is deterministic: the same document always produces the same
//! bytes, so saving unchanged content twice leaves the file byte-identical.

pub mod json;
pub mod xml;

use thiserror::Error;
use tracing::debug;

use crate::domain::document::PreferenceDocument;
use crate::domain::kinds::ContainerFormat;

/// Standard XML declaration written on the first line of every XML plist.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// DOCTYPE header expected by property-list consumers.  Reproduced byte for byte.
pub const PLIST_DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

/// Indentation width used when none is configured.
pub const DEFAULT_INDENT: usize = 4;

/// Errors that can occur while encoding or decoding a document.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The XML is not well formed or is not a property list.
    #[error("malformed XML at byte {offset}: {message}")]
    Xml { offset: u64, message: String },

    /// The JSON is not well formed.  Line and column are in the inner error.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is well formed but does not have the shape of a preference
    /// document.  `path` locates the offending node, e.g. `dict/Servers/0`.
    #[error("unexpected document shape at `{path}`: {message}")]
    Schema { path: String, message: String },

    /// The document cannot be represented in the selected container.
    #[error("failed to encode document: {0}")]
    Encode(String),
}

/// Presentation options for encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

/// Encodes `doc` in `format` with default options.
///
/// # Errors
///
/// Returns [`FormatError::Encode`] if the document cannot be represented in
/// the container.
pub fn encode(doc: &PreferenceDocument, format: ContainerFormat) -> Result<Vec<u8>, FormatError> {
    encode_with(doc, format, &EncodeOptions::default())
}

/// Encodes `doc` in `format`.
///
/// # Errors
///
/// Returns [`FormatError::Encode`] if the document cannot be represented in
/// the container.
pub fn encode_with(
    doc: &PreferenceDocument,
    format: ContainerFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>, FormatError> {
    let bytes = match format {
        ContainerFormat::Xml => xml::encode(doc, options.indent)?,
        ContainerFormat::Json => json::encode(doc, options.indent)?,
    };
    debug!(
        "encoded {format} document with {} top-level keys ({} bytes)",
        doc.dict.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decodes a document from `bytes` in `format`.
///
/// # Errors
///
/// Returns [`FormatError`] describing where the input went wrong.
pub fn decode(bytes: &[u8], format: ContainerFormat) -> Result<PreferenceDocument, FormatError> {
    let doc = match format {
        ContainerFormat::Xml => xml::decode(bytes)?,
        ContainerFormat::Json => json::decode(bytes)?,
    };
    debug!(
        "decoded {format} document with {} top-level keys",
        doc.dict.len()
    );
    Ok(doc)
}
