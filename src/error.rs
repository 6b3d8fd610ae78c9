//! Error types for the edgequake-json2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Json2DocxError`] — **Fatal**: the conversion cannot proceed at all
//!   (unreadable input, malformed top-level JSON, packaging failure). Returned
//!   as `Err(Json2DocxError)` from the top-level `convert*` functions.
//!
//! * [`BlockError`] — **Non-fatal**: a single block could not be rendered
//!   (unknown type, wrong data shape, undecodable image) but every other block
//!   is fine. Stored inside [`crate::output::BlockOutcome`] so callers can
//!   inspect partial success rather than losing the whole document to one bad
//!   block.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-json2docx library.
///
/// Block-level failures use [`BlockError`] and are stored in
/// [`crate::output::BlockOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Json2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the document from standard input failed.
    #[error("Failed to read document from stdin: {source}")]
    StdinReadFailed {
        #[source]
        source: std::io::Error,
    },

    /// The input is not syntactically valid JSON.
    #[error("Invalid JSON input: {detail}")]
    InvalidJson { detail: String },

    /// The JSON is valid but does not describe a block document.
    #[error("Invalid document: {detail}")]
    InvalidDocument { detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The document builder could not serialise the container.
    #[error("Failed to package DOCX output: {detail}")]
    Packaging { detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some blocks rendered but at least one was skipped.
    ///
    /// Returned by [`crate::output::ConversionOutput::into_result`] when
    /// the caller wants to treat any skipped block as an error.
    #[error("{skipped}/{total} blocks were skipped during conversion")]
    PartialFailure {
        rendered: usize,
        skipped: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<zip::result::ZipError> for Json2DocxError {
    fn from(e: zip::result::ZipError) -> Self {
        Json2DocxError::Packaging {
            detail: e.to_string(),
        }
    }
}

/// A non-fatal error for a single block.
///
/// Stored alongside [`crate::output::BlockOutcome`] when a block is skipped.
/// The conversion always continues with the next block.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum BlockError {
    /// The block has no `type` field (or it is not a string).
    #[error("Block {index}: missing block type")]
    MissingType { index: usize },

    /// The block type is not one the renderer knows.
    #[error("Block {index}: unknown block type '{block_type}'")]
    UnknownType { index: usize, block_type: String },

    /// The `data` object does not have the shape the block type expects.
    #[error("Block {index} ({block_type}): invalid data: {detail}")]
    InvalidData {
        index: usize,
        block_type: String,
        detail: String,
    },

    /// A table block without rows or columns.
    #[error("Block {index}: table has no content")]
    EmptyTable { index: usize },

    /// The image source is not an embedded `data:image/...` URL.
    #[error("Block {index}: unsupported image source '{source_prefix}'")]
    UnsupportedImage { index: usize, source_prefix: String },

    /// The image payload could not be decoded or re-encoded.
    #[error("Block {index}: image decoding failed: {detail}")]
    ImageDecode { index: usize, detail: String },
}

impl BlockError {
    /// Zero-based position of the failing block in the document.
    pub fn index(&self) -> usize {
        match self {
            BlockError::MissingType { index }
            | BlockError::UnknownType { index, .. }
            | BlockError::InvalidData { index, .. }
            | BlockError::EmptyTable { index }
            | BlockError::UnsupportedImage { index, .. }
            | BlockError::ImageDecode { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = Json2DocxError::PartialFailure {
            rendered: 9,
            skipped: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn unknown_type_display() {
        let e = BlockError::UnknownType {
            index: 3,
            block_type: "embed".into(),
        };
        assert!(e.to_string().contains("embed"));
        assert!(e.to_string().contains("Block 3"));
    }

    #[test]
    fn block_error_index() {
        let e = BlockError::ImageDecode {
            index: 7,
            detail: "truncated".into(),
        };
        assert_eq!(e.index(), 7);
        assert_eq!(BlockError::EmptyTable { index: 2 }.index(), 2);
    }

    #[test]
    fn zip_error_becomes_packaging() {
        let e: Json2DocxError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(e, Json2DocxError::Packaging { .. }));
    }

    #[test]
    fn block_error_serialises() {
        let e = BlockError::EmptyTable { index: 1 };
        let json = serde_json::to_string(&e).expect("serialise");
        assert!(json.contains("EmptyTable"));
    }
}
