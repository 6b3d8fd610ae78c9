//! Input resolution: turn a user-supplied argument into a parsed [`Document`].
//!
//! The argument is interpreted as:
//!
//! * inline JSON when it starts with `{` after leading whitespace,
//! * standard input when it is exactly `-`,
//! * otherwise a path to a UTF-8 JSON file.

use crate::document::Document;
use crate::error::Json2DocxError;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Where the document text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Inline,
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn classify(input: &str) -> Self {
        if is_inline_json(input) {
            InputSource::Inline
        } else if input == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(input))
        }
    }
}

/// Check if the argument is a JSON document rather than a path.
pub fn is_inline_json(input: &str) -> bool {
    input.trim_start().starts_with('{')
}

/// Resolve the argument and parse it into a [`Document`].
pub fn load_document(input: &str) -> Result<Document, Json2DocxError> {
    let text = read_input(input)?;
    Document::from_json(&text)
}

/// Resolve the argument to the raw JSON text.
pub fn read_input(input: &str) -> Result<String, Json2DocxError> {
    match InputSource::classify(input) {
        InputSource::Inline => {
            debug!("Reading inline JSON ({} bytes)", input.len());
            Ok(input.to_string())
        }
        InputSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| Json2DocxError::StdinReadFailed { source })?;
            debug!("Read {} bytes from stdin", buf.len());
            Ok(buf)
        }
        InputSource::File(path) => resolve_local(path),
    }
}

/// Read a local file, mapping I/O failures onto the fatal error kinds.
fn resolve_local(path: PathBuf) -> Result<String, Json2DocxError> {
    if !path.exists() {
        return Err(Json2DocxError::FileNotFound { path });
    }

    match std::fs::read(&path) {
        Ok(bytes) => {
            debug!("Resolved local JSON: {} ({} bytes)", path.display(), bytes.len());
            // Tolerate a UTF-8 byte-order mark written by some editors.
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
            String::from_utf8(bytes.to_vec()).map_err(|e| Json2DocxError::InvalidJson {
                detail: format!("{} is not valid UTF-8: {e}", path.display()),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Json2DocxError::PermissionDenied { path })
        }
        Err(_) => Err(Json2DocxError::FileNotFound { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify() {
        assert_eq!(InputSource::classify("  {\"blocks\": []}"), InputSource::Inline);
        assert_eq!(InputSource::classify("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::classify("doc.json"),
            InputSource::File(PathBuf::from("doc.json"))
        );
    }

    #[test]
    fn inline_json_loads() {
        let doc = load_document(r#"{"blocks": [{"type": "delimiter"}]}"#).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_document("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Json2DocxError::FileNotFound { .. }));
    }

    #[test]
    fn file_with_bom_loads() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\xEF\xBB\xBF{\"blocks\": []}").unwrap();
        let doc = load_document(tmp.path().to_str().unwrap()).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn invalid_json_in_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{ nope").unwrap();
        let err = load_document(tmp.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Json2DocxError::InvalidJson { .. }));
    }
}
