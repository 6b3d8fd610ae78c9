//! Whole-document conversion entry points.
//!
//! Every entry point funnels into the same single pass: render each block in
//! order into an in-memory [`RenderedDocument`], deduplicate hyperlink text,
//! then emit the finished elements to a [`DocumentBuilder`]. Nothing reaches
//! the builder before deduplication has run.

use crate::builder::{DocumentBuilder, DocxBuilder};
use crate::config::ConversionConfig;
use crate::document::Document;
use crate::error::Json2DocxError;
use crate::model::{RenderedDocument, RenderedElement};
use crate::output::{BlockOutcome, ConversionOutput, ConversionStats};
use crate::pipeline::{dedupe, input, render::Renderer};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a document given as inline JSON, `-` (stdin) or a file path.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some blocks were skipped
/// (check `output.stats.skipped_blocks`).
///
/// # Errors
/// Returns `Err(Json2DocxError)` only for fatal errors:
/// - File not found / permission denied / unreadable stdin
/// - Input is not JSON or not a block document
/// - The package could not be written
pub fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Json2DocxError> {
    let document = input::load_document(input_str.as_ref())?;
    convert_document(&document, config)
}

/// Convert a JSON string.
///
/// # Example
/// ```rust
/// use edgequake_json2docx::{convert_json, ConversionConfig};
///
/// let json = r#"{"blocks": [{"type": "paragraph", "data": {"text": "Hello <b>world</b>"}}]}"#;
/// let output = convert_json(json, &ConversionConfig::default()).unwrap();
/// assert_eq!(output.stats.rendered_blocks, 1);
/// assert!(output.bytes.starts_with(b"PK"));
/// ```
pub fn convert_json(json: &str, config: &ConversionConfig) -> Result<ConversionOutput, Json2DocxError> {
    let document = Document::from_json(json)?;
    convert_document(&document, config)
}

/// Convert an already-parsed document to DOCX bytes.
pub fn convert_document(
    document: &Document,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Json2DocxError> {
    let start = Instant::now();
    let mut builder = DocxBuilder::new();
    let (blocks, mut stats) = assemble(document, config, &mut builder);
    let bytes = builder.save()?;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {}/{} blocks, {} images, {} bytes, {}ms",
        stats.rendered_blocks,
        stats.total_blocks,
        stats.images_embedded,
        bytes.len(),
        stats.duration_ms
    );

    Ok(ConversionOutput {
        bytes,
        blocks,
        stats,
    })
}

/// Render `document` into a caller-supplied builder.
///
/// The builder receives every finished element but is not saved; call
/// [`DocumentBuilder::save`] afterwards to obtain the output.
pub fn convert_with_builder(
    document: &Document,
    config: &ConversionConfig,
    builder: &mut dyn DocumentBuilder,
) -> ConversionStats {
    let start = Instant::now();
    let (_, mut stats) = assemble(document, config, builder);
    stats.duration_ms = start.elapsed().as_millis() as u64;
    stats
}

/// Convert and write the package to `output_path`.
///
/// Uses atomic write (temp file in the destination directory + rename) to
/// prevent partial files.
pub fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Json2DocxError> {
    let output = convert(input_str, config)?;
    write_atomic(output_path.as_ref(), &output.bytes)?;
    Ok(output.stats)
}

/// Write `bytes` to `path` via a temporary sibling file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Json2DocxError> {
    let write_err = |source: std::io::Error| Json2DocxError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Assembly ─────────────────────────────────────────────────────────────

fn assemble(
    document: &Document,
    config: &ConversionConfig,
    builder: &mut dyn DocumentBuilder,
) -> (Vec<BlockOutcome>, ConversionStats) {
    let total = document.len();
    info!("Starting conversion: {} blocks", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    // ── Step 1: Render every block into memory ───────────────────────────
    let mut rendered = RenderedDocument::new();
    let mut renderer = Renderer::new(config);
    let mut outcomes = Vec::with_capacity(total);

    for (index, raw) in document.blocks.iter().enumerate() {
        let result = raw
            .parse(index)
            .and_then(|block| renderer.render(&block, index));

        let outcome = match result {
            Ok(elements) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_block_rendered(index, total, raw.type_name());
                }
                let count = elements.len();
                rendered.extend(elements);
                BlockOutcome {
                    index,
                    block_type: raw.type_name().to_string(),
                    id: raw.id.clone(),
                    elements: count,
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    "Skipping block {}{}: {}",
                    index,
                    raw.id
                        .as_deref()
                        .map(|id| format!(" (id {id})"))
                        .unwrap_or_default(),
                    e
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_block_skipped(index, total, &e.to_string());
                }
                BlockOutcome {
                    index,
                    block_type: raw.type_name().to_string(),
                    id: raw.id.clone(),
                    elements: 0,
                    error: Some(e),
                }
            }
        };
        outcomes.push(outcome);
    }

    // ── Step 2: Remove plain copies of hyperlink text ────────────────────
    let duplicate_runs_removed = dedupe::dedupe_document(&mut rendered);

    // ── Step 3: Emit to the builder ──────────────────────────────────────
    let mut images_embedded = 0;
    for element in &rendered.elements {
        if matches!(element, RenderedElement::Picture(_)) {
            images_embedded += 1;
        }
        builder.add_element(element);
    }

    let rendered_blocks = outcomes.iter().filter(|o| o.is_rendered()).count();
    let stats = ConversionStats {
        total_blocks: total,
        rendered_blocks,
        skipped_blocks: total - rendered_blocks,
        duplicate_runs_removed,
        images_embedded,
        duration_ms: 0,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, rendered_blocks);
    }
    (outcomes, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlockError;
    use crate::model::{RenderedParagraph, RenderedPicture, RenderedTable};
    use serde_json::json;

    /// Records the order and content of builder calls.
    #[derive(Default)]
    struct RecordingBuilder {
        calls: Vec<String>,
        paragraphs: Vec<RenderedParagraph>,
    }

    impl DocumentBuilder for RecordingBuilder {
        fn add_paragraph(&mut self, paragraph: &RenderedParagraph) {
            self.calls.push(format!("p:{}", paragraph.text()));
            self.paragraphs.push(paragraph.clone());
        }

        fn add_table(&mut self, table: &RenderedTable) {
            self.calls
                .push(format!("t:{}x{}", table.row_count(), table.col_count()));
        }

        fn add_picture(&mut self, _picture: &RenderedPicture) {
            self.calls.push("img".into());
        }

        fn save(&mut self) -> Result<Vec<u8>, Json2DocxError> {
            Ok(self.calls.join("\n").into_bytes())
        }
    }

    fn doc(v: serde_json::Value) -> Document {
        Document::from_value(v).unwrap()
    }

    #[test]
    fn elements_are_emitted_in_block_order() {
        let d = doc(json!({"blocks": [
            {"type": "header", "data": {"text": "Title", "level": 1}},
            {"type": "table", "data": {"content": [["a", "b"]]}},
            {"type": "delimiter"},
            {"type": "paragraph", "data": {"text": "end"}}
        ]}));
        let mut b = RecordingBuilder::default();
        let stats = convert_with_builder(&d, &ConversionConfig::default(), &mut b);
        assert_eq!(b.calls, ["p:Title", "t:1x2", "p:***", "p:end"]);
        assert_eq!(stats.rendered_blocks, 4);
        assert_eq!(stats.skipped_blocks, 0);
    }

    #[test]
    fn unknown_block_is_skipped_and_later_blocks_render() {
        let d = doc(json!({"blocks": [
            {"type": "embed", "data": {}},
            {"type": "paragraph", "data": {"text": "after"}}
        ]}));
        let out = convert_document(&d, &ConversionConfig::default()).unwrap();
        assert_eq!(out.stats.total_blocks, 2);
        assert_eq!(out.stats.skipped_blocks, 1);
        assert_eq!(
            out.blocks[0].error,
            Some(BlockError::UnknownType {
                index: 0,
                block_type: "embed".into()
            })
        );
        assert!(out.blocks[1].is_rendered());
        assert!(out.into_result().is_err());
    }

    #[test]
    fn empty_table_does_not_crash() {
        let d = doc(json!({"blocks": [
            {"type": "table", "data": {"content": []}},
            {"type": "paragraph", "data": {"text": "ok"}}
        ]}));
        let out = convert_document(&d, &ConversionConfig::default()).unwrap();
        assert_eq!(out.blocks[0].error, Some(BlockError::EmptyTable { index: 0 }));
        assert_eq!(out.stats.rendered_blocks, 1);
    }

    #[test]
    fn duplicates_removed_before_emission() {
        let d = doc(json!({"blocks": [
            {"type": "paragraph", "data": {"text": "go<a href='http://e.com'>go</a> more"}}
        ]}));
        let mut b = RecordingBuilder::default();
        let stats = convert_with_builder(&d, &ConversionConfig::default(), &mut b);
        assert_eq!(stats.duplicate_runs_removed, 1);
        let runs = &b.paragraphs[0].runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].link.as_deref(), Some("http://e.com"));
        assert_eq!(runs[1].text, " more");
    }

    #[test]
    fn empty_document_converts() {
        let out = convert_json("{}", &ConversionConfig::default()).unwrap();
        assert_eq!(out.stats.total_blocks, 0);
        assert!(out.blocks.is_empty());
        assert!(out.bytes.starts_with(b"PK"));
    }

    #[test]
    fn progress_callback_sees_every_block() {
        use crate::progress::ConversionProgressCallback;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[derive(Default)]
        struct Counts {
            rendered: AtomicUsize,
            skipped: AtomicUsize,
        }
        impl ConversionProgressCallback for Counts {
            fn on_block_rendered(&self, _: usize, _: usize, _: &str) {
                self.rendered.fetch_add(1, Ordering::SeqCst);
            }
            fn on_block_skipped(&self, _: usize, _: usize, _: &str) {
                self.skipped.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counts = Arc::new(Counts::default());
        let config = ConversionConfig::builder()
            .progress_callback(counts.clone())
            .build()
            .unwrap();
        let d = doc(json!({"blocks": [{"type": "delimiter"}, {"data": {}}, {"type": "code", "data": {"code": "x"}}]}));
        convert_document(&d, &config).unwrap();
        assert_eq!(counts.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(counts.skipped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn convert_to_file_writes_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.docx");
        let stats = convert_to_file(
            r#"{"blocks": [{"type": "paragraph", "data": {"text": "x"}}]}"#,
            &path,
            &ConversionConfig::default(),
        )
        .unwrap();
        assert_eq!(stats.rendered_blocks, 1);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
