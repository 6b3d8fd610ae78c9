//! # edgequake-json2docx
//!
//! Render block-structured JSON documents (the format produced by block
//! editors such as Editor.js) to DOCX.
//!
//! ## Pipeline Overview
//!
//! ```text
//! JSON
//!  │
//!  ├─ 1. Input    inline JSON, stdin or a file path → Document
//!  ├─ 2. Parse    each raw block → typed Block (bad blocks are skipped, not fatal)
//!  ├─ 3. Render   blocks → paragraphs / tables / pictures, inline markup → runs
//!  ├─ 4. Dedupe   drop plain runs that repeat a hyperlink's text
//!  └─ 5. Package  DocumentBuilder → WordprocessingML parts in a ZIP container
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_json2docx::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert_to_file("note.json", "note.docx", &config)?;
//!     eprintln!("{}/{} blocks rendered", stats.rendered_blocks, stats.total_blocks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `json2docx` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-json2docx = { version = "0.1", default-features = false }
//! ```
//!
//! ## Supported Blocks
//!
//! | Type | Output |
//! |------|--------|
//! | `header` | Heading 1–9, black, 32 pt at level 1 |
//! | `paragraph` | Normal paragraph with inline markup |
//! | `list` | Bulleted or numbered items, nested items indented |
//! | `checklist` | `✅` / `⬜` followed by the item text |
//! | `quote` | Boxed intense quote, optional caption |
//! | `warning` | Boxed `⚠️ title: message` on a yellow fill |
//! | `code` | Verbatim text, 16 pt |
//! | `delimiter` | Centred `***` |
//! | `table` | Bordered grid, optional bold heading row |
//! | `image` | Embedded `data:image/...` picture, scaled to fit 6 × 8 in |
//!
//! Inline markup recognises `<b>`, `<i>`, `<u>`, `<code>`, `<mark>` and
//! `<a href>`; see [`InlineMode`] for how overlapping tags combine.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod builder;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use builder::{DocumentBuilder, DocxBuilder};
pub use config::{BoundingBox, ConversionConfig, ConversionConfigBuilder, InlineMode};
pub use convert::{convert, convert_document, convert_json, convert_to_file, convert_with_builder};
pub use document::{Block, BlockKind, Document, RawBlock};
pub use error::{BlockError, Json2DocxError};
pub use output::{BlockOutcome, ConversionOutput, ConversionStats};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
