//! Pipeline stages for JSON-to-DOCX conversion.
//!
//! Each submodule implements exactly one transformation step and is tested
//! on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ dedupe ──▶ builder
//! (JSON)     │  ▲       (links)    (DOCX)
//!            ▼  │
//!     markup / image_fit / encode
//! ```
//!
//! 1. [`input`]     — inline JSON, stdin or file path → [`crate::Document`]
//! 2. [`render`]    — one routine per block type; owns the fixed design constants
//! 3. [`markup`]    — inline tags → styled runs (called by `render`)
//! 4. [`image_fit`] — native size and resolution → display inches
//! 5. [`encode`]    — data URL → bytes → PNG
//! 6. [`dedupe`]    — remove plain runs repeating a hyperlink's text

pub mod dedupe;
pub mod encode;
pub mod image_fit;
pub mod input;
pub mod markup;
pub mod render;
