//! Output types returned by the conversion entry points.

use crate::error::{BlockError, Json2DocxError};
use serde::{Deserialize, Serialize};

/// Result of a whole-document conversion.
///
/// Returned as `Ok` even when some blocks were skipped; inspect
/// [`ConversionStats::skipped_blocks`] or call [`ConversionOutput::into_result`]
/// to treat any skipped block as an error.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The serialised DOCX package.
    pub bytes: Vec<u8>,
    /// One entry per input block, in document order.
    pub blocks: Vec<BlockOutcome>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Outcomes of the blocks that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &BlockOutcome> {
        self.blocks.iter().filter(|b| b.error.is_some())
    }

    /// Strict mode: fail with [`Json2DocxError::PartialFailure`] if any block
    /// was skipped.
    pub fn into_result(self) -> Result<Self, Json2DocxError> {
        if self.stats.skipped_blocks > 0 {
            return Err(Json2DocxError::PartialFailure {
                rendered: self.stats.rendered_blocks,
                skipped: self.stats.skipped_blocks,
                total: self.stats.total_blocks,
            });
        }
        Ok(self)
    }
}

/// What happened to a single input block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockOutcome {
    /// Zero-based position in the input document.
    pub index: usize,
    /// Declared type, `"?"` when missing.
    pub block_type: String,
    /// Editor-assigned id, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Number of rendered elements (paragraphs, tables, pictures) emitted.
    pub elements: usize,
    /// Why the block was skipped, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BlockError>,
}

impl BlockOutcome {
    pub fn is_rendered(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_blocks: usize,
    pub rendered_blocks: usize,
    pub skipped_blocks: usize,
    /// Plain runs removed because they repeated a hyperlink's text.
    pub duplicate_runs_removed: usize,
    pub images_embedded: usize,
    pub duration_ms: u64,
}
