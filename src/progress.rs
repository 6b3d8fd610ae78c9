//! Progress-callback trait for per-block conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the assembler renders each block. The CLI uses it to report
//! skipped blocks on stderr while the document itself goes to stdout.
//!
//! # Example
//!
//! ```rust
//! use edgequake_json2docx::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SkipCounter {
//!     skipped: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for SkipCounter {
//!     fn on_block_skipped(&self, index: usize, total_blocks: usize, error: &str) {
//!         self.skipped.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("block {}/{} skipped: {}", index + 1, total_blocks, error);
//!     }
//! }
//!
//! let counter = Arc::new(SkipCounter { skipped: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the assembler as it processes each block.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Conversion is single-threaded, but the trait is
/// `Send + Sync` so a configured [`crate::ConversionConfig`] can be shared.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first block is rendered.
    fn on_conversion_start(&self, total_blocks: usize) {
        let _ = total_blocks;
    }

    /// Called when a block rendered successfully.
    ///
    /// # Arguments
    /// * `index`        — zero-based block position
    /// * `total_blocks` — number of blocks in the document
    /// * `block_type`   — the block's declared type
    fn on_block_rendered(&self, index: usize, total_blocks: usize, block_type: &str) {
        let _ = (index, total_blocks, block_type);
    }

    /// Called when a block was skipped.
    ///
    /// # Arguments
    /// * `index`        — zero-based block position
    /// * `total_blocks` — number of blocks in the document
    /// * `error`        — human-readable reason
    fn on_block_skipped(&self, index: usize, total_blocks: usize, error: &str) {
        let _ = (index, total_blocks, error);
    }

    /// Called once after every block has been attempted.
    fn on_conversion_complete(&self, total_blocks: usize, rendered_count: usize) {
        let _ = (total_blocks, rendered_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        rendered: AtomicUsize,
        skipped: AtomicUsize,
        started_total: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_blocks: usize) {
            self.started_total.store(total_blocks, Ordering::SeqCst);
        }

        fn on_block_rendered(&self, _index: usize, _total: usize, _block_type: &str) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }

        fn on_block_skipped(&self, _index: usize, _total: usize, _error: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total_blocks: usize, rendered_count: usize) {
            self.completed_total.store(rendered_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_block_rendered(0, 5, "paragraph");
        cb.on_block_skipped(1, 5, "unknown block type");
        cb.on_conversion_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(3);
        tracker.on_block_rendered(0, 3, "header");
        tracker.on_block_rendered(1, 3, "paragraph");
        tracker.on_block_skipped(2, 3, "bad image");
        tracker.on_conversion_complete(3, 2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }
}
