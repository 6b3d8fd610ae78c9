//! Configuration types for JSON-to-DOCX conversion.
//!
//! All tunable behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Font sizes, colours and box fills are
//! fixed design constants (see [`crate::pipeline::render::style`]) and are
//! deliberately absent here.

use crate::error::Json2DocxError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a JSON-to-DOCX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_json2docx::{ConversionConfig, InlineMode};
///
/// let config = ConversionConfig::builder()
///     .image_box(5.5, 7.0)
///     .inline_mode(InlineMode::Nested)
///     .build()
///     .unwrap();
/// assert_eq!(config.image_box.width_in, 5.5);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Largest area an embedded image may occupy. Default: 6 × 8 inches.
    ///
    /// Letter paper with 1-inch margins leaves 6.5 × 9 inches of text area;
    /// the default keeps a little slack on both axes. Images smaller than the
    /// box are embedded at their native size.
    pub image_box: BoundingBox,

    /// Resolution assumed for images that do not declare one. Range: 1–2400. Default: 96.
    pub fallback_dpi: f64,

    /// How overlapping inline tags are interpreted. Default: [`InlineMode::LastTagWins`].
    pub inline_mode: InlineMode,

    /// Render the first table row in bold when a table block sets
    /// `withHeadings`. Default: true.
    pub table_headings: bool,

    /// Optional per-block progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            image_box: BoundingBox::default(),
            fallback_dpi: 96.0,
            inline_mode: InlineMode::default(),
            table_headings: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("image_box", &self.image_box)
            .field("fallback_dpi", &self.fallback_dpi)
            .field("inline_mode", &self.inline_mode)
            .field("table_headings", &self.table_headings)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn image_box(mut self, width_in: f64, height_in: f64) -> Self {
        self.config.image_box = BoundingBox::new(width_in, height_in);
        self
    }

    pub fn fallback_dpi(mut self, dpi: f64) -> Self {
        self.config.fallback_dpi = dpi;
        self
    }

    pub fn inline_mode(mut self, mode: InlineMode) -> Self {
        self.config.inline_mode = mode;
        self
    }

    pub fn table_headings(mut self, v: bool) -> Self {
        self.config.table_headings = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Json2DocxError> {
        let c = &self.config;
        let b = &c.image_box;
        if !(b.width_in.is_finite() && b.height_in.is_finite())
            || b.width_in <= 0.0
            || b.height_in <= 0.0
        {
            return Err(Json2DocxError::InvalidConfig(format!(
                "Image box must be positive, got {}×{} in",
                b.width_in, b.height_in
            )));
        }
        if !c.fallback_dpi.is_finite() || c.fallback_dpi < 1.0 || c.fallback_dpi > 2400.0 {
            return Err(Json2DocxError::InvalidConfig(format!(
                "Fallback DPI must be 1–2400, got {}",
                c.fallback_dpi
            )));
        }
        Ok(self.config)
    }
}

// ── Value types ──────────────────────────────────────────────────────────

/// Maximum width/height an image may occupy before it is scaled down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width_in: f64,
    pub height_in: f64,
}

impl BoundingBox {
    pub fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(6.0, 8.0)
    }
}

/// Interpretation of overlapping inline tags.
///
/// | Mode | `<b><i>x</i> y</b>` |
/// |------|---------------------|
/// | `LastTagWins` | `x` italic, ` y` plain |
/// | `Nested` | `x` bold + italic, ` y` bold |
///
/// `LastTagWins` reproduces the output of existing documents exactly: only
/// one tag is tracked at a time and any closing tag resets it. `Nested`
/// tracks a stack of open tags and combines their styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InlineMode {
    /// Single current-tag slot; the most recently opened tag wins. (default)
    #[default]
    LastTagWins,
    /// Styles accumulate across every open tag scope.
    Nested,
}
