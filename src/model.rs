//! Rendered model: what the block renderer produces and the document builder
//! consumes.
//!
//! Everything here is plain data. Paragraphs are fully assembled in memory,
//! deduplicated, and only then handed to a [`crate::builder::DocumentBuilder`].

use std::fmt;

/// An sRGB colour, written as six hex digits in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const RED: Rgb = Rgb(0xFF, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xFF);

    /// Upper-case hex without a leading `#`, e.g. `"F4F4F4"`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

// ── Runs ─────────────────────────────────────────────────────────────────

/// A contiguous piece of text with uniform formatting.
///
/// A run with `link` set is a hyperlink and is emitted as a distinct
/// hyperlink element bound to an external relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub is_code: bool,
    pub is_highlighted: bool,
    pub link: Option<String>,
    /// Font size in points; `None` inherits the paragraph style.
    pub font_size: Option<u32>,
    pub color: Option<Rgb>,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_link(&self) -> bool {
        self.link.is_some()
    }

    pub fn with_size(mut self, pt: u32) -> Self {
        self.font_size = Some(pt);
        self
    }
}

// ── Paragraphs ───────────────────────────────────────────────────────────

/// Named paragraph styles; each maps to a style definition in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphStyle {
    #[default]
    Normal,
    /// Heading level, 1 to 9.
    Heading(u8),
    Title,
    Quote,
    IntenseQuote,
    Caption,
    ListBullet,
    ListNumber,
}

impl ParagraphStyle {
    /// The style identifier used in `w:pStyle`.
    pub fn style_id(&self) -> String {
        match self {
            ParagraphStyle::Normal => "Normal".into(),
            ParagraphStyle::Heading(level) => format!("Heading{}", (*level).clamp(1, 9)),
            ParagraphStyle::Title => "Title".into(),
            ParagraphStyle::Quote => "Quote".into(),
            ParagraphStyle::IntenseQuote => "IntenseQuote".into(),
            ParagraphStyle::Caption => "Caption".into(),
            ParagraphStyle::ListBullet => "ListBullet".into(),
            ParagraphStyle::ListNumber => "ListNumber".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
}

/// Four-sided single border plus a background fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    pub fill: Rgb,
}

/// Membership of a paragraph in a bulleted or numbered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    /// Nesting depth, 0 for top-level items.
    pub level: u8,
    /// Distinguishes separate ordered lists so each restarts at 1.
    pub instance: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedParagraph {
    pub runs: Vec<StyledRun>,
    pub style: ParagraphStyle,
    pub alignment: Alignment,
    pub boxed: Option<BoxStyle>,
    pub list: Option<ListMarker>,
}

impl RenderedParagraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn with_runs(mut self, runs: Vec<StyledRun>) -> Self {
        self.runs = runs;
        self
    }

    pub fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    /// Concatenated text of all runs, hyperlinks included.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

// ── Tables and pictures ──────────────────────────────────────────────────

/// A rectangular grid; every row has the same number of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTable {
    pub rows: Vec<Vec<RenderedParagraph>>,
}

impl RenderedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// A PNG image with its display size.
#[derive(Clone, PartialEq)]
pub struct RenderedPicture {
    pub png: Vec<u8>,
    pub width_in: f64,
    pub height_in: f64,
}

impl fmt::Debug for RenderedPicture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedPicture")
            .field("png", &format_args!("<{} bytes>", self.png.len()))
            .field("width_in", &self.width_in)
            .field("height_in", &self.height_in)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedElement {
    Paragraph(RenderedParagraph),
    Table(RenderedTable),
    Picture(RenderedPicture),
}

/// The in-memory document assembled before emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    pub elements: Vec<RenderedElement>,
}

impl RenderedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = RenderedElement>) {
        self.elements.extend(elements);
    }

    /// Every paragraph in document order, including those inside table cells.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut RenderedParagraph> {
        self.elements.iter_mut().flat_map(|el| {
            let items: Box<dyn Iterator<Item = &mut RenderedParagraph>> = match el {
                RenderedElement::Paragraph(p) => Box::new(std::iter::once(p)),
                RenderedElement::Table(t) => Box::new(t.rows.iter_mut().flatten()),
                RenderedElement::Picture(_) => Box::new(std::iter::empty()),
            };
            items
        })
    }
}
