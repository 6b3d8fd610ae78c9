//! Output container seam.
//!
//! The assembler only ever talks to a [`DocumentBuilder`]. [`DocxBuilder`]
//! is the shipped implementation; tests use recording builders to observe
//! exactly what the assembler emits.

pub mod docx;
mod parts;

pub use docx::DocxBuilder;

use crate::error::Json2DocxError;
use crate::model::{RenderedElement, RenderedParagraph, RenderedPicture, RenderedTable};

/// Receives finished elements in document order and serialises them.
///
/// Headings are paragraphs whose style is
/// [`crate::model::ParagraphStyle::Heading`]. Runs with a `link` must be
/// written as hyperlink elements bound to an external target.
pub trait DocumentBuilder {
    fn add_paragraph(&mut self, paragraph: &RenderedParagraph);

    /// Rows × cols grid, one paragraph per cell.
    fn add_table(&mut self, table: &RenderedTable);

    fn add_picture(&mut self, picture: &RenderedPicture);

    /// Serialise everything added so far.
    fn save(&mut self) -> Result<Vec<u8>, Json2DocxError>;

    /// Dispatch one element to the matching `add_*` method.
    fn add_element(&mut self, element: &RenderedElement) {
        match element {
            RenderedElement::Paragraph(p) => self.add_paragraph(p),
            RenderedElement::Table(t) => self.add_table(t),
            RenderedElement::Picture(pic) => self.add_picture(pic),
        }
    }
}
