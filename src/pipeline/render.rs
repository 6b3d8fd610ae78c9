//! Block rendering: typed [`Block`] → rendered paragraphs, tables and pictures.
//!
//! Each block type has one routine. Routines never touch the output container;
//! they return [`RenderedElement`]s that the assembler collects, deduplicates
//! and only then emits. A routine that cannot render its block returns a
//! [`BlockError`] and contributes nothing.

use crate::config::ConversionConfig;
use crate::document::{
    Block, ChecklistData, CodeData, HeaderData, ImageData, ListData, ListItem, ListStyle,
    QuoteData, TableData, TextData, WarningData,
};
use crate::error::BlockError;
use crate::model::{
    BoxStyle, ListMarker, ParagraphStyle, RenderedElement, RenderedParagraph, RenderedPicture,
    RenderedTable, StyledRun,
};
use crate::pipeline::{encode, image_fit, markup};
use tracing::debug;

/// Fixed design constants. Sizes are in points.
pub mod style {
    use crate::model::Rgb;

    pub const HEADING_1_PT: u32 = 32;
    pub const MIN_HEADING_PT: u32 = 10;
    pub const BODY_PT: u32 = 18;
    pub const CAPTION_PT: u32 = 14;
    pub const CODE_PT: u32 = 16;
    pub const LINK_PT: u32 = 12;

    pub const HEADING_INK: Rgb = Rgb::BLACK;
    pub const CODE_INK: Rgb = Rgb::RED;
    pub const QUOTE_FILL: Rgb = Rgb(0xF4, 0xF4, 0xF4);
    pub const WARNING_FILL: Rgb = Rgb(0xFF, 0xF2, 0xCC);

    pub const CHECKED_GLYPH: &str = "✅";
    pub const UNCHECKED_GLYPH: &str = "⬜";
    pub const WARNING_GLYPH: &str = "⚠️";
    pub const DELIMITER_TEXT: &str = "***";

    /// Deepest list level the numbering definitions provide.
    pub const MAX_LIST_LEVEL: u8 = 8;

    /// Level 1 is 32 pt; deeper levels follow `20 + (6 - level) * 2`,
    /// never below [`MIN_HEADING_PT`].
    pub fn heading_pt(level: u32) -> u32 {
        if level <= 1 {
            return HEADING_1_PT;
        }
        let pt = 20 + (6 - i64::from(level)) * 2;
        pt.max(i64::from(MIN_HEADING_PT)) as u32
    }
}

/// Render a single block with a fresh list-numbering context.
pub fn render_block(
    block: &Block,
    index: usize,
    config: &ConversionConfig,
) -> Result<Vec<RenderedElement>, BlockError> {
    Renderer::new(config).render(block, index)
}

/// Stateful renderer for one document.
///
/// The only state is the ordered-list counter, which gives each numbered
/// list its own instance so numbering restarts at 1.
pub struct Renderer<'a> {
    config: &'a ConversionConfig,
    next_list_instance: u32,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            next_list_instance: 1,
        }
    }

    fn inline(&self, text: &str) -> Vec<StyledRun> {
        markup::parse(text, self.config.inline_mode)
    }

    /// Dispatch on block type.
    pub fn render(
        &mut self,
        block: &Block,
        index: usize,
    ) -> Result<Vec<RenderedElement>, BlockError> {
        let elements = match block {
            Block::Header(d) => vec![self.header(d)],
            Block::Paragraph(d) => vec![self.paragraph(d)],
            Block::List(d) => self.list(d),
            Block::Checklist(d) => self.checklist(d),
            Block::Quote(d) => self.quote(d),
            Block::Warning(d) => vec![self.warning(d)],
            Block::Code(d) => vec![self.code(d)],
            Block::Delimiter => vec![self.delimiter()],
            Block::Table(d) => vec![self.table(d, index)?],
            Block::Image(d) => self.image(d, index)?,
        };
        debug!(
            "Block {} ({}) → {} elements",
            index,
            block.kind().as_str(),
            elements.len()
        );
        Ok(elements)
    }

    // ── Text blocks ──────────────────────────────────────────────────────

    fn header(&self, data: &HeaderData) -> RenderedElement {
        let level = data.level.max(1);
        let mut runs = self.inline(&data.text);
        for run in runs.iter_mut().filter(|r| !r.is_link()) {
            run.font_size = Some(style::heading_pt(level));
            run.color = Some(style::HEADING_INK);
        }
        let heading = ParagraphStyle::Heading(level.min(9) as u8);
        RenderedElement::Paragraph(RenderedParagraph::new(heading).with_runs(runs))
    }

    fn paragraph(&self, data: &TextData) -> RenderedElement {
        let runs = sized(self.inline(&data.text), style::BODY_PT);
        RenderedElement::Paragraph(RenderedParagraph::new(ParagraphStyle::Normal).with_runs(runs))
    }

    fn list(&mut self, data: &ListData) -> Vec<RenderedElement> {
        let ordered = data.style == ListStyle::Ordered;
        let instance = if ordered {
            let id = self.next_list_instance;
            self.next_list_instance += 1;
            id
        } else {
            0
        };
        let para_style = if ordered {
            ParagraphStyle::ListNumber
        } else {
            ParagraphStyle::ListBullet
        };

        let mut flat = Vec::new();
        flatten_items(&data.items, 0, &mut flat);

        flat.into_iter()
            .map(|(level, text)| {
                let mut p = RenderedParagraph::new(para_style)
                    .with_runs(sized(self.inline(text), style::BODY_PT));
                p.list = Some(ListMarker {
                    ordered,
                    level,
                    instance,
                });
                RenderedElement::Paragraph(p)
            })
            .collect()
    }

    fn checklist(&self, data: &ChecklistData) -> Vec<RenderedElement> {
        data.items
            .iter()
            .map(|item| {
                let glyph = if item.checked {
                    style::CHECKED_GLYPH
                } else {
                    style::UNCHECKED_GLYPH
                };
                let mut runs = vec![StyledRun::plain(format!("{glyph} "))];
                runs.extend(self.inline(&item.text));
                RenderedElement::Paragraph(
                    RenderedParagraph::new(ParagraphStyle::Normal)
                        .with_runs(sized(runs, style::BODY_PT)),
                )
            })
            .collect()
    }

    fn quote(&self, data: &QuoteData) -> Vec<RenderedElement> {
        let runs = sized(self.inline(&format!("“{}”", data.text)), style::BODY_PT);
        let mut quote = RenderedParagraph::new(ParagraphStyle::IntenseQuote).with_runs(runs);
        quote.boxed = Some(BoxStyle {
            fill: style::QUOTE_FILL,
        });
        if data.alignment.eq_ignore_ascii_case("center") {
            quote = quote.centered();
        }

        let mut out = vec![RenderedElement::Paragraph(quote)];
        if !data.caption.is_empty() {
            let runs = sized(self.inline(&format!("- {}", data.caption)), style::CAPTION_PT);
            out.push(RenderedElement::Paragraph(
                RenderedParagraph::new(ParagraphStyle::Caption).with_runs(runs),
            ));
        }
        out
    }

    fn warning(&self, data: &WarningData) -> RenderedElement {
        let text = format!("{} {}: {}", style::WARNING_GLYPH, data.title, data.message);
        let mut p = RenderedParagraph::new(ParagraphStyle::Quote)
            .with_runs(sized(self.inline(&text), style::BODY_PT));
        p.boxed = Some(BoxStyle {
            fill: style::WARNING_FILL,
        });
        RenderedElement::Paragraph(p)
    }

    /// Code is verbatim: no inline parsing, no entity decoding.
    fn code(&self, data: &CodeData) -> RenderedElement {
        let runs = if data.code.is_empty() {
            Vec::new()
        } else {
            vec![StyledRun::plain(data.code.clone()).with_size(style::CODE_PT)]
        };
        RenderedElement::Paragraph(RenderedParagraph::new(ParagraphStyle::Normal).with_runs(runs))
    }

    fn delimiter(&self) -> RenderedElement {
        RenderedElement::Paragraph(
            RenderedParagraph::new(ParagraphStyle::Title)
                .with_runs(self.inline(style::DELIMITER_TEXT))
                .centered(),
        )
    }

    // ── Tables ───────────────────────────────────────────────────────────

    /// Rows are padded with empty cells or truncated to the width of row 0.
    fn table(&self, data: &TableData, index: usize) -> Result<RenderedElement, BlockError> {
        let cols = data.content.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(BlockError::EmptyTable { index });
        }
        let bold_first = data.with_headings && self.config.table_headings;

        let rows = data
            .content
            .iter()
            .enumerate()
            .map(|(r, row)| {
                (0..cols)
                    .map(|c| {
                        let text = row.get(c).map_or("", String::as_str);
                        let mut runs = sized(self.inline(text), style::BODY_PT);
                        if bold_first && r == 0 {
                            for run in runs.iter_mut().filter(|run| !run.is_link()) {
                                run.bold = true;
                            }
                        }
                        RenderedParagraph::new(ParagraphStyle::Normal).with_runs(runs)
                    })
                    .collect()
            })
            .collect();

        Ok(RenderedElement::Table(RenderedTable { rows }))
    }

    // ── Images ───────────────────────────────────────────────────────────

    fn image(&self, data: &ImageData, index: usize) -> Result<Vec<RenderedElement>, BlockError> {
        let src = data.source_url().ok_or_else(|| BlockError::InvalidData {
            index,
            block_type: "image".into(),
            detail: "missing image url".into(),
        })?;
        if !encode::is_data_image(src) {
            return Err(BlockError::UnsupportedImage {
                index,
                source_prefix: encode::source_prefix(src),
            });
        }

        let decode_err = |detail: String| BlockError::ImageDecode { index, detail };
        let bytes = encode::decode_data_url(src).map_err(|e| decode_err(e.to_string()))?;
        let decoded = image_fit::measure(&bytes, self.config.fallback_dpi)
            .map_err(|e| decode_err(e.to_string()))?;
        let png = encode::encode_png(&decoded.image).map_err(|e| decode_err(e.to_string()))?;
        let size = image_fit::fit(decoded.spec, self.config.image_box);
        debug!(
            "Image block {}: {}×{} px → {:.2}×{:.2} in",
            index, decoded.spec.width_px, decoded.spec.height_px, size.width_in, size.height_in
        );

        let mut out = vec![
            RenderedElement::Paragraph(separator().centered()),
            RenderedElement::Picture(RenderedPicture {
                png,
                width_in: size.width_in,
                height_in: size.height_in,
            }),
        ];
        if !data.caption.is_empty() {
            let runs = sized(self.inline(&data.caption), style::CAPTION_PT);
            out.push(RenderedElement::Paragraph(
                RenderedParagraph::new(ParagraphStyle::Caption)
                    .with_runs(runs)
                    .centered(),
            ));
        }
        out.push(RenderedElement::Paragraph(separator()));
        Ok(out)
    }
}

/// A paragraph holding a single line break.
fn separator() -> RenderedParagraph {
    RenderedParagraph::new(ParagraphStyle::Normal).with_runs(vec![StyledRun::plain("\n")])
}

/// Set the font size of every non-link run; link runs keep their own size.
fn sized(mut runs: Vec<StyledRun>, pt: u32) -> Vec<StyledRun> {
    for run in runs.iter_mut().filter(|r| !r.is_link()) {
        run.font_size = Some(pt);
    }
    runs
}

/// Depth-first flattening of nested list items into `(level, text)` pairs.
fn flatten_items<'d>(items: &'d [ListItem], level: u8, out: &mut Vec<(u8, &'d str)>) {
    for item in items {
        out.push((level, item.content()));
        let next = (level + 1).min(style::MAX_LIST_LEVEL);
        flatten_items(item.children(), next, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RawBlock;
    use crate::model::{Alignment, Rgb};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    fn block(v: serde_json::Value) -> Block {
        RawBlock::from_value(v).parse(0).expect("valid block")
    }

    fn render(v: serde_json::Value) -> Result<Vec<RenderedElement>, BlockError> {
        render_block(&block(v), 0, &ConversionConfig::default())
    }

    fn paragraphs(elements: &[RenderedElement]) -> Vec<&RenderedParagraph> {
        elements
            .iter()
            .filter_map(|e| match e {
                RenderedElement::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn png_data_url(w: u32, h: u32) -> String {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(w, h));
        let png = encode::encode_png(&img).unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(png))
    }

    #[test]
    fn heading_sizes() {
        assert_eq!(style::heading_pt(1), 32);
        assert_eq!(style::heading_pt(2), 28);
        assert_eq!(style::heading_pt(6), 20);
        assert!(style::heading_pt(6) < style::heading_pt(2));
        for level in 2..=12 {
            assert!(style::heading_pt(level) < style::heading_pt(1));
            assert!(style::heading_pt(level) >= style::MIN_HEADING_PT);
        }
    }

    #[test]
    fn header_runs_are_black_and_sized() {
        let out = render(json!({"type": "header", "data": {"text": "A <code>b</code>", "level": 2}})).unwrap();
        let p = paragraphs(&out)[0];
        assert_eq!(p.style, ParagraphStyle::Heading(2));
        assert!(p
            .runs
            .iter()
            .all(|r| r.font_size == Some(28) && r.color == Some(Rgb::BLACK)));
    }

    #[test]
    fn deep_header_uses_heading_nine() {
        let out = render(json!({"type": "header", "data": {"text": "x", "level": 14}})).unwrap();
        assert_eq!(paragraphs(&out)[0].style, ParagraphStyle::Heading(9));
    }

    #[test]
    fn header_link_keeps_link_styling() {
        let out = render(json!({"type": "header", "data": {"text": "<a href=\"u\">x</a>", "level": 1}})).unwrap();
        let run = &paragraphs(&out)[0].runs[0];
        assert_eq!(run.font_size, Some(style::LINK_PT));
        assert_eq!(run.color, Some(Rgb::BLUE));
    }

    #[test]
    fn paragraph_is_body_sized() {
        let out = render(json!({"type": "paragraph", "data": {"text": "hello <b>world</b>"}})).unwrap();
        let p = paragraphs(&out)[0];
        assert_eq!(p.style, ParagraphStyle::Normal);
        assert!(p.runs.iter().all(|r| r.font_size == Some(style::BODY_PT)));
    }

    #[test]
    fn checklist_glyphs() {
        let out = render(json!({"type": "checklist", "data": {"items": [
            {"text": "done", "checked": true},
            {"text": "todo", "checked": false},
            {"text": "loose", "checked": "yes"},
            {"text": "bare"}
        ]}}))
        .unwrap();
        let texts: Vec<String> = paragraphs(&out).iter().map(|p| p.text()).collect();
        assert_eq!(texts, ["✅ done", "⬜ todo", "✅ loose", "⬜ bare"]);
    }

    #[test]
    fn ordered_lists_get_distinct_instances() {
        let config = ConversionConfig::default();
        let mut r = Renderer::new(&config);
        let list = block(json!({"type": "list", "data": {"style": "ordered", "items": ["a", "b"]}}));
        let first = r.render(&list, 0).unwrap();
        let second = r.render(&list, 1).unwrap();
        let marker = |e: &RenderedElement| match e {
            RenderedElement::Paragraph(p) => p.list,
            _ => None,
        };
        assert_eq!(first.len(), 2);
        assert_eq!(paragraphs(&first)[0].style, ParagraphStyle::ListNumber);
        assert_ne!(
            marker(&first[0]).map(|m| m.instance),
            marker(&second[0]).map(|m| m.instance)
        );
        assert_eq!(marker(&first[0]), marker(&first[1]));
    }

    #[test]
    fn nested_list_is_flattened_with_levels() {
        let out = render(json!({"type": "list", "data": {"items": [
            {"content": "a", "items": [{"content": "a.1", "items": []}]},
            "b"
        ]}}))
        .unwrap();
        let levels: Vec<(String, u8)> = paragraphs(&out)
            .iter()
            .map(|p| (p.text(), p.list.map_or(99, |m| m.level)))
            .collect();
        assert_eq!(
            levels,
            [("a".into(), 0), ("a.1".into(), 1), ("b".into(), 0)]
        );
        assert_eq!(paragraphs(&out)[0].style, ParagraphStyle::ListBullet);
    }

    #[test]
    fn quote_is_boxed_with_caption() {
        let out = render(json!({"type": "quote", "data": {"text": "wise", "caption": "me", "alignment": "center"}})).unwrap();
        let ps = paragraphs(&out);
        assert_eq!(ps[0].text(), "“wise”");
        assert_eq!(ps[0].style, ParagraphStyle::IntenseQuote);
        assert_eq!(ps[0].boxed.map(|b| b.fill), Some(style::QUOTE_FILL));
        assert_eq!(ps[0].alignment, Alignment::Center);
        assert_eq!(ps[1].text(), "- me");
        assert_eq!(ps[1].style, ParagraphStyle::Caption);
        assert_eq!(ps[1].runs[0].font_size, Some(style::CAPTION_PT));
    }

    #[test]
    fn quote_without_caption_is_single_paragraph() {
        let out = render(json!({"type": "quote", "data": {"text": "x"}})).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn warning_text_and_fill() {
        let out = render(json!({"type": "warning", "data": {"title": "Careful", "message": "<b>hot</b>"}})).unwrap();
        let p = paragraphs(&out)[0];
        assert_eq!(p.text(), "⚠️ Careful: hot");
        assert_eq!(p.style, ParagraphStyle::Quote);
        assert_eq!(p.boxed.map(|b| b.fill), Some(style::WARNING_FILL));
        assert!(p.runs.last().is_some_and(|r| r.bold));
    }

    #[test]
    fn code_is_verbatim() {
        let out = render(json!({"type": "code", "data": {"code": "<b>x</b> &amp;\n\ty"}})).unwrap();
        let p = paragraphs(&out)[0];
        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.runs[0].text, "<b>x</b> &amp;\n\ty");
        assert_eq!(p.runs[0].font_size, Some(style::CODE_PT));
        assert!(!p.runs[0].bold);
    }

    #[test]
    fn delimiter_is_centred_title() {
        let out = render(json!({"type": "delimiter"})).unwrap();
        let p = paragraphs(&out)[0];
        assert_eq!(p.style, ParagraphStyle::Title);
        assert_eq!(p.alignment, Alignment::Center);
        assert_eq!(p.text(), "***");
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = render(json!({"type": "table", "data": {"content": []}})).unwrap_err();
        assert_eq!(err, BlockError::EmptyTable { index: 0 });
        let err = render(json!({"type": "table", "data": {"content": [[]]}})).unwrap_err();
        assert_eq!(err, BlockError::EmptyTable { index: 0 });
    }

    #[test]
    fn ragged_table_is_rectangular() {
        let out = render(json!({"type": "table", "data": {
            "withHeadings": true,
            "content": [["h1", "h2"], ["a"], ["b", "c", "d"]]
        }}))
        .unwrap();
        let RenderedElement::Table(t) = &out[0] else {
            panic!("expected table");
        };
        assert_eq!(t.row_count(), 3);
        assert!(t.rows.iter().all(|r| r.len() == 2));
        assert_eq!(t.rows[1][1].text(), "");
        assert_eq!(t.rows[2][1].text(), "c");
        assert!(t.rows[0][0].runs[0].bold);
        assert!(!t.rows[1][0].runs[0].bold);
    }

    #[test]
    fn table_headings_can_be_disabled() {
        let config = ConversionConfig::builder().table_headings(false).build().unwrap();
        let b = block(json!({"type": "table", "data": {"withHeadings": true, "content": [["h"]]}}));
        let out = render_block(&b, 0, &config).unwrap();
        let RenderedElement::Table(t) = &out[0] else {
            panic!("expected table");
        };
        assert!(!t.rows[0][0].runs[0].bold);
    }

    #[test]
    fn image_layout() {
        let out = render(json!({"type": "image", "data": {"url": png_data_url(1200, 600)}})).unwrap();
        assert_eq!(out.len(), 3);
        let RenderedElement::Picture(pic) = &out[1] else {
            panic!("expected picture");
        };
        assert!((pic.width_in - 6.0).abs() < 1e-9);
        assert!((pic.height_in - 3.0).abs() < 1e-9);
        let ps = paragraphs(&out);
        assert_eq!(ps[0].text(), "\n");
        assert_eq!(ps[0].alignment, Alignment::Center);
        assert_eq!(ps[1].text(), "\n");
    }

    #[test]
    fn image_caption_follows_picture() {
        let out = render(json!({"type": "image", "data": {"file": {"url": png_data_url(10, 10)}, "caption": "Fig"}})).unwrap();
        assert_eq!(out.len(), 4);
        assert!(matches!(&out[2], RenderedElement::Paragraph(p) if p.style == ParagraphStyle::Caption));
    }

    #[test]
    fn remote_image_is_unsupported() {
        let err = render(json!({"type": "image", "data": {"url": "https://e.com/a.png"}})).unwrap_err();
        assert!(matches!(err, BlockError::UnsupportedImage { .. }));
    }

    #[test]
    fn corrupt_image_is_decode_error() {
        let err = render(json!({"type": "image", "data": {"url": "data:image/png;base64,AAAA"}})).unwrap_err();
        assert!(matches!(err, BlockError::ImageDecode { .. }));
    }

    #[test]
    fn image_without_url_is_invalid() {
        let err = render(json!({"type": "image", "data": {}})).unwrap_err();
        assert!(matches!(err, BlockError::InvalidData { .. }));
    }
}
