//! DOCX writer: rendered elements → WordprocessingML parts in a ZIP package.
//!
//! The body is accumulated as XML text while elements are added. Hyperlink
//! targets and images become relationships of the main document part; images
//! are stored under `word/media/`. [`DocxBuilder::save`] writes the package.

use super::parts::{self, NS_A, NS_PIC, NS_R, NS_W, NS_WP, REL_HYPERLINK, REL_IMAGE};
use super::DocumentBuilder;
use crate::error::Json2DocxError;
use crate::model::{
    Alignment, BoxStyle, RenderedParagraph, RenderedPicture, RenderedTable, StyledRun,
};
use quick_xml::escape::escape;
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Relationship ids 1 and 2 are reserved for styles and numbering.
const FIRST_DYNAMIC_REL: u32 = 3;

const EMU_PER_INCH: f64 = 914_400.0;

/// Text width of a Letter page with 1-inch margins, in twentieths of a point.
const TEXT_WIDTH_TWIPS: u32 = 9360;

#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

/// Builds a `.docx` package in memory.
#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
    relationships: Vec<Relationship>,
    hyperlink_ids: HashMap<String, String>,
    media: Vec<Vec<u8>>,
    ordered_instances: BTreeSet<u32>,
    ends_with_table: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images added so far.
    pub fn image_count(&self) -> usize {
        self.media.len()
    }

    fn next_rel_id(&self) -> String {
        format!("rId{}", FIRST_DYNAMIC_REL + self.relationships.len() as u32)
    }

    /// Relationship id for an external hyperlink, reused for repeated targets.
    fn hyperlink_rel(&mut self, url: &str) -> String {
        if let Some(id) = self.hyperlink_ids.get(url) {
            return id.clone();
        }
        let id = self.next_rel_id();
        self.relationships.push(Relationship {
            id: id.clone(),
            kind: REL_HYPERLINK,
            target: url.to_string(),
            external: true,
        });
        self.hyperlink_ids.insert(url.to_string(), id.clone());
        id
    }

    fn image_rel(&mut self, png: &[u8]) -> (String, usize) {
        self.media.push(png.to_vec());
        let n = self.media.len();
        let id = self.next_rel_id();
        self.relationships.push(Relationship {
            id: id.clone(),
            kind: REL_IMAGE,
            target: format!("media/image{n}.png"),
            external: false,
        });
        (id, n)
    }

    // ── Paragraphs and runs ──────────────────────────────────────────────

    fn write_paragraph(&mut self, p: &RenderedParagraph, out: &mut String) {
        out.push_str("<w:p><w:pPr>");
        out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, p.style.style_id()));
        if let Some(marker) = p.list {
            let num_id = if marker.ordered {
                self.ordered_instances.insert(marker.instance);
                parts::ordered_num_id(marker.instance)
            } else {
                parts::BULLET_NUM_ID
            };
            out.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                marker.level, num_id
            ));
        }
        if let Some(boxed) = p.boxed {
            write_box(boxed, out);
        }
        if p.alignment == Alignment::Center {
            out.push_str(r#"<w:jc w:val="center"/>"#);
        }
        out.push_str("</w:pPr>");

        for run in &p.runs {
            match &run.link {
                Some(url) => {
                    let id = self.hyperlink_rel(url);
                    out.push_str(&format!(r#"<w:hyperlink r:id="{id}" w:history="1">"#));
                    write_run(run, out);
                    out.push_str("</w:hyperlink>");
                }
                None => write_run(run, out),
            }
        }
        out.push_str("</w:p>");
    }

    fn write_table(&mut self, t: &RenderedTable, out: &mut String) {
        let cols = t.col_count().max(1);
        let col_w = TEXT_WIDTH_TWIPS / cols as u32;

        out.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#);
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            out.push_str(&format!(
                r#"<w:{side} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
            ));
        }
        out.push_str(r#"</w:tblBorders><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#);
        for _ in 0..cols {
            out.push_str(&format!(r#"<w:gridCol w:w="{col_w}"/>"#));
        }
        out.push_str("</w:tblGrid>");

        for row in &t.rows {
            out.push_str("<w:tr>");
            for cell in row {
                out.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{col_w}" w:type="dxa"/></w:tcPr>"#
                ));
                self.write_paragraph(cell, out);
                out.push_str("</w:tc>");
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");
    }

    fn write_picture(&mut self, pic: &RenderedPicture, out: &mut String) {
        let (rel_id, n) = self.image_rel(&pic.png);
        let cx = (pic.width_in * EMU_PER_INCH).round() as u64;
        let cy = (pic.height_in * EMU_PER_INCH).round() as u64;
        out.push_str(&format!(
            concat!(
                r#"<w:p><w:r><w:drawing>"#,
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{n}" name="Picture {n}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="{ns_pic}"><pic:pic>"#,
                r#"<pic:nvPicPr><pic:cNvPr id="0" name="image{n}.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
                r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
            ),
            cx = cx,
            cy = cy,
            n = n,
            ns_pic = NS_PIC,
            rel_id = rel_id
        ));
    }

    // ── Package parts ────────────────────────────────────────────────────

    fn document_xml(&self) -> String {
        let mut s = String::with_capacity(self.body.len() + 1024);
        s.push_str(&format!(
            r#"{}
<w:document xmlns:w="{NS_W}" xmlns:r="{NS_R}" xmlns:wp="{NS_WP}" xmlns:a="{NS_A}" xmlns:pic="{NS_PIC}"><w:body>"#,
            parts::XML_DECL
        ));
        s.push_str(&self.body);
        if self.ends_with_table {
            // A table may not be the last block-level element before sectPr.
            s.push_str("<w:p/>");
        }
        s.push_str(concat!(
            r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
            r#"</w:sectPr></w:body></w:document>"#
        ));
        s
    }

    fn document_rels(&self) -> String {
        let mut s = format!(
            r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="styles.xml"/><Relationship Id="rId2" Type="{}" Target="numbering.xml"/>"#,
            parts::XML_DECL,
            parts::REL_STYLES,
            parts::REL_NUMBERING
        );
        for rel in &self.relationships {
            s.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                rel.id,
                rel.kind,
                escape(rel.target.as_str()),
                if rel.external {
                    r#" TargetMode="External""#
                } else {
                    ""
                }
            ));
        }
        s.push_str("</Relationships>");
        s
    }
}

impl DocumentBuilder for DocxBuilder {
    fn add_paragraph(&mut self, paragraph: &RenderedParagraph) {
        let mut out = String::new();
        self.write_paragraph(paragraph, &mut out);
        self.body.push_str(&out);
        self.ends_with_table = false;
    }

    fn add_table(&mut self, table: &RenderedTable) {
        let mut out = String::new();
        self.write_table(table, &mut out);
        self.body.push_str(&out);
        self.ends_with_table = true;
    }

    fn add_picture(&mut self, picture: &RenderedPicture) {
        let mut out = String::new();
        self.write_picture(picture, &mut out);
        self.body.push_str(&out);
        self.ends_with_table = false;
    }

    fn save(&mut self) -> Result<Vec<u8>, Json2DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        // PNG data is already compressed.
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        put(&mut zip, "[Content_Types].xml", parts::content_types().as_bytes(), deflated)?;
        put(&mut zip, "_rels/.rels", parts::package_rels().as_bytes(), deflated)?;
        put(&mut zip, "word/document.xml", self.document_xml().as_bytes(), deflated)?;
        put(&mut zip, "word/_rels/document.xml.rels", self.document_rels().as_bytes(), deflated)?;
        put(&mut zip, "word/styles.xml", parts::styles().as_bytes(), deflated)?;
        put(
            &mut zip,
            "word/numbering.xml",
            parts::numbering(self.ordered_instances.iter().copied()).as_bytes(),
            deflated,
        )?;
        for (i, png) in self.media.iter().enumerate() {
            put(&mut zip, &format!("word/media/image{}.png", i + 1), png, stored)?;
        }

        let bytes = zip.finish()?.into_inner();
        debug!(
            "Packaged DOCX: {} bytes, {} relationships, {} images",
            bytes.len(),
            self.relationships.len(),
            self.media.len()
        );
        Ok(bytes)
    }
}

fn put(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<(), Json2DocxError> {
    zip.start_file(name, options)?;
    zip.write_all(data).map_err(|e| Json2DocxError::Packaging {
        detail: format!("{name}: {e}"),
    })
}

fn write_box(boxed: BoxStyle, out: &mut String) {
    out.push_str("<w:pBdr>");
    for side in ["top", "left", "bottom", "right"] {
        out.push_str(&format!(
            r#"<w:{side} w:val="single" w:sz="4" w:space="1" w:color="000000"/>"#
        ));
    }
    out.push_str(&format!(
        r#"</w:pBdr><w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
        boxed.fill.hex()
    ));
}

fn write_run(run: &StyledRun, out: &mut String) {
    out.push_str("<w:r>");
    let mut props = String::new();
    if run.bold {
        props.push_str("<w:b/>");
    }
    if run.italic {
        props.push_str("<w:i/>");
    }
    if let Some(color) = run.color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
    }
    if let Some(pt) = run.font_size {
        let half = pt * 2;
        props.push_str(&format!(r#"<w:sz w:val="{half}"/><w:szCs w:val="{half}"/>"#));
    }
    if run.is_highlighted {
        props.push_str(r#"<w:highlight w:val="yellow"/>"#);
    }
    if run.underline {
        props.push_str(r#"<w:u w:val="single"/>"#);
    }
    if !props.is_empty() {
        out.push_str(&format!("<w:rPr>{props}</w:rPr>"));
    }
    write_run_text(&run.text, out);
    out.push_str("</w:r>");
}

/// Run content: line feeds become breaks, tabs become tab stops, characters
/// that XML 1.0 cannot carry are dropped.
fn write_run_text(text: &str, out: &mut String) {
    let mut chunk = String::new();
    for c in text.chars() {
        match c {
            '\n' => {
                flush_text(&mut chunk, out);
                out.push_str("<w:br/>");
            }
            '\t' => {
                flush_text(&mut chunk, out);
                out.push_str("<w:tab/>");
            }
            c if is_xml_char(c) => chunk.push(c),
            _ => {}
        }
    }
    flush_text(&mut chunk, out);
}

fn flush_text(chunk: &mut String, out: &mut String) {
    if !chunk.is_empty() {
        out.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape(chunk.as_str())
        ));
        chunk.clear();
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
