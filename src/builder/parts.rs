//! Static and near-static WordprocessingML package parts.


pub(crate) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_WP: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub(crate) const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
pub(crate) const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) fn content_types() -> String {
    format!(
        concat!(
            "{decl}\n",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="png" ContentType="image/png"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
            "</Types>"
        ),
        decl = XML_DECL
    )
}

pub(crate) fn package_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_OFFICE_DOCUMENT}" Target="word/document.xml"/></Relationships>"#
    )
}

// ── Styles ───────────────────────────────────────────────────────────────

/// Heading style sizes in half-points, level 1 first.
const HEADING_SZ: [u32; 9] = [32, 26, 24, 22, 22, 22, 22, 22, 22];

pub(crate) fn styles() -> String {
    let mut s = String::with_capacity(4096);
    s.push_str(&format!(
        r#"{XML_DECL}
<w:styles xmlns:w="{NS_W}">"#
    ));
    s.push_str(concat!(
        r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
        r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>"#,
        r#"<w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/>"#,
        r#"</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    ));

    for (i, sz) in HEADING_SZ.iter().enumerate() {
        let level = i + 1;
        s.push_str(&format!(
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/>"#,
                r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="240" w:after="0"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:color w:val="2F5496"/><w:sz w:val="{sz}"/><w:szCs w:val="{sz}"/></w:rPr></w:style>"#
            ),
            level = level,
            outline = i,
            sz = sz
        ));
    }

    s.push_str(concat!(
        r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr>"#,
        r#"<w:rPr><w:sz w:val="56"/><w:szCs w:val="56"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:spacing w:before="200"/><w:ind w:left="864" w:right="864"/></w:pPr>"#,
        r#"<w:rPr><w:i/><w:color w:val="404040"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="IntenseQuote"><w:name w:val="Intense Quote"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:spacing w:before="360" w:after="360"/><w:ind w:left="864" w:right="864"/></w:pPr>"#,
        r#"<w:rPr><w:i/><w:color w:val="4472C4"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:spacing w:after="200" w:line="240" w:lineRule="auto"/></w:pPr>"#,
        r#"<w:rPr><w:i/><w:color w:val="44546A"/><w:sz w:val="18"/><w:szCs w:val="18"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/>"#,
        r#"<w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:contextualSpacing/></w:pPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/>"#,
        r#"<w:pPr><w:contextualSpacing/></w:pPr></w:style>"#,
        r#"</w:styles>"#,
    ));
    s
}

// ── Numbering ────────────────────────────────────────────────────────────

/// `numId` used by every bulleted list.
pub(crate) const BULLET_NUM_ID: u32 = 1;

/// `numId` for an ordered-list instance. Instances start at 1.
pub(crate) fn ordered_num_id(instance: u32) -> u32 {
    BULLET_NUM_ID + instance
}

const BULLETS: [&str; 3] = ["•", "◦", "▪"];

fn abstract_num(id: u32, ordered: bool) -> String {
    let mut s = format!(
        r#"<w:abstractNum w:abstractNumId="{id}"><w:multiLevelType w:val="hybridMultilevel"/>"#
    );
    for lvl in 0..9u32 {
        let (fmt, text) = if ordered {
            ("decimal", format!("%{}.", lvl + 1))
        } else {
            ("bullet", BULLETS[lvl as usize % BULLETS.len()].to_string())
        };
        s.push_str(&format!(
            concat!(
                r#"<w:lvl w:ilvl="{lvl}"><w:start w:val="1"/><w:numFmt w:val="{fmt}"/>"#,
                r#"<w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/>"#,
                r#"<w:pPr><w:ind w:left="{left}" w:hanging="360"/></w:pPr></w:lvl>"#
            ),
            lvl = lvl,
            fmt = fmt,
            text = text,
            left = 720 * (lvl + 1)
        ));
    }
    s.push_str("</w:abstractNum>");
    s
}

/// Numbering part: one bullet definition plus one restartable decimal
/// instance per ordered list.
pub(crate) fn numbering(ordered_instances: impl IntoIterator<Item = u32>) -> String {
    let mut s = format!(
        r#"{XML_DECL}
<w:numbering xmlns:w="{NS_W}">"#
    );
    s.push_str(&abstract_num(0, false));
    s.push_str(&abstract_num(1, true));
    s.push_str(&format!(
        r#"<w:num w:numId="{BULLET_NUM_ID}"><w:abstractNumId w:val="0"/></w:num>"#
    ));
    for instance in ordered_instances {
        s.push_str(&format!(
            concat!(
                r#"<w:num w:numId="{id}"><w:abstractNumId w:val="1"/>"#,
                r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride></w:num>"#
            ),
            id = ordered_num_id(instance)
        ));
    }
    s.push_str("</w:numbering>");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_define_every_paragraph_style() {
        let s = styles();
        for id in [
            "Normal",
            "Heading1",
            "Heading9",
            "Title",
            "Quote",
            "IntenseQuote",
            "Caption",
            "ListBullet",
            "ListNumber",
        ] {
            assert!(s.contains(&format!(r#"w:styleId="{id}""#)), "missing {id}");
        }
    }

    #[test]
    fn quote_styles_leave_alignment_to_paragraphs() {
        assert!(!styles().contains("<w:jc "));
    }

    #[test]
    fn numbering_has_instance_per_ordered_list() {
        let n = numbering([1, 2]);
        assert!(n.contains(r#"<w:num w:numId="1">"#));
        assert!(n.contains(r#"<w:num w:numId="2">"#));
        assert!(n.contains(r#"<w:num w:numId="3">"#));
        assert_eq!(n.matches("startOverride").count(), 2);
    }

    #[test]
    fn content_types_cover_parts() {
        let ct = content_types();
        assert!(ct.contains("/word/document.xml"));
        assert!(ct.contains(r#"Extension="png""#));
    }
}
