//! Input model: the block document as delivered by a block editor.
//!
//! Parsing happens in two stages so that one malformed block cannot take the
//! whole document down:
//!
//! 1. [`Document::from_value`] only checks the top-level shape and keeps every
//!    entry of `blocks` as a loosely typed [`RawBlock`].
//! 2. [`RawBlock::parse`] turns one raw block into a typed [`Block`], returning
//!    a [`BlockError`] that the assembler records and skips past.

use crate::error::{BlockError, Json2DocxError};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered sequence of blocks. Consumed once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<RawBlock>,
}

impl Document {
    /// Parse a JSON string into a document.
    pub fn from_json(json: &str) -> Result<Self, Json2DocxError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Json2DocxError::InvalidJson {
                detail: e.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Build a document from an already-parsed JSON value.
    ///
    /// A missing `blocks` key is an empty document; a `blocks` value that is
    /// not an array is fatal.
    pub fn from_value(value: Value) -> Result<Self, Json2DocxError> {
        let Value::Object(mut obj) = value else {
            return Err(Json2DocxError::InvalidDocument {
                detail: "top-level value must be an object".into(),
            });
        };

        let blocks = match obj.remove("blocks") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.into_iter().map(RawBlock::from_value).collect(),
            Some(other) => {
                return Err(Json2DocxError::InvalidDocument {
                    detail: format!("'blocks' must be an array, got {}", json_kind(&other)),
                })
            }
        };

        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One entry of `blocks`, before type-specific validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    /// Editor-assigned identifier, used for log messages only.
    pub id: Option<String>,
    pub block_type: Option<String>,
    pub data: Value,
}

impl RawBlock {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut obj) => Self {
                id: obj.remove("id").and_then(|v| v.as_str().map(str::to_string)),
                block_type: obj
                    .remove("type")
                    .and_then(|v| v.as_str().map(str::to_string)),
                data: obj.remove("data").unwrap_or(Value::Null),
            },
            _ => Self {
                id: None,
                block_type: None,
                data: Value::Null,
            },
        }
    }

    /// The declared type, or `"?"` when absent.
    pub fn type_name(&self) -> &str {
        self.block_type.as_deref().unwrap_or("?")
    }

    /// Validate this block against the shape its type expects.
    ///
    /// `index` is the block's position in the document and is carried into
    /// any [`BlockError`].
    pub fn parse(&self, index: usize) -> Result<Block, BlockError> {
        let type_name = self
            .block_type
            .as_deref()
            .ok_or(BlockError::MissingType { index })?;
        let kind = BlockKind::from_type(type_name).ok_or_else(|| BlockError::UnknownType {
            index,
            block_type: type_name.to_string(),
        })?;

        // A block without `data` behaves like one with an empty object.
        let data = match &self.data {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };

        let invalid = |e: serde_json::Error| BlockError::InvalidData {
            index,
            block_type: type_name.to_string(),
            detail: e.to_string(),
        };

        Ok(match kind {
            BlockKind::Header => Block::Header(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Paragraph => {
                Block::Paragraph(serde_json::from_value(data).map_err(invalid)?)
            }
            BlockKind::List => Block::List(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Checklist => {
                Block::Checklist(serde_json::from_value(data).map_err(invalid)?)
            }
            BlockKind::Quote => Block::Quote(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Warning => Block::Warning(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Code => Block::Code(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Delimiter => Block::Delimiter,
            BlockKind::Table => Block::Table(serde_json::from_value(data).map_err(invalid)?),
            BlockKind::Image => Block::Image(serde_json::from_value(data).map_err(invalid)?),
        })
    }
}

// ── Typed blocks ─────────────────────────────────────────────────────────

/// The block types the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Header,
    Paragraph,
    List,
    Checklist,
    Quote,
    Warning,
    Code,
    Delimiter,
    Table,
    Image,
}

impl BlockKind {
    pub fn from_type(s: &str) -> Option<Self> {
        Some(match s {
            "header" => BlockKind::Header,
            "paragraph" => BlockKind::Paragraph,
            "list" => BlockKind::List,
            "checklist" => BlockKind::Checklist,
            "quote" => BlockKind::Quote,
            "warning" => BlockKind::Warning,
            "code" => BlockKind::Code,
            "delimiter" => BlockKind::Delimiter,
            "table" => BlockKind::Table,
            "image" => BlockKind::Image,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Header => "header",
            BlockKind::Paragraph => "paragraph",
            BlockKind::List => "list",
            BlockKind::Checklist => "checklist",
            BlockKind::Quote => "quote",
            BlockKind::Warning => "warning",
            BlockKind::Code => "code",
            BlockKind::Delimiter => "delimiter",
            BlockKind::Table => "table",
            BlockKind::Image => "image",
        }
    }
}

/// A validated block with type-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Header(HeaderData),
    Paragraph(TextData),
    List(ListData),
    Checklist(ChecklistData),
    Quote(QuoteData),
    Warning(WarningData),
    Code(CodeData),
    Delimiter,
    Table(TableData),
    Image(ImageData),
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Header(_) => BlockKind::Header,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::List(_) => BlockKind::List,
            Block::Checklist(_) => BlockKind::Checklist,
            Block::Quote(_) => BlockKind::Quote,
            Block::Warning(_) => BlockKind::Warning,
            Block::Code(_) => BlockKind::Code,
            Block::Delimiter => BlockKind::Delimiter,
            Block::Table(_) => BlockKind::Table,
            Block::Image(_) => BlockKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeaderData {
    #[serde(default, deserialize_with = "de_text")]
    pub text: String,
    #[serde(default = "default_level", deserialize_with = "de_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextData {
    #[serde(default, deserialize_with = "de_text")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListData {
    #[serde(default, deserialize_with = "de_list_style")]
    pub style: ListStyle,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStyle {
    Ordered,
    /// Also used for missing or unrecognised styles.
    #[default]
    Unordered,
}

/// A list entry: either plain markup or the nested `{content, items}` form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Nested(NestedListItem),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedListItem {
    #[serde(default, alias = "text", deserialize_with = "de_text")]
    pub content: String,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl ListItem {
    pub fn content(&self) -> &str {
        match self {
            ListItem::Text(s) => s,
            ListItem::Nested(n) => &n.content,
        }
    }

    pub fn children(&self) -> &[ListItem] {
        match self {
            ListItem::Text(_) => &[],
            ListItem::Nested(n) => &n.items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChecklistData {
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChecklistItem {
    #[serde(default, deserialize_with = "de_text")]
    pub text: String,
    #[serde(default, deserialize_with = "de_truthy")]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteData {
    #[serde(default, deserialize_with = "de_text")]
    pub text: String,
    #[serde(default, deserialize_with = "de_text")]
    pub caption: String,
    #[serde(default, deserialize_with = "de_text")]
    pub alignment: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WarningData {
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_text")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodeData {
    #[serde(default, deserialize_with = "de_text")]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableData {
    #[serde(default, deserialize_with = "de_table_content")]
    pub content: Vec<Vec<String>>,
    #[serde(default, rename = "withHeadings", deserialize_with = "de_truthy")]
    pub with_headings: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file: Option<ImageFile>,
    #[serde(default, deserialize_with = "de_text")]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageFile {
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageData {
    /// `data.url`, falling back to the uploader form `data.file.url`.
    pub fn source_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or_else(|| self.file.as_ref().and_then(|f| f.url.as_deref()))
    }
}

// ── Lenient field decoding ───────────────────────────────────────────────

/// JSON-loose truthiness used for flags such as `checked`.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    scalar_text(&v)
        .ok_or_else(|| de::Error::custom(format!("expected text, got {}", json_kind(&v))))
}

fn de_truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(d)?))
}

fn de_level<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    // Anything numeric below 1, including negatives, is level 1.
    let from_f64 = |f: f64| f.is_finite().then(|| if f < 1.0 { 1 } else { f as u64 });
    let level = match &v {
        Value::Null => Some(1),
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(from_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_f64))
        }
        _ => None,
    }
    .ok_or_else(|| de::Error::custom(format!("invalid heading level: {v}")))?;
    Ok(level.clamp(1, u32::MAX as u64) as u32)
}

fn de_list_style<'de, D: Deserializer<'de>>(d: D) -> Result<ListStyle, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v.as_str() {
        Some("ordered") => ListStyle::Ordered,
        _ => ListStyle::Unordered,
    })
}

fn de_table_content<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<String>>, D::Error> {
    let v = Value::deserialize(d)?;
    let rows = match v {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => rows,
        other => {
            return Err(de::Error::custom(format!(
                "table content must be an array, got {}",
                json_kind(&other)
            )))
        }
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => cells
                .iter()
                .map(|c| {
                    scalar_text(c).ok_or_else(|| {
                        de::Error::custom(format!("table cell must be text, got {}", json_kind(c)))
                    })
                })
                .collect(),
            other => Err(de::Error::custom(format!(
                "table row must be an array, got {}",
                json_kind(other)
            ))),
        })
        .collect()
}
