//! Inline markup parser: restricted HTML-like text → styled runs.
//!
//! Recognised tags are `i`, `b`, `u`, `code`, `mark` and `a href=...`. Tag
//! names are case-insensitive and attribute values may be double-quoted,
//! single-quoted or bare. Anything that is not a well-formed tag is text.
//!
//! How overlapping tags combine depends on [`InlineMode`]:
//!
//! * [`InlineMode::LastTagWins`] keeps a single current-tag slot. Every start
//!   tag replaces it and every end tag clears it, so `<b><i>x</i> y</b>` yields
//!   an italic `x` followed by a plain ` y`.
//! * [`InlineMode::Nested`] keeps a stack of open tags and combines their
//!   effects; an end tag closes the innermost matching tag and is ignored when
//!   nothing matches.
//!
//! Parser state lives on the stack of [`parse`]; nothing is shared between
//! calls.

use crate::config::InlineMode;
use crate::model::{Rgb, StyledRun};
use crate::pipeline::render::style;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|</(?P<end>[A-Za-z][A-Za-z0-9-]*)\s*>|<(?P<start>[A-Za-z][A-Za-z0-9-]*)(?P<attrs>(?:\s+[^\s/>"'=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(?P<close>/)?>"#,
    )
    .unwrap()
});

static RE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<name>[^\s/>"'=]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'=<>`]+)))?"#)
        .unwrap()
});

static RE_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#(?P<dec>[0-9]{1,7})|#[xX](?P<hex>[0-9A-Fa-f]{1,6})|(?P<name>[A-Za-z][A-Za-z0-9]{1,31}));")
        .unwrap()
});

// ── Tokens ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Start {
        name: String,
        href: Option<String>,
        self_closing: bool,
    },
    End(String),
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in RE_TAG.captures_iter(input) {
        let Some(m) = caps.get(0) else { continue };
        if m.start() > last {
            tokens.push(Token::Text(decode_entities(&input[last..m.start()])));
        }
        last = m.end();

        if let Some(end) = caps.name("end") {
            tokens.push(Token::End(end.as_str().to_ascii_lowercase()));
        } else if let Some(start) = caps.name("start") {
            let attrs = caps.name("attrs").map_or("", |a| a.as_str());
            tokens.push(Token::Start {
                name: start.as_str().to_ascii_lowercase(),
                href: find_attr(attrs, "href"),
                self_closing: caps.name("close").is_some(),
            });
        }
        // Comments produce nothing.
    }

    if last < input.len() {
        tokens.push(Token::Text(decode_entities(&input[last..])));
    }
    tokens
}

fn find_attr(attrs: &str, wanted: &str) -> Option<String> {
    RE_ATTR.captures_iter(attrs).find_map(|caps| {
        let name = caps.name("name")?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        let value = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("bare"))
            .map_or("", |v| v.as_str());
        Some(decode_entities(value))
    })
}

// ── Character references ─────────────────────────────────────────────────

/// Decode numeric character references and a small set of named entities.
/// Unknown names are left verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let numeric = caps
                .name("dec")
                .and_then(|d| d.as_str().parse::<u32>().ok())
                .or_else(|| {
                    caps.name("hex")
                        .and_then(|h| u32::from_str_radix(h.as_str(), 16).ok())
                });
            if let Some(cp) = numeric {
                return match char::from_u32(cp) {
                    Some(c) if cp != 0 => c.to_string(),
                    _ => '\u{FFFD}'.to_string(),
                };
            }
            caps.name("name")
                .and_then(|n| named_entity(n.as_str()))
                .map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "hellip" => "…",
        "mdash" => "—",
        "ndash" => "–",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "laquo" => "«",
        "raquo" => "»",
        "bull" => "•",
        "middot" => "·",
        "deg" => "°",
        "times" => "×",
        "euro" => "€",
        _ => return None,
    })
}

// ── Styling ──────────────────────────────────────────────────────────────

/// A hyperlink run with the fixed link styling.
pub fn link_run(text: impl Into<String>, href: impl Into<String>) -> StyledRun {
    StyledRun {
        text: text.into(),
        bold: true,
        underline: true,
        link: Some(href.into()),
        font_size: Some(style::LINK_PT),
        color: Some(Rgb::BLUE),
        ..StyledRun::default()
    }
}

/// Apply one tag's effect to a non-link run.
fn apply_tag(run: &mut StyledRun, tag: &str) {
    match tag {
        "i" => run.italic = true,
        "b" => run.bold = true,
        "u" => run.underline = true,
        "code" => {
            run.is_code = true;
            run.color = Some(style::CODE_INK);
        }
        "mark" => run.is_highlighted = true,
        _ => {}
    }
}

/// Parse inline markup into runs, in input order.
pub fn parse(text: &str, mode: InlineMode) -> Vec<StyledRun> {
    match mode {
        InlineMode::LastTagWins => parse_last_tag_wins(text),
        InlineMode::Nested => parse_nested(text),
    }
}

fn parse_last_tag_wins(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    // (tag name, href)
    let mut current: Option<(String, Option<String>)> = None;

    for token in tokenize(text) {
        match token {
            Token::Start {
                name,
                href,
                self_closing,
            } => {
                current = if self_closing { None } else { Some((name, href)) };
            }
            Token::End(_) => current = None,
            Token::Text(data) if data.is_empty() => {}
            Token::Text(data) => match &current {
                Some((name, Some(href))) if name == "a" => {
                    runs.push(link_run(data, href.clone()));
                    // Text after the link text is plain even before `</a>`.
                    current = None;
                }
                Some((name, _)) => {
                    let mut run = StyledRun::plain(data);
                    apply_tag(&mut run, name);
                    runs.push(run);
                }
                None => runs.push(StyledRun::plain(data)),
            },
        }
    }
    runs
}

struct OpenTag {
    name: String,
    href: Option<String>,
}

fn parse_nested(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut open: Vec<OpenTag> = Vec::new();

    for token in tokenize(text) {
        match token {
            Token::Start {
                name,
                href,
                self_closing,
            } => {
                if !self_closing && !is_void(&name) {
                    open.push(OpenTag { name, href });
                }
            }
            Token::End(name) => {
                if let Some(pos) = open.iter().rposition(|t| t.name == name) {
                    open.truncate(pos);
                }
            }
            Token::Text(data) if data.is_empty() => {}
            Token::Text(data) => {
                let href = open
                    .iter()
                    .rev()
                    .find(|t| t.name == "a" && t.href.is_some())
                    .and_then(|t| t.href.clone());
                match href {
                    Some(href) => runs.push(link_run(data, href)),
                    None => {
                        let mut run = StyledRun::plain(data);
                        for tag in &open {
                            apply_tag(&mut run, &tag.name);
                        }
                        runs.push(run);
                    }
                }
            }
        }
    }
    runs
}

fn is_void(name: &str) -> bool {
    matches!(name, "br" | "hr" | "img" | "wbr")
}
