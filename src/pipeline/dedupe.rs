//! Hyperlink deduplication over a finished document.
//!
//! Documents produced by older link-insertion code carry the anchor text twice
//! in the same paragraph: once as a hyperlink and once as a plain run. This
//! pass removes the plain copy. It works paragraph by paragraph, so a plain
//! run is only removed when a hyperlink in the *same* paragraph has the same
//! trimmed text.

use crate::model::{RenderedDocument, RenderedParagraph};
use std::collections::HashSet;
use tracing::debug;

/// Remove duplicate plain runs from every paragraph, table cells included.
///
/// Returns the number of runs removed. Running it twice removes nothing the
/// second time.
pub fn dedupe_document(doc: &mut RenderedDocument) -> usize {
    let removed: usize = doc.paragraphs_mut().map(dedupe_paragraph).sum();
    if removed > 0 {
        debug!("Removed {} duplicate link-text runs", removed);
    }
    removed
}

/// Remove plain runs whose trimmed text matches a hyperlink run's trimmed text.
pub fn dedupe_paragraph(paragraph: &mut RenderedParagraph) -> usize {
    let link_texts: HashSet<String> = paragraph
        .runs
        .iter()
        .filter(|r| r.is_link())
        .map(|r| r.text.trim().to_string())
        .collect();
    if link_texts.is_empty() {
        return 0;
    }

    let before = paragraph.runs.len();
    paragraph
        .runs
        .retain(|r| r.is_link() || !link_texts.contains(r.text.trim()));
    before - paragraph.runs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InlineMode;
    use crate::model::{RenderedElement, RenderedTable, StyledRun};
    use crate::pipeline::markup::{self, link_run};

    fn para(runs: Vec<StyledRun>) -> RenderedParagraph {
        RenderedParagraph::default().with_runs(runs)
    }

    #[test]
    fn removes_plain_copy_of_link_text() {
        let mut p = para(vec![
            StyledRun::plain("go"),
            link_run("go", "http://e.com"),
            StyledRun::plain(" more"),
        ]);
        assert_eq!(dedupe_paragraph(&mut p), 1);
        assert_eq!(p.runs.len(), 2);
        assert!(p.runs[0].is_link());
        assert_eq!(p.runs[1].text, " more");
    }

    #[test]
    fn parsed_link_survives_with_trailing_text() {
        let mut p = para(markup::parse(
            "<a href='http://e.com'>go</a> more",
            InlineMode::LastTagWins,
        ));
        p.runs.insert(0, StyledRun::plain(" go "));
        dedupe_paragraph(&mut p);
        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[0].link.as_deref(), Some("http://e.com"));
        assert_eq!(p.runs[1].text, " more");
    }

    #[test]
    fn matching_is_per_paragraph() {
        let mut doc = RenderedDocument::new();
        doc.extend([
            RenderedElement::Paragraph(para(vec![link_run("go", "u")])),
            RenderedElement::Paragraph(para(vec![StyledRun::plain("go")])),
        ]);
        assert_eq!(dedupe_document(&mut doc), 0);
    }

    #[test]
    fn table_cells_are_deduplicated() {
        let mut doc = RenderedDocument::new();
        doc.extend([RenderedElement::Table(RenderedTable {
            rows: vec![vec![para(vec![StyledRun::plain("x"), link_run("x", "u")])]],
        })]);
        assert_eq!(dedupe_document(&mut doc), 1);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let mut doc = RenderedDocument::new();
        doc.extend([RenderedElement::Paragraph(para(vec![
            StyledRun::plain("a"),
            link_run("a", "u"),
            StyledRun::plain("a "),
            StyledRun::plain("b"),
        ]))]);
        assert_eq!(dedupe_document(&mut doc), 2);
        let once = doc.clone();
        assert_eq!(dedupe_document(&mut doc), 0);
        assert_eq!(doc, once);
    }

    #[test]
    fn links_are_never_removed() {
        let mut p = para(vec![link_run("a", "u1"), link_run("a", "u2")]);
        assert_eq!(dedupe_paragraph(&mut p), 0);
        assert_eq!(p.runs.len(), 2);
    }
}
