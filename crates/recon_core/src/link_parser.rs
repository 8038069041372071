//! Inline wiki-style link parsing for block content.
//!
//! Block text may reference other documents by title using `[[Title]]`. This
//! module splits text into [`Segment`]s so a view can render plain runs and
//! clickable links separately.
//!
//! # Rules
//!
//! | Input | Segments |
//! |-------|----------|
//! | `a [[B]] c` | `Text("a ")`, `Link("B")`, `Text(" c")` |
//! | `no brackets` | `Text("no brackets")` |
//! | `[[unterminated` | `Text("[[unterminated")` |
//! | `[[]]` | `Text("[[]]")` (empty titles are not links) |
//! | (empty) | `Text("")` |
//!
//! - The enclosed title is kept verbatim, surrounding whitespace included.
//! - Titles may not contain `[` or `]`; a span closes at the first `]]`.
//! - Scanning is single-pass and left-to-right; spans never overlap.
//! - The sequence is never empty, and concatenating [`Segment::to_source`]
//!   over all segments reproduces the input exactly.

use std::ops::Range;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Opening delimiter of an inline link.
pub const LINK_OPEN: &str = "[[";

/// Closing delimiter of an inline link.
pub const LINK_CLOSE: &str = "]]";

/// A run of block text: either plain text or a link to a document title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text, rendered as-is
    Text(String),
    /// A `[[Title]]` reference; holds the title without brackets
    Link(String),
}

impl Segment {
    /// Whether this segment is a link.
    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link(_))
    }

    /// The text payload (plain text, or the link's target title).
    pub fn content(&self) -> &str {
        match self {
            Segment::Text(text) | Segment::Link(text) => text,
        }
    }

    /// Render the segment back to the source text it was parsed from.
    pub fn to_source(&self) -> String {
        match self {
            Segment::Text(text) => text.clone(),
            Segment::Link(title) => format_link(title),
        }
    }
}

/// Lazy iterator over the segments of a string.
///
/// The scan holds no state besides a position into the borrowed text, so a
/// clone resumes independently and `parse_links(text)` can simply be called
/// again to restart.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
    started: bool,
}

impl<'a> Segments<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            started: false,
        }
    }

    /// Yield segments together with their byte range in the source text.
    pub fn spanned(self) -> Spanned<'a> {
        Spanned { inner: self }
    }

    fn next_spanned(&mut self) -> Option<(Range<usize>, Segment)> {
        let len = self.text.len();

        if self.pos >= len {
            // Empty input still produces one (empty) text segment
            if !self.started {
                self.started = true;
                return Some((0..0, Segment::Text(String::new())));
            }
            return None;
        }
        self.started = true;

        match find_link(self.text, self.pos) {
            Some(span) if span.start > self.pos => {
                let range = self.pos..span.start;
                self.pos = span.start;
                Some((range.clone(), Segment::Text(self.text[range].to_string())))
            }
            Some(span) => {
                let title = &self.text[span.start + LINK_OPEN.len()..span.end - LINK_CLOSE.len()];
                self.pos = span.end;
                Some((span, Segment::Link(title.to_string())))
            }
            None => {
                let range = self.pos..len;
                self.pos = len;
                Some((range.clone(), Segment::Text(self.text[range].to_string())))
            }
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_spanned().map(|(_, segment)| segment)
    }
}

/// Iterator adapter yielding `(byte_range, segment)` pairs.
#[derive(Debug, Clone)]
pub struct Spanned<'a> {
    inner: Segments<'a>,
}

impl Iterator for Spanned<'_> {
    type Item = (Range<usize>, Segment);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_spanned()
    }
}

/// Split `text` into text and link segments.
///
/// # Examples
///
/// ```
/// use recon_core::link_parser::{parse_links, Segment};
///
/// let segments: Vec<Segment> = parse_links("a [[B]] c").collect();
/// assert_eq!(
///     segments,
///     vec![
///         Segment::Text("a ".to_string()),
///         Segment::Link("B".to_string()),
///         Segment::Text(" c".to_string()),
///     ]
/// );
///
/// // Unterminated links are plain text
/// let segments: Vec<Segment> = parse_links("[[unterminated").collect();
/// assert_eq!(segments, vec![Segment::Text("[[unterminated".to_string())]);
/// ```
pub fn parse_links(text: &str) -> Segments<'_> {
    Segments::new(text)
}

/// Distinct link titles in `text`, in order of first appearance.
///
/// ```
/// use recon_core::link_parser::link_titles;
///
/// assert_eq!(link_titles("[[A]] and [[B]] and [[A]]"), vec!["A", "B"]);
/// ```
pub fn link_titles(text: &str) -> Vec<String> {
    let titles: IndexSet<String> = parse_links(text)
        .filter_map(|segment| match segment {
            Segment::Link(title) => Some(title),
            Segment::Text(_) => None,
        })
        .collect();
    titles.into_iter().collect()
}

/// Whether `text` contains at least one link to `title`.
pub fn references_title(text: &str, title: &str) -> bool {
    parse_links(text).any(|segment| matches!(segment, Segment::Link(ref t) if t == title))
}

/// Format a title as an inline link.
///
/// ```
/// use recon_core::link_parser::format_link;
///
/// assert_eq!(format_link("Reading List"), "[[Reading List]]");
/// ```
pub fn format_link(title: &str) -> String {
    format!("{LINK_OPEN}{title}{LINK_CLOSE}")
}

/// Whether `title` can be the target of a link: non-empty, with no `[` or
/// `]`.
///
/// ```
/// use recon_core::link_parser::is_valid_title;
///
/// assert!(is_valid_title("Plan"));
/// assert!(!is_valid_title(""));
/// assert!(!is_valid_title("a]]b"));
/// ```
pub fn is_valid_title(title: &str) -> bool {
    !title.is_empty() && !title.contains(['[', ']'])
}

/// Find the next complete `[[...]]` span at or after byte offset `from`.
fn find_link(text: &str, from: usize) -> Option<Range<usize>> {
    let mut search = from;

    while let Some(rel) = text[search..].find(LINK_OPEN) {
        let start = search + rel;
        let title_start = start + LINK_OPEN.len();
        let title_len = text[title_start..]
            .find(['[', ']'])
            .unwrap_or(text.len() - title_start);
        let title_end = title_start + title_len;

        if title_len > 0 && text[title_end..].starts_with(LINK_CLOSE) {
            return Some(start..title_end + LINK_CLOSE.len());
        }

        // `[` is one byte, so this stays on a char boundary
        search = start + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(text: &str) -> Vec<Segment> {
        parse_links(text).collect()
    }

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    fn link(s: &str) -> Segment {
        Segment::Link(s.to_string())
    }

    #[test]
    fn test_text_link_text() {
        assert_eq!(segments("a [[B]] c"), vec![text("a "), link("B"), text(" c")]);
    }

    #[test]
    fn test_no_brackets() {
        assert_eq!(segments("no brackets"), vec![text("no brackets")]);
    }

    #[test]
    fn test_unterminated_is_text() {
        assert_eq!(segments("[[unterminated"), vec![text("[[unterminated")]);
    }

    #[test]
    fn test_empty_input_yields_one_empty_segment() {
        assert_eq!(segments(""), vec![text("")]);
    }

    #[test]
    fn test_link_only() {
        assert_eq!(segments("[[Home]]"), vec![link("Home")]);
    }

    #[test]
    fn test_adjacent_links() {
        assert_eq!(
            segments("[[A]][[B]] [[C]]"),
            vec![link("A"), link("B"), text(" "), link("C")]
        );
    }

    #[test]
    fn test_title_whitespace_preserved() {
        assert_eq!(segments("[[ spaced ]]"), vec![link(" spaced ")]);
    }

    #[test]
    fn test_empty_title_is_text() {
        assert_eq!(segments("x [[]] y"), vec![text("x [[]] y")]);
    }

    #[test]
    fn test_nested_opener_links_innermost() {
        assert_eq!(segments("[[[a]]"), vec![text("["), link("a")]);
    }

    #[test]
    fn test_stray_close_inside_title_is_text() {
        assert_eq!(segments("[[a]b]] [[c]]"), vec![text("[[a]b]] "), link("c")]);
    }

    #[test]
    fn test_closes_at_first_close() {
        assert_eq!(segments("[[a]]]]"), vec![link("a"), text("]]")]);
    }

    #[test]
    fn test_unterminated_then_link() {
        assert_eq!(segments("[[x [[y]]"), vec![text("[[x "), link("y")]);
    }

    #[test]
    fn test_valid_titles_match_parsed_links() {
        for title in ["Plan", " spaced ", "日本語"] {
            assert!(is_valid_title(title));
            assert_eq!(segments(&format_link(title)), vec![link(title)]);
        }
        for title in ["", "a[b", "a]b", "[[x"] {
            assert!(!is_valid_title(title));
        }
    }

    #[test]
    fn test_unicode_titles() {
        assert_eq!(
            segments("café [[Ünïcödé]] ✓"),
            vec![text("café "), link("Ünïcödé"), text(" ✓")]
        );
    }

    #[test]
    fn test_source_reconstruction() {
        let inputs = [
            "a [[B]] c",
            "[[unterminated",
            "[[[a]]",
            "x [[]] y [[z]]]]",
            "",
            "café [[Ünïcödé]] ✓",
        ];
        for input in inputs {
            let rebuilt: String = parse_links(input).map(|s| s.to_source()).collect();
            assert_eq!(rebuilt, input);
        }
    }

    #[test]
    fn test_spanned_ranges_index_source() {
        let input = "a [[B]] c";
        let spans: Vec<_> = parse_links(input).spanned().collect();
        assert_eq!(spans[0].0, 0..2);
        assert_eq!(&input[spans[1].0.clone()], "[[B]]");
        assert_eq!(&input[spans[2].0.clone()], " c");
    }

    #[test]
    fn test_restartable() {
        let iter = parse_links("[[A]] b");
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_link_titles_dedup_in_order() {
        assert_eq!(link_titles("[[B]] [[A]] [[B]]"), vec!["B", "A"]);
        assert!(link_titles("plain").is_empty());
    }

    #[test]
    fn test_references_title() {
        assert!(references_title("see [[Plan]]", "Plan"));
        assert!(!references_title("see [[Plans]]", "Plan"));
        assert!(!references_title("see Plan", "Plan"));
    }

    #[test]
    fn test_segment_serializes_tagged() {
        let json = serde_json::to_string(&link("B")).unwrap();
        assert_eq!(json, r#"{"type":"link","content":"B"}"#);
    }
}
