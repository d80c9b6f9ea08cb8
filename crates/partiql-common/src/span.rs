use std::fmt;

use serde::Serialize;

/// Half-open byte range into the query text.
///
/// Everything in the front-end is positioned by byte offset: tokens carry
/// a span, compound keywords carry the span of their whole word sequence,
/// and errors and AST metas derive human-readable line/column pairs from
/// offsets through [`LineIndex`] only when a diagnostic needs them.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "backwards span: {start}..{end}");
        Self { start, end }
    }

    /// The slice of `source` this span covers.
    ///
    /// # Panics
    ///
    /// Panics if the span is out of bounds for `source` or cuts a UTF-8
    /// boundary.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start as usize..self.end as usize]
    }

    /// The smallest span containing both `self` and `other`. Keyword
    /// folding uses this to give a collapsed word sequence one span.
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Byte offsets of line starts, for offset -> line/column lookup.
///
/// Built once per source text by recording the position after every
/// newline; lookups binary-search the table.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let after_newlines = source.match_indices('\n').map(|(at, _)| at as u32 + 1);
        Self {
            line_starts: std::iter::once(0).chain(after_newlines).collect(),
        }
    }

    /// 1-based line and column of a byte offset. Columns count bytes from
    /// the start of the line.
    pub fn position(&self, offset: u32) -> (u32, u32) {
        // An exact hit is the start of a line; otherwise the offset
        // belongs to the line starting just before the insertion point.
        // `line_starts[0]` is 0, so the insertion point is never 0.
        let line = match self.line_starts.binary_search(&offset) {
            Ok(hit) => hit,
            Err(next) => next - 1,
        };
        (line as u32 + 1, offset - self.line_starts[line] + 1)
    }
}
