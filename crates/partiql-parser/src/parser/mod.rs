//! Event-based parser for PartiQL.
//!
//! The parser consumes a token stream and produces events (Open/Close/
//! Advance) that are later converted into a rowan green tree -- the
//! internal parse tree. This decouples parsing logic from tree
//! construction.
//!
//! # Architecture
//!
//! 1. Parse functions call `open()` to start a node, `advance()` to
//!    consume tokens, and `close()` to finish a node with its actual kind.
//! 2. Events are collected into a flat `Vec<Event>`.
//! 3. `build_tree()` converts events into a rowan `GreenNode`.
//!
//! The `open_before()` method enables wrapping a previously completed node
//! (e.g., turning a parsed term into the left-hand side of a binary
//! expression) using the "forward parent" technique.
//!
//! # Errors
//!
//! Parsing is fail-fast with a first-error-only strategy: the first
//! [`SyntaxError`] is recorded, `has_error()` flips, and every parse
//! function bails as soon as it observes the flag. The parse either yields
//! a tree with no errors or exactly one error.

pub(crate) mod expressions;
pub(crate) mod query;

use partiql_common::error::{ErrorCode, Property, PropertyValue, SyntaxError};
use partiql_common::span::{LineIndex, Span};
use partiql_common::token::Token;
use rustc_hash::FxHashSet;

use crate::syntax_kind::SyntaxKind;

/// A parser event. Events are collected during parsing and later converted
/// into a rowan green tree by [`Parser::build_tree`].
#[derive(Debug)]
enum Event {
    /// Start a new parse-tree node. The `kind` is initially TOMBSTONE and
    /// gets patched by `close()` with the real node kind.
    ///
    /// `forward_parent` is used by `open_before()` to indicate that this
    /// node should be opened before the node at the specified event index.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    /// Finish the current parse-tree node.
    Close,
    /// Consume the current token, advancing the token position.
    Advance,
}

/// An opaque marker for a started but not-yet-closed parse-tree node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// An opaque marker for a completed (opened and closed) parse-tree node.
/// Used by `open_before()` to wrap a previously completed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

/// Event-based parser for PartiQL token streams.
pub(crate) struct Parser<'src> {
    /// All tokens from the lexer (including Eof).
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Collected parser events.
    events: Vec<Event>,
    /// Original source text (for extracting token text via spans).
    source: &'src str,
    /// Line index for positioning errors.
    line_index: LineIndex,
    /// Names treated as aggregate functions (lowercase).
    aggregates: FxHashSet<String>,
    /// The first error encountered, if any.
    errors: Vec<SyntaxError>,
    /// Whether an error has been encountered (first-error-only strategy).
    has_error: bool,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source text.
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str, aggregates: FxHashSet<String>) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            line_index: LineIndex::new(source),
            aggregates,
            errors: Vec::new(),
            has_error: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Returns the SyntaxKind of the current significant token. Trivia
    /// (whitespace, comments) is invisible to lookahead.
    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Returns the SyntaxKind of the Nth significant token ahead.
    /// `nth(0)` is the current token. Returns `EOF` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        let mut pos = self.pos;
        let mut remaining = n;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if kind.is_trivia() {
                pos += 1;
                continue;
            }
            if remaining == 0 {
                return SyntaxKind::from(kind);
            }
            remaining -= 1;
            pos += 1;
        }
        SyntaxKind::EOF
    }

    /// Returns the text of the current significant token.
    pub(crate) fn current_text(&self) -> &str {
        let pos = self.skip_to_significant(self.pos);
        match self.tokens.get(pos) {
            Some(token) => token.span.text(self.source),
            None => "",
        }
    }

    /// Returns the span of the current significant token.
    pub(crate) fn current_span(&self) -> Span {
        let pos = self.skip_to_significant(self.pos);
        match self.tokens.get(pos) {
            Some(token) => token.span,
            None => {
                // Past end: zero-length span at end of source.
                let end = self.source.len() as u32;
                Span::new(end, end)
            }
        }
    }

    /// Position of the next significant token at or after `pos`.
    fn skip_to_significant(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && self.tokens[pos].kind.is_trivia() {
            pos += 1;
        }
        pos
    }

    /// Check if the current token matches the given kind.
    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if the current token matches any of the given kinds.
    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the given lowercase name is in the aggregate-function set.
    pub(crate) fn is_aggregate(&self, name: &str) -> bool {
        self.aggregates.contains(&name.to_ascii_lowercase())
    }

    // ── Node management ────────────────────────────────────────────────

    /// Start a new parse-tree node. Returns a marker that must be passed
    /// to `close()` to finish the node.
    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a new parse-tree node BEFORE a previously completed node.
    ///
    /// This enables wrapping: after parsing a term we may discover it is
    /// the left-hand side of a binary expression or the root of a path.
    /// Instead of physically inserting into the events vec (which would
    /// invalidate indices), the completed node's Open event gets a
    /// `forward_parent` link to the wrapping Open event.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    /// Close a parse-tree node, patching its Open event with the actual
    /// kind. Returns a `MarkClosed` usable with `open_before()`.
    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open { kind: slot_kind, .. } = &mut self.events[m.index] {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────────

    /// Consume the current significant token, first emitting Advance
    /// events for any trivia in front of it so trivia lands in the tree.
    pub(crate) fn advance(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise record `PARSE_EXPECTED_TOKEN_TYPE` and return false.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            let error = self
                .syntax_error(
                    ErrorCode::ParseExpectedTokenType,
                    format!("expected {kind:?}, found `{}`", self.current_text()),
                )
                .with(
                    Property::ExpectedTokenType,
                    PropertyValue::Text(format!("{kind:?}")),
                );
            self.report(error);
            false
        }
    }

    /// Like [`Parser::expect`] but for keywords, recording
    /// `PARSE_EXPECTED_KEYWORD` with the keyword name.
    pub(crate) fn expect_keyword(&mut self, kind: SyntaxKind, keyword: &str) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            let error = self
                .syntax_error(
                    ErrorCode::ParseExpectedKeyword,
                    format!("expected `{}` keyword, found `{}`", keyword.to_uppercase(), self.current_text()),
                )
                .with(Property::Keyword, PropertyValue::Text(keyword.to_string()));
            self.report(error);
            false
        }
    }

    /// If the current token matches `kind`, consume it and return true.
    /// Otherwise return false without recording anything.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Error reporting ────────────────────────────────────────────────

    /// Build an error positioned at the current token.
    pub(crate) fn syntax_error(&self, code: ErrorCode, message: impl Into<String>) -> SyntaxError {
        let span = self.current_span();
        let (line, column) = self.line_index.position(span.start);
        SyntaxError::at(code, message, line, column)
    }

    /// Record an error. Only the first error is kept; later ones are
    /// dropped because parse functions bail once the flag is set.
    pub(crate) fn report(&mut self, error: SyntaxError) {
        if !self.has_error {
            self.errors.push(error);
        }
        self.has_error = true;
    }

    /// Record an error at the current position with no extra properties.
    pub(crate) fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        let error = self.syntax_error(code, message);
        self.report(error);
    }

    /// Whether the parser has encountered an error.
    /// Parse functions check this and bail early.
    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert collected events into a rowan `GreenNode` plus the recorded
    /// error, if any. Consumes the parser.
    ///
    /// Forward parents: when `open_before(completed)` is called, the
    /// completed node's Open event gets a `forward_parent` link pointing
    /// at the wrapping Open event. When tree building reaches such an
    /// Open, it follows the chain, opens the wrappers outermost-first, and
    /// tombstones the wrapper events so they are skipped later.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<SyntaxError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut forward_parents: Vec<(usize, SyntaxKind)> = Vec::new();

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    if forward_parent.is_some() {
                        forward_parents.clear();
                        let mut current = i;
                        loop {
                            let (fk, fp) = match self.events[current] {
                                Event::Open {
                                    kind,
                                    forward_parent,
                                } => (kind, forward_parent),
                                _ => unreachable!("forward parent must be an Open event"),
                            };
                            forward_parents.push((current, fk));
                            match fp {
                                Some(next) => current = next,
                                None => break,
                            }
                        }

                        // Tombstone the wrapper Open events so they are
                        // skipped when reached in sequence.
                        for &(fp_idx, _) in forward_parents.iter().skip(1) {
                            if let Event::Open {
                                ref mut kind,
                                ref mut forward_parent,
                            } = self.events[fp_idx]
                            {
                                *kind = SyntaxKind::TOMBSTONE;
                                *forward_parent = None;
                            }
                        }
                        if let Event::Open {
                            ref mut forward_parent,
                            ..
                        } = self.events[i]
                        {
                            *forward_parent = None;
                        }

                        // Open wrappers outermost-first.
                        for &(_, fk) in forward_parents.iter().rev() {
                            if fk != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(fk as u16));
                            }
                        }
                    } else if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Close => {
                    builder.finish_node();
                }
                Event::Advance => {
                    if token_pos < self.tokens.len() {
                        let token = &self.tokens[token_pos];
                        let syntax_kind = SyntaxKind::from(token.kind);
                        builder.token(
                            rowan::SyntaxKind(syntax_kind as u16),
                            token.span.text(self.source),
                        );
                        token_pos += 1;
                    }
                }
            }
            i += 1;
        }

        (builder.finish(), self.errors)
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a single expression statement.
///
/// Opens the QUERY root, parses one expression, accepts one optional
/// trailing `;`, and requires end of input after that. Remaining tokens
/// (when an error already aborted parsing) are consumed so the tree stays
/// well-formed.
pub(crate) fn parse_query(p: &mut Parser) {
    let root = p.open();

    expressions::expr(p);

    if !p.has_error() {
        p.eat(SyntaxKind::SEMICOLON);
        if !p.at(SyntaxKind::EOF) {
            let text = p.current_text().to_string();
            let error = p
                .syntax_error(
                    ErrorCode::ParseUnexpectedToken,
                    format!("unexpected token `{text}` after expression"),
                )
                .with(Property::TokenText, PropertyValue::Text(text));
            p.report(error);
        }
    }

    // Consume whatever is left (including EOF).
    while !p.at(SyntaxKind::EOF) {
        p.advance();
    }
    p.advance(); // EOF

    p.close(root, SyntaxKind::QUERY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use partiql_lexer::Lexer;

    fn parser(source: &str) -> Parser<'_> {
        let tokens = Lexer::tokenize(source).expect("lexing should succeed");
        Parser::new(tokens, source, FxHashSet::default())
    }

    #[test]
    fn smoke_test_parser_produces_green_node() {
        let source = "a + 1";
        let mut p = parser(source);

        let root = p.open();
        let lit = p.open();
        p.advance(); // a
        p.close(lit, SyntaxKind::VAR_REF);
        p.advance(); // +
        let rhs = p.open();
        p.advance(); // 1
        p.close(rhs, SyntaxKind::LITERAL);
        p.advance(); // Eof
        p.close(root, SyntaxKind::QUERY);

        let (green, errors) = p.build_tree();
        assert!(errors.is_empty(), "expected no errors: {errors:?}");

        let root_node = crate::cst::SyntaxNode::new_root(green);
        assert_eq!(root_node.kind(), SyntaxKind::QUERY);
        let children: Vec<_> = root_node.children().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind(), SyntaxKind::VAR_REF);
        assert_eq!(children[1].kind(), SyntaxKind::LITERAL);
    }

    #[test]
    fn open_before_wraps_completed_node() {
        let source = "a + 1";
        let mut p = parser(source);

        let root = p.open();
        let lhs = p.open();
        p.advance(); // a
        let lhs_closed = p.close(lhs, SyntaxKind::VAR_REF);

        let bin = p.open_before(lhs_closed);
        p.advance(); // +
        let rhs = p.open();
        p.advance(); // 1
        p.close(rhs, SyntaxKind::LITERAL);
        p.close(bin, SyntaxKind::BINARY_EXPR);

        p.advance(); // Eof
        p.close(root, SyntaxKind::QUERY);

        let (green, errors) = p.build_tree();
        assert!(errors.is_empty());

        let root_node = crate::cst::SyntaxNode::new_root(green);
        let bin_node = root_node.children().next().unwrap();
        assert_eq!(bin_node.kind(), SyntaxKind::BINARY_EXPR);
        let var_ref = bin_node.children().next().unwrap();
        assert_eq!(var_ref.kind(), SyntaxKind::VAR_REF);
    }

    #[test]
    fn expect_success_and_failure() {
        let mut p = parser("select x");

        assert!(p.expect(SyntaxKind::SELECT_KW));
        assert!(!p.has_error());

        assert!(!p.expect(SyntaxKind::SELECT_KW));
        assert!(p.has_error());
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].code, ErrorCode::ParseExpectedTokenType);
    }

    #[test]
    fn only_first_error_is_kept() {
        let mut p = parser("select");
        p.error(ErrorCode::ParseEmptySelect, "first");
        p.error(ErrorCode::ParseUnexpectedToken, "second");
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].message, "first");
    }

    #[test]
    fn eat_consumes_only_on_match() {
        let mut p = parser("select x");
        assert!(p.eat(SyntaxKind::SELECT_KW));
        assert!(!p.eat(SyntaxKind::SELECT_KW));
        assert!(!p.has_error());
        assert_eq!(p.current(), SyntaxKind::IDENT);
        assert_eq!(p.current_text(), "x");
    }

    #[test]
    fn nth_lookahead_and_eof_padding() {
        let p = parser("a b");
        assert_eq!(p.nth(0), SyntaxKind::IDENT);
        assert_eq!(p.nth(1), SyntaxKind::IDENT);
        assert_eq!(p.nth(2), SyntaxKind::EOF);
        assert_eq!(p.nth(99), SyntaxKind::EOF);
    }

    #[test]
    fn errors_are_positioned() {
        let mut p = parser("a\n  b");
        p.advance(); // a
        p.error(ErrorCode::ParseUnexpectedToken, "whoops");
        assert_eq!(p.errors[0].line(), Some(2));
        assert_eq!(p.errors[0].column(), Some(3));
    }
}
