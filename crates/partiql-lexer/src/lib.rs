//! PartiQL lexer -- single-pass, longest-match tokenizer.
//!
//! Converts query text into a flat token stream ending in an explicit
//! `Eof` token, then runs the keyword folding pass so multi-word keywords
//! (`IS NOT`, `LEFT OUTER JOIN`, `DOUBLE PRECISION`, ...) reach the parser
//! as single compound tokens.
//!
//! The lexer walks the source with a byte-offset scanner (`peek`/`bump`/
//! `accept`/`take_while`); two-character operators are matched through a
//! table before any single-character token so longest match falls out of
//! the dispatch order.
//!
//! Whitespace and comments are emitted as trivia tokens rather than
//! dropped: the parser ignores them for lookahead but threads them into
//! the parse tree so tree offsets stay equal to source offsets.
//!
//! Lexing is fail-fast: the first invalid character, malformed literal, or
//! unterminated delimiter aborts with a positioned [`SyntaxError`]. There
//! is no error recovery and no error token.

mod fold;

use fold::fold_keywords;
use partiql_common::error::{ErrorCode, SyntaxError};
use partiql_common::span::{LineIndex, Span};
use partiql_common::token::{keyword_from_str, Token, TokenKind};
use partiql_common::value::Timestamp;

/// Two-character operators, tried before any single-character token.
const DOUBLE_OPS: [(&str, TokenKind); 7] = [
    ("||", TokenKind::Concat),
    ("<>", TokenKind::NotEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
];

/// The PartiQL lexer: a byte-offset scanner over the source text.
pub struct Lexer<'src> {
    source: &'src str,
    pos: u32,
    line_index: LineIndex,
}

impl<'src> Lexer<'src> {
    /// Tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector includes the final `Eof` token and has keyword
    /// folding already applied.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(fold_keywords(tokens))
    }

    fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line_index: LineIndex::new(source),
        }
    }

    // ── Scanning primitives ────────────────────────────────────────────

    /// The unscanned remainder of the source.
    fn rest(&self) -> &'src str {
        &self.source[self.pos as usize..]
    }

    /// The current character, if any.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the current character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume `text` if the remainder starts with it.
    fn accept(&mut self, text: &str) -> bool {
        if self.rest().starts_with(text) {
            self.pos += text.len() as u32;
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    /// Finish a token that began at `start`.
    fn token(&self, kind: TokenKind, start: u32) -> Token {
        Token::new(kind, start, self.pos)
    }

    /// Build a positioned error for the given byte offset.
    fn err(&self, code: ErrorCode, message: impl Into<String>, offset: u32) -> SyntaxError {
        let (line, column) = self.line_index.position(offset);
        SyntaxError::at(code, message, line, column)
    }

    // ── Token dispatch ─────────────────────────────────────────────────

    /// Produce the next token.
    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        // ── Trivia ─────────────────────────────────────────────────────
        if c.is_ascii_whitespace() {
            self.take_while(|c| c.is_ascii_whitespace());
            return Ok(self.token(TokenKind::Whitespace, start));
        }
        if self.accept("--") {
            self.take_while(|c| c != '\n');
            return Ok(self.token(TokenKind::Comment, start));
        }
        if self.accept("/*") {
            return self.block_comment(start);
        }

        // ── Two-character operators ────────────────────────────────────
        for (text, kind) in DOUBLE_OPS {
            if self.accept(text) {
                return Ok(self.token(kind, start));
            }
        }

        // ── Literals and identifiers ───────────────────────────────────
        match c {
            '\'' => return self.string_literal(start),
            '"' => return self.quoted_ident(start),
            '`' => return self.timestamp_literal(start),
            '0'..='9' => return self.number(start),
            c if is_ident_start(c) => return Ok(self.ident(start)),
            _ => {}
        }

        // ── Single-character tokens ────────────────────────────────────
        // Bare `!` and `|` land in the fallthrough: they only exist as
        // halves of `!=` and `||`, which the operator table already took.
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Eq,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '@' => TokenKind::AtSign,
            _ => {
                return Err(self.err(
                    ErrorCode::LexInvalidChar,
                    format!("invalid character `{c}`"),
                    start,
                ));
            }
        };
        self.bump();
        Ok(self.token(kind, start))
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// `/* ... */` block comment; the opening `/*` is already consumed.
    /// Does not nest.
    fn block_comment(&mut self, start: u32) -> Result<Token, SyntaxError> {
        loop {
            if self.accept("*/") {
                return Ok(self.token(TokenKind::Comment, start));
            }
            if self.bump().is_none() {
                return Err(self.err(
                    ErrorCode::LexUnterminatedComment,
                    "unterminated block comment",
                    start,
                ));
            }
        }
    }

    // ── Literals ───────────────────────────────────────────────────────

    /// Single-quoted string literal with `''` escape.
    fn string_literal(&mut self, start: u32) -> Result<Token, SyntaxError> {
        self.bump(); // opening '
        loop {
            if self.accept("''") {
                continue;
            }
            match self.bump() {
                Some('\'') => return Ok(self.token(TokenKind::StringLiteral, start)),
                Some(_) => {}
                None => {
                    return Err(self.err(
                        ErrorCode::LexUnterminatedString,
                        "unterminated string literal",
                        start,
                    ));
                }
            }
        }
    }

    /// Double-quoted identifier with `""` escape.
    fn quoted_ident(&mut self, start: u32) -> Result<Token, SyntaxError> {
        self.bump(); // opening "
        loop {
            if self.accept("\"\"") {
                continue;
            }
            match self.bump() {
                Some('"') => return Ok(self.token(TokenKind::QuotedIdent, start)),
                Some(_) => {}
                None => {
                    return Err(self.err(
                        ErrorCode::LexUnterminatedString,
                        "unterminated quoted identifier",
                        start,
                    ));
                }
            }
        }
    }

    /// Backtick-delimited timestamp literal. The content is validated here
    /// so malformed timestamps fail at lex time with a precise position.
    fn timestamp_literal(&mut self, start: u32) -> Result<Token, SyntaxError> {
        self.bump(); // opening `
        let content_start = self.pos;
        self.take_while(|c| c != '`');
        if self.rest().is_empty() {
            return Err(self.err(
                ErrorCode::LexUnterminatedString,
                "unterminated timestamp literal",
                start,
            ));
        }

        let content = Span::new(content_start, self.pos).text(self.source);
        if let Err(e) = Timestamp::parse(content) {
            return Err(self.err(ErrorCode::LexInvalidTimestamp, e.message, start));
        }

        self.bump(); // closing `
        Ok(self.token(TokenKind::TimestampLiteral, start))
    }

    /// Integer or decimal literal. A fraction or exponent makes it a
    /// decimal; the exponent must have at least one digit.
    fn number(&mut self, start: u32) -> Result<Token, SyntaxError> {
        self.take_while(|c| c.is_ascii_digit());
        let mut kind = TokenKind::IntLiteral;

        // A dot only starts a fraction with a digit after it, so `1.foo`
        // stays an integer followed by a path member.
        if self.rest().starts_with('.')
            && self.rest()[1..].starts_with(|c: char| c.is_ascii_digit())
        {
            self.bump(); // .
            self.take_while(|c| c.is_ascii_digit());
            kind = TokenKind::DecimalLiteral;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.err(
                    ErrorCode::LexInvalidLiteral,
                    "malformed exponent in numeric literal",
                    start,
                ));
            }
            self.take_while(|c| c.is_ascii_digit());
            kind = TokenKind::DecimalLiteral;
        }

        // A letter glued to a number is not a valid literal (`1abc`).
        if self.peek().is_some_and(is_ident_start) {
            return Err(self.err(
                ErrorCode::LexInvalidLiteral,
                "invalid numeric literal",
                start,
            ));
        }

        Ok(self.token(kind, start))
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    /// Identifier or keyword. Keyword recognition is case-insensitive.
    fn ident(&mut self, start: u32) -> Token {
        self.take_while(is_ident_continue);
        let text = Span::new(start, self.pos).text(self.source);

        let kind = keyword_from_str(&text.to_ascii_lowercase()).unwrap_or(TokenKind::Ident);
        self.token(kind, start)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
