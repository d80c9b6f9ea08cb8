use serde::Serialize;

use crate::span::Span;

/// A token produced by the PartiQL lexer.
///
/// Tokens are `(kind, span)` pairs; the original lexeme is sliced from the
/// source text on demand and literal values are built later, during
/// parse-tree lowering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind and byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the PartiQL grammar.
///
/// Keywords are case-insensitive in the source; the lexer lowercases the
/// lexeme before calling [`keyword_from_str`]. Multi-word keywords
/// (`IS NOT`, `LEFT JOIN`, `DOUBLE PRECISION`, ...) do not come out of the
/// scanner directly -- the folding pass collapses the word sequences into
/// the compound variants below, with merged spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Clause keywords ────────────────────────────────────────────────
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Limit,
    Order,
    Asc,
    Desc,
    Pivot,
    Unpivot,
    Values,
    Value,
    As,
    At,
    On,
    For,

    // ── Expression keywords ────────────────────────────────────────────
    Case,
    When,
    Then,
    Else,
    End,
    Cast,
    And,
    Or,
    Not,
    In,
    Is,
    Like,
    Escape,
    Between,
    Distinct,
    All,
    Partial,
    Null,
    Missing,
    True,
    False,
    Substring,
    Trim,
    Extract,

    // ── Join keywords ──────────────────────────────────────────────────
    Join,
    Inner,
    Left,
    Right,
    Outer,
    Full,
    Cross,

    // ── Type-name keywords ─────────────────────────────────────────────
    Char,
    Character,
    Varchar,
    String,
    Symbol,
    Boolean,
    Smallint,
    Int,
    Integer,
    Float,
    Real,
    Decimal,
    Numeric,
    Timestamp,
    Double,
    Precision,
    Struct,
    Bag,
    List,
    Sexp,
    Blob,
    Clob,

    // ── Trim specifications ────────────────────────────────────────────
    Leading,
    Trailing,
    Both,

    // ── Date parts ─────────────────────────────────────────────────────
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    TimezoneHour,
    TimezoneMinute,

    // ── Folded compound keywords ───────────────────────────────────────
    /// `is not`
    IsNot,
    /// `not in`
    NotIn,
    /// `not like`
    NotLike,
    /// `not between`
    NotBetween,
    /// `join`, `inner join`, or `cross join`
    InnerJoin,
    /// `left [outer] join`
    LeftJoin,
    /// `right [outer] join`
    RightJoin,
    /// `[full] outer join`
    OuterJoin,
    /// `double precision`
    DoublePrecision,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` (multiplication, wildcard, and `COUNT(*)`)
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `||`
    Concat,
    /// `=`
    Eq,
    /// `<>` or `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `@` (lexical scope qualifier)
    AtSign,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<<` (bag constructor open)
    LtLt,
    /// `>>` (bag constructor close)
    GtGt,

    // ── Punctuation ────────────────────────────────────────────────────
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    /// Integer literal, e.g. `42`.
    IntLiteral,
    /// Exact decimal literal, e.g. `3.14`, `1e5`, `2.5e-3`.
    DecimalLiteral,
    /// Single-quoted string literal with `''` escape.
    StringLiteral,
    /// Backtick-delimited timestamp literal, e.g. `` `2001T` ``.
    TimestampLiteral,

    // ── Identifiers ────────────────────────────────────────────────────
    /// Regular identifier (case-insensitive reference).
    Ident,
    /// Double-quoted identifier with `""` escape (case-sensitive reference).
    QuotedIdent,

    // ── Trivia ─────────────────────────────────────────────────────────
    /// A run of whitespace. Preserved so parse-tree offsets match the
    /// original source text.
    Whitespace,
    /// `--` line comment or `/* */` block comment.
    Comment,

    // ── Special ────────────────────────────────────────────────────────
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Canonical lowercase spelling for keyword tokens, `None` otherwise.
    ///
    /// Compound keywords use underscore-joined canonical forms: `is_not`,
    /// `left_join`, `double_precision`, and so on.
    pub fn keyword_text(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Select => "select",
            From => "from",
            Where => "where",
            Group => "group",
            By => "by",
            Having => "having",
            Limit => "limit",
            Order => "order",
            Asc => "asc",
            Desc => "desc",
            Pivot => "pivot",
            Unpivot => "unpivot",
            Values => "values",
            Value => "value",
            As => "as",
            At => "at",
            On => "on",
            For => "for",
            Case => "case",
            When => "when",
            Then => "then",
            Else => "else",
            End => "end",
            Cast => "cast",
            And => "and",
            Or => "or",
            Not => "not",
            In => "in",
            Is => "is",
            Like => "like",
            Escape => "escape",
            Between => "between",
            Distinct => "distinct",
            All => "all",
            Partial => "partial",
            Null => "null",
            Missing => "missing",
            True => "true",
            False => "false",
            Substring => "substring",
            Trim => "trim",
            Extract => "extract",
            Join => "join",
            Inner => "inner",
            Left => "left",
            Right => "right",
            Outer => "outer",
            Full => "full",
            Cross => "cross",
            Char => "char",
            Character => "character",
            Varchar => "varchar",
            String => "string",
            Symbol => "symbol",
            Boolean => "boolean",
            Smallint => "smallint",
            Int => "int",
            Integer => "integer",
            Float => "float",
            Real => "real",
            Decimal => "decimal",
            Numeric => "numeric",
            Timestamp => "timestamp",
            Double => "double",
            Precision => "precision",
            Struct => "struct",
            Bag => "bag",
            List => "list",
            Sexp => "sexp",
            Blob => "blob",
            Clob => "clob",
            Leading => "leading",
            Trailing => "trailing",
            Both => "both",
            Year => "year",
            Month => "month",
            Day => "day",
            Hour => "hour",
            Minute => "minute",
            Second => "second",
            TimezoneHour => "timezone_hour",
            TimezoneMinute => "timezone_minute",
            IsNot => "is_not",
            NotIn => "not_in",
            NotLike => "not_like",
            NotBetween => "not_between",
            InnerJoin => "inner_join",
            LeftJoin => "left_join",
            RightJoin => "right_join",
            OuterJoin => "outer_join",
            DoublePrecision => "double_precision",
            _ => return None,
        };
        Some(text)
    }

    /// Whether this token is a keyword (including folded compounds).
    pub fn is_keyword(self) -> bool {
        self.keyword_text().is_some()
    }

    /// Whether this token is trivia (whitespace or a comment). Trivia is
    /// invisible to the parser's lookahead but kept in the token stream
    /// and the parse tree.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Whether this token is a trim specification (`LEADING`/`TRAILING`/`BOTH`).
    pub fn is_trim_spec(self) -> bool {
        matches!(self, TokenKind::Leading | TokenKind::Trailing | TokenKind::Both)
    }

    /// Whether this token names a date part for `EXTRACT`.
    pub fn is_date_part(self) -> bool {
        matches!(
            self,
            TokenKind::Year
                | TokenKind::Month
                | TokenKind::Day
                | TokenKind::Hour
                | TokenKind::Minute
                | TokenKind::Second
                | TokenKind::TimezoneHour
                | TokenKind::TimezoneMinute
        )
    }
}

/// Look up a keyword from its lowercased string representation.
///
/// Returns `Some(TokenKind)` if the string is a PartiQL keyword, `None`
/// otherwise. The lexer lowercases the scanned identifier before calling
/// this, making keyword recognition case-insensitive.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "select" => TokenKind::Select,
        "from" => TokenKind::From,
        "where" => TokenKind::Where,
        "group" => TokenKind::Group,
        "by" => TokenKind::By,
        "having" => TokenKind::Having,
        "limit" => TokenKind::Limit,
        "order" => TokenKind::Order,
        "asc" => TokenKind::Asc,
        "desc" => TokenKind::Desc,
        "pivot" => TokenKind::Pivot,
        "unpivot" => TokenKind::Unpivot,
        "values" => TokenKind::Values,
        "value" => TokenKind::Value,
        "as" => TokenKind::As,
        "at" => TokenKind::At,
        "on" => TokenKind::On,
        "for" => TokenKind::For,
        "case" => TokenKind::Case,
        "when" => TokenKind::When,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "cast" => TokenKind::Cast,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "like" => TokenKind::Like,
        "escape" => TokenKind::Escape,
        "between" => TokenKind::Between,
        "distinct" => TokenKind::Distinct,
        "all" => TokenKind::All,
        "partial" => TokenKind::Partial,
        "null" => TokenKind::Null,
        "missing" => TokenKind::Missing,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "substring" => TokenKind::Substring,
        "trim" => TokenKind::Trim,
        "extract" => TokenKind::Extract,
        "join" => TokenKind::Join,
        "inner" => TokenKind::Inner,
        "left" => TokenKind::Left,
        "right" => TokenKind::Right,
        "outer" => TokenKind::Outer,
        "full" => TokenKind::Full,
        "cross" => TokenKind::Cross,
        "char" => TokenKind::Char,
        "character" => TokenKind::Character,
        "varchar" => TokenKind::Varchar,
        "string" => TokenKind::String,
        "symbol" => TokenKind::Symbol,
        "boolean" => TokenKind::Boolean,
        "smallint" => TokenKind::Smallint,
        "int" => TokenKind::Int,
        "integer" => TokenKind::Integer,
        "float" => TokenKind::Float,
        "real" => TokenKind::Real,
        "decimal" => TokenKind::Decimal,
        "numeric" => TokenKind::Numeric,
        "timestamp" => TokenKind::Timestamp,
        "double" => TokenKind::Double,
        "precision" => TokenKind::Precision,
        "struct" => TokenKind::Struct,
        "bag" => TokenKind::Bag,
        "list" => TokenKind::List,
        "sexp" => TokenKind::Sexp,
        "blob" => TokenKind::Blob,
        "clob" => TokenKind::Clob,
        "leading" => TokenKind::Leading,
        "trailing" => TokenKind::Trailing,
        "both" => TokenKind::Both,
        "year" => TokenKind::Year,
        "month" => TokenKind::Month,
        "day" => TokenKind::Day,
        "hour" => TokenKind::Hour,
        "minute" => TokenKind::Minute,
        "second" => TokenKind::Second,
        "timezone_hour" => TokenKind::TimezoneHour,
        "timezone_minute" => TokenKind::TimezoneMinute,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_is_lowercase_only() {
        assert_eq!(keyword_from_str("select"), Some(TokenKind::Select));
        // The lexer lowercases before lookup; raw uppercase is not matched here.
        assert_eq!(keyword_from_str("SELECT"), None);
        assert_eq!(keyword_from_str("selec"), None);
        assert_eq!(keyword_from_str(""), None);
    }

    #[test]
    fn keyword_text_roundtrips_simple_keywords() {
        for word in [
            "select", "from", "where", "group", "by", "having", "limit", "pivot", "unpivot",
            "values", "as", "at", "on", "cast", "case", "when", "then", "else", "end", "and",
            "or", "not", "in", "is", "like", "escape", "between", "distinct", "all", "partial",
            "for", "substring", "trim", "extract", "null", "missing", "true", "false",
        ] {
            let kind = keyword_from_str(word).unwrap_or_else(|| panic!("{word} not a keyword"));
            assert_eq!(kind.keyword_text(), Some(word));
        }
    }

    #[test]
    fn compound_keywords_have_canonical_text() {
        assert_eq!(TokenKind::IsNot.keyword_text(), Some("is_not"));
        assert_eq!(TokenKind::NotBetween.keyword_text(), Some("not_between"));
        assert_eq!(TokenKind::NotLike.keyword_text(), Some("not_like"));
        assert_eq!(TokenKind::NotIn.keyword_text(), Some("not_in"));
        assert_eq!(TokenKind::InnerJoin.keyword_text(), Some("inner_join"));
        assert_eq!(TokenKind::LeftJoin.keyword_text(), Some("left_join"));
        assert_eq!(TokenKind::RightJoin.keyword_text(), Some("right_join"));
        assert_eq!(TokenKind::OuterJoin.keyword_text(), Some("outer_join"));
        assert_eq!(TokenKind::DoublePrecision.keyword_text(), Some("double_precision"));
    }

    #[test]
    fn operators_are_not_keywords() {
        assert!(!TokenKind::Plus.is_keyword());
        assert!(!TokenKind::Concat.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::Eof.is_keyword());
    }

    #[test]
    fn trim_specs_and_date_parts() {
        assert!(TokenKind::Leading.is_trim_spec());
        assert!(TokenKind::Both.is_trim_spec());
        assert!(!TokenKind::From.is_trim_spec());

        assert!(TokenKind::Year.is_date_part());
        assert!(TokenKind::TimezoneMinute.is_date_part());
        assert!(!TokenKind::Trailing.is_date_part());
    }
}
