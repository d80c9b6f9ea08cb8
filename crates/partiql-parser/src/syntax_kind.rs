//! SyntaxKind enum for the PartiQL parse tree.
//!
//! This is a superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus
//! composite node kinds for tree nodes produced by the parser.

use partiql_common::token::TokenKind;

/// Every kind of syntax element in the PartiQL parse tree.
///
/// Token kinds (leaves) are mapped 1:1 from [`TokenKind`]. Composite node
/// kinds represent parser-produced tree nodes. The first two values are
/// sentinels used by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Clause keywords ────────────────────────────────────────────────
    SELECT_KW,
    FROM_KW,
    WHERE_KW,
    GROUP_KW,
    BY_KW,
    HAVING_KW,
    LIMIT_KW,
    ORDER_KW,
    ASC_KW,
    DESC_KW,
    PIVOT_KW,
    UNPIVOT_KW,
    VALUES_KW,
    VALUE_KW,
    AS_KW,
    AT_KW,
    ON_KW,
    FOR_KW,

    // ── Expression keywords ────────────────────────────────────────────
    CASE_KW,
    WHEN_KW,
    THEN_KW,
    ELSE_KW,
    END_KW,
    CAST_KW,
    AND_KW,
    OR_KW,
    NOT_KW,
    IN_KW,
    IS_KW,
    LIKE_KW,
    ESCAPE_KW,
    BETWEEN_KW,
    DISTINCT_KW,
    ALL_KW,
    PARTIAL_KW,
    NULL_KW,
    MISSING_KW,
    TRUE_KW,
    FALSE_KW,
    SUBSTRING_KW,
    TRIM_KW,
    EXTRACT_KW,

    // ── Join keywords ──────────────────────────────────────────────────
    JOIN_KW,
    INNER_KW,
    LEFT_KW,
    RIGHT_KW,
    OUTER_KW,
    FULL_KW,
    CROSS_KW,

    // ── Type-name keywords ─────────────────────────────────────────────
    CHAR_KW,
    CHARACTER_KW,
    VARCHAR_KW,
    STRING_KW,
    SYMBOL_KW,
    BOOLEAN_KW,
    SMALLINT_KW,
    INT_KW,
    INTEGER_KW,
    FLOAT_KW,
    REAL_KW,
    DECIMAL_KW,
    NUMERIC_KW,
    TIMESTAMP_KW,
    DOUBLE_KW,
    PRECISION_KW,
    STRUCT_KW,
    BAG_KW,
    LIST_KW,
    SEXP_KW,
    BLOB_KW,
    CLOB_KW,

    // ── Trim specifications and date parts ─────────────────────────────
    LEADING_KW,
    TRAILING_KW,
    BOTH_KW,
    YEAR_KW,
    MONTH_KW,
    DAY_KW,
    HOUR_KW,
    MINUTE_KW,
    SECOND_KW,
    TIMEZONE_HOUR_KW,
    TIMEZONE_MINUTE_KW,

    // ── Folded compound keywords ───────────────────────────────────────
    IS_NOT_KW,
    NOT_IN_KW,
    NOT_LIKE_KW,
    NOT_BETWEEN_KW,
    INNER_JOIN_KW,
    LEFT_JOIN_KW,
    RIGHT_JOIN_KW,
    OUTER_JOIN_KW,
    DOUBLE_PRECISION_KW,

    // ── Operators ──────────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    CONCAT,
    EQ,
    NOT_EQ,
    LT,
    LT_EQ,
    GT,
    GT_EQ,
    AT_SIGN,

    // ── Delimiters ─────────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    LT_LT,
    GT_GT,

    // ── Punctuation ────────────────────────────────────────────────────
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals and identifiers ───────────────────────────────────────
    INT_LITERAL,
    DECIMAL_LITERAL,
    STRING_LITERAL,
    TIMESTAMP_LITERAL,
    IDENT,
    QUOTED_IDENT,

    // ── Trivia ─────────────────────────────────────────────────────────
    WHITESPACE,
    COMMENT,

    // ── Special ────────────────────────────────────────────────────────
    EOF,

    // ── Composite node kinds ───────────────────────────────────────────
    /// Root node wrapping one expression statement.
    QUERY,
    /// Literal expression (number, string, timestamp, boolean, null, missing).
    LITERAL,
    /// Variable reference, possibly `@`-qualified or quoted.
    VAR_REF,
    /// Parenthesized grouping: `(expr)`.
    PAREN_EXPR,
    /// List constructor `[a, b]` or parenthesized list `(a, b)`.
    LIST_EXPR,
    /// Bag constructor: `<< a, b >>`.
    BAG_EXPR,
    /// Struct constructor: `{k: v, ...}`.
    STRUCT_EXPR,
    /// Single `key : value` member of a struct constructor.
    STRUCT_FIELD,
    /// Logical negation: `NOT expr`.
    NOT_EXPR,
    /// Unary sign: `-expr`, `+expr`.
    UNARY_EXPR,
    /// Binary operator expression: `a + b`, `a AND b`, ...
    BINARY_EXPR,
    /// `expr IS type` / `expr IS NOT type`.
    IS_EXPR,
    /// `expr [NOT] BETWEEN lo AND hi`.
    BETWEEN_EXPR,
    /// `expr [NOT] LIKE pattern [ESCAPE esc]`.
    LIKE_EXPR,
    /// `expr [NOT] IN rhs`.
    IN_EXPR,
    /// Path expression: a root followed by one or more components.
    PATH_EXPR,
    /// `.name` path component.
    PATH_MEMBER,
    /// `[expr]` path component.
    PATH_INDEX,
    /// `[*]` path component.
    PATH_WILDCARD,
    /// `.*` path component.
    PATH_UNPIVOT,
    /// Function call: `name(args)`.
    CALL_EXPR,
    /// Aggregate call: `name([DISTINCT|ALL] arg)` or `COUNT(*)`.
    AGG_CALL,
    /// Argument list of a function call.
    ARG_LIST,
    /// `CAST(expr AS type)`.
    CAST_EXPR,
    /// Type reference with optional parameter list.
    TYPE_REF,
    /// Parenthesized type parameters: `(1, 2)`.
    TYPE_ARG_LIST,
    /// `CASE ... END`, simple or searched.
    CASE_EXPR,
    /// `WHEN cond THEN result` branch.
    WHEN_CLAUSE,
    /// `ELSE result` branch.
    ELSE_CLAUSE,
    /// SELECT-FROM-WHERE block (also hosts PIVOT projections).
    SELECT_EXPR,
    /// Comma-separated projection list.
    PROJECT_LIST,
    /// Single projection item: `expr [[AS] alias]`.
    PROJECT_ITEM,
    /// Bare `*` projection item.
    PROJECT_STAR,
    /// `VALUE expr` projection.
    PROJECT_VALUE,
    /// `PIVOT value AT key` projection.
    PROJECT_PIVOT,
    /// FROM clause: first source plus join clauses.
    FROM_CLAUSE,
    /// Single from-source: `[UNPIVOT] expr [AS a] [AT b]`.
    FROM_SOURCE,
    /// Join onto the previous source: `, src` or `JOIN src [ON cond]`.
    JOIN_CLAUSE,
    /// `ON cond` of an explicit join.
    ON_CLAUSE,
    /// `AS name` binding (or implicit alias in a projection).
    AS_ALIAS,
    /// `AT name` binding.
    AT_ALIAS,
    /// WHERE clause.
    WHERE_CLAUSE,
    /// `GROUP [PARTIAL] BY keys [GROUP AS name]`.
    GROUP_CLAUSE,
    /// Single group-by key: `expr [AS alias]`.
    GROUP_KEY,
    /// `GROUP AS name` binding.
    GROUP_AS,
    /// HAVING clause.
    HAVING_CLAUSE,
    /// LIMIT clause.
    LIMIT_CLAUSE,
    /// `VALUES (..), (..)` table value constructor.
    VALUES_EXPR,
    /// One parenthesized row of a VALUES constructor.
    VALUES_ROW,
    /// `SUBSTRING(s FROM i [FOR n])` / `SUBSTRING(s, i [, n])`.
    SUBSTRING_EXPR,
    /// `TRIM([[spec] [chars] FROM] src)`.
    TRIM_EXPR,
    /// `EXTRACT(date_part FROM expr)`.
    EXTRACT_EXPR,
}

impl SyntaxKind {
    /// Whether this kind is trivia (whitespace or a comment). Trivia is
    /// preserved in the parse tree but skipped by the parser's lookahead.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
    }

    /// Whether this kind is a composite node that represents an expression.
    ///
    /// The lowering uses this to locate expression children inside clause
    /// nodes without caring which expression form they are.
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            SyntaxKind::LITERAL
                | SyntaxKind::VAR_REF
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::LIST_EXPR
                | SyntaxKind::BAG_EXPR
                | SyntaxKind::STRUCT_EXPR
                | SyntaxKind::NOT_EXPR
                | SyntaxKind::UNARY_EXPR
                | SyntaxKind::BINARY_EXPR
                | SyntaxKind::IS_EXPR
                | SyntaxKind::BETWEEN_EXPR
                | SyntaxKind::LIKE_EXPR
                | SyntaxKind::IN_EXPR
                | SyntaxKind::PATH_EXPR
                | SyntaxKind::CALL_EXPR
                | SyntaxKind::AGG_CALL
                | SyntaxKind::CAST_EXPR
                | SyntaxKind::CASE_EXPR
                | SyntaxKind::SELECT_EXPR
                | SyntaxKind::VALUES_EXPR
                | SyntaxKind::SUBSTRING_EXPR
                | SyntaxKind::TRIM_EXPR
                | SyntaxKind::EXTRACT_EXPR
        )
    }

    /// Whether this kind is a trim specification keyword.
    pub fn is_trim_spec(self) -> bool {
        matches!(
            self,
            SyntaxKind::LEADING_KW | SyntaxKind::TRAILING_KW | SyntaxKind::BOTH_KW
        )
    }

    /// Whether this kind names a date part for `EXTRACT`.
    pub fn is_date_part(self) -> bool {
        matches!(
            self,
            SyntaxKind::YEAR_KW
                | SyntaxKind::MONTH_KW
                | SyntaxKind::DAY_KW
                | SyntaxKind::HOUR_KW
                | SyntaxKind::MINUTE_KW
                | SyntaxKind::SECOND_KW
                | SyntaxKind::TIMEZONE_HOUR_KW
                | SyntaxKind::TIMEZONE_MINUTE_KW
        )
    }

    /// Whether this kind can start a type reference in `CAST`/`IS`.
    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            SyntaxKind::CHAR_KW
                | SyntaxKind::CHARACTER_KW
                | SyntaxKind::VARCHAR_KW
                | SyntaxKind::STRING_KW
                | SyntaxKind::SYMBOL_KW
                | SyntaxKind::BOOLEAN_KW
                | SyntaxKind::SMALLINT_KW
                | SyntaxKind::INT_KW
                | SyntaxKind::INTEGER_KW
                | SyntaxKind::FLOAT_KW
                | SyntaxKind::REAL_KW
                | SyntaxKind::DECIMAL_KW
                | SyntaxKind::NUMERIC_KW
                | SyntaxKind::TIMESTAMP_KW
                | SyntaxKind::DOUBLE_PRECISION_KW
                | SyntaxKind::STRUCT_KW
                | SyntaxKind::BAG_KW
                | SyntaxKind::LIST_KW
                | SyntaxKind::SEXP_KW
                | SyntaxKind::BLOB_KW
                | SyntaxKind::CLOB_KW
                | SyntaxKind::NULL_KW
                | SyntaxKind::MISSING_KW
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            // Clause keywords
            TokenKind::Select => SyntaxKind::SELECT_KW,
            TokenKind::From => SyntaxKind::FROM_KW,
            TokenKind::Where => SyntaxKind::WHERE_KW,
            TokenKind::Group => SyntaxKind::GROUP_KW,
            TokenKind::By => SyntaxKind::BY_KW,
            TokenKind::Having => SyntaxKind::HAVING_KW,
            TokenKind::Limit => SyntaxKind::LIMIT_KW,
            TokenKind::Order => SyntaxKind::ORDER_KW,
            TokenKind::Asc => SyntaxKind::ASC_KW,
            TokenKind::Desc => SyntaxKind::DESC_KW,
            TokenKind::Pivot => SyntaxKind::PIVOT_KW,
            TokenKind::Unpivot => SyntaxKind::UNPIVOT_KW,
            TokenKind::Values => SyntaxKind::VALUES_KW,
            TokenKind::Value => SyntaxKind::VALUE_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::At => SyntaxKind::AT_KW,
            TokenKind::On => SyntaxKind::ON_KW,
            TokenKind::For => SyntaxKind::FOR_KW,
            // Expression keywords
            TokenKind::Case => SyntaxKind::CASE_KW,
            TokenKind::When => SyntaxKind::WHEN_KW,
            TokenKind::Then => SyntaxKind::THEN_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::End => SyntaxKind::END_KW,
            TokenKind::Cast => SyntaxKind::CAST_KW,
            TokenKind::And => SyntaxKind::AND_KW,
            TokenKind::Or => SyntaxKind::OR_KW,
            TokenKind::Not => SyntaxKind::NOT_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::Is => SyntaxKind::IS_KW,
            TokenKind::Like => SyntaxKind::LIKE_KW,
            TokenKind::Escape => SyntaxKind::ESCAPE_KW,
            TokenKind::Between => SyntaxKind::BETWEEN_KW,
            TokenKind::Distinct => SyntaxKind::DISTINCT_KW,
            TokenKind::All => SyntaxKind::ALL_KW,
            TokenKind::Partial => SyntaxKind::PARTIAL_KW,
            TokenKind::Null => SyntaxKind::NULL_KW,
            TokenKind::Missing => SyntaxKind::MISSING_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Substring => SyntaxKind::SUBSTRING_KW,
            TokenKind::Trim => SyntaxKind::TRIM_KW,
            TokenKind::Extract => SyntaxKind::EXTRACT_KW,
            // Join keywords
            TokenKind::Join => SyntaxKind::JOIN_KW,
            TokenKind::Inner => SyntaxKind::INNER_KW,
            TokenKind::Left => SyntaxKind::LEFT_KW,
            TokenKind::Right => SyntaxKind::RIGHT_KW,
            TokenKind::Outer => SyntaxKind::OUTER_KW,
            TokenKind::Full => SyntaxKind::FULL_KW,
            TokenKind::Cross => SyntaxKind::CROSS_KW,
            // Type-name keywords
            TokenKind::Char => SyntaxKind::CHAR_KW,
            TokenKind::Character => SyntaxKind::CHARACTER_KW,
            TokenKind::Varchar => SyntaxKind::VARCHAR_KW,
            TokenKind::String => SyntaxKind::STRING_KW,
            TokenKind::Symbol => SyntaxKind::SYMBOL_KW,
            TokenKind::Boolean => SyntaxKind::BOOLEAN_KW,
            TokenKind::Smallint => SyntaxKind::SMALLINT_KW,
            TokenKind::Int => SyntaxKind::INT_KW,
            TokenKind::Integer => SyntaxKind::INTEGER_KW,
            TokenKind::Float => SyntaxKind::FLOAT_KW,
            TokenKind::Real => SyntaxKind::REAL_KW,
            TokenKind::Decimal => SyntaxKind::DECIMAL_KW,
            TokenKind::Numeric => SyntaxKind::NUMERIC_KW,
            TokenKind::Timestamp => SyntaxKind::TIMESTAMP_KW,
            TokenKind::Double => SyntaxKind::DOUBLE_KW,
            TokenKind::Precision => SyntaxKind::PRECISION_KW,
            TokenKind::Struct => SyntaxKind::STRUCT_KW,
            TokenKind::Bag => SyntaxKind::BAG_KW,
            TokenKind::List => SyntaxKind::LIST_KW,
            TokenKind::Sexp => SyntaxKind::SEXP_KW,
            TokenKind::Blob => SyntaxKind::BLOB_KW,
            TokenKind::Clob => SyntaxKind::CLOB_KW,
            // Trim specifications and date parts
            TokenKind::Leading => SyntaxKind::LEADING_KW,
            TokenKind::Trailing => SyntaxKind::TRAILING_KW,
            TokenKind::Both => SyntaxKind::BOTH_KW,
            TokenKind::Year => SyntaxKind::YEAR_KW,
            TokenKind::Month => SyntaxKind::MONTH_KW,
            TokenKind::Day => SyntaxKind::DAY_KW,
            TokenKind::Hour => SyntaxKind::HOUR_KW,
            TokenKind::Minute => SyntaxKind::MINUTE_KW,
            TokenKind::Second => SyntaxKind::SECOND_KW,
            TokenKind::TimezoneHour => SyntaxKind::TIMEZONE_HOUR_KW,
            TokenKind::TimezoneMinute => SyntaxKind::TIMEZONE_MINUTE_KW,
            // Folded compounds
            TokenKind::IsNot => SyntaxKind::IS_NOT_KW,
            TokenKind::NotIn => SyntaxKind::NOT_IN_KW,
            TokenKind::NotLike => SyntaxKind::NOT_LIKE_KW,
            TokenKind::NotBetween => SyntaxKind::NOT_BETWEEN_KW,
            TokenKind::InnerJoin => SyntaxKind::INNER_JOIN_KW,
            TokenKind::LeftJoin => SyntaxKind::LEFT_JOIN_KW,
            TokenKind::RightJoin => SyntaxKind::RIGHT_JOIN_KW,
            TokenKind::OuterJoin => SyntaxKind::OUTER_JOIN_KW,
            TokenKind::DoublePrecision => SyntaxKind::DOUBLE_PRECISION_KW,
            // Operators
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::Concat => SyntaxKind::CONCAT,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::AtSign => SyntaxKind::AT_SIGN,
            // Delimiters
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::LtLt => SyntaxKind::LT_LT,
            TokenKind::GtGt => SyntaxKind::GT_GT,
            // Punctuation
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            // Literals and identifiers
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::DecimalLiteral => SyntaxKind::DECIMAL_LITERAL,
            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,
            TokenKind::TimestampLiteral => SyntaxKind::TIMESTAMP_LITERAL,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::QuotedIdent => SyntaxKind::QUOTED_IDENT,
            // Trivia
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            // Special
            TokenKind::Eof => SyntaxKind::EOF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_kinds_are_first_values() {
        assert_eq!(SyntaxKind::TOMBSTONE as u16, 0);
        assert_eq!(SyntaxKind::ERROR_NODE as u16, 1);
    }

    #[test]
    fn trivia_kinds_identified() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::COMMENT.is_trivia());
        assert!(!SyntaxKind::IDENT.is_trivia());
        assert!(!SyntaxKind::SELECT_KW.is_trivia());
    }

    #[test]
    fn expr_kinds_identified() {
        assert!(SyntaxKind::LITERAL.is_expr());
        assert!(SyntaxKind::SELECT_EXPR.is_expr());
        assert!(SyntaxKind::PATH_EXPR.is_expr());
        assert!(!SyntaxKind::WHERE_CLAUSE.is_expr());
        assert!(!SyntaxKind::IDENT.is_expr());
        assert!(!SyntaxKind::PATH_MEMBER.is_expr());
    }

    #[test]
    fn type_names_include_null_and_missing() {
        assert!(SyntaxKind::NULL_KW.is_type_name());
        assert!(SyntaxKind::MISSING_KW.is_type_name());
        assert!(SyntaxKind::DOUBLE_PRECISION_KW.is_type_name());
        assert!(!SyntaxKind::DOUBLE_KW.is_type_name());
        assert!(!SyntaxKind::SELECT_KW.is_type_name());
    }

    #[test]
    fn token_kind_round_trip_through_raw() {
        for kind in [
            TokenKind::Select,
            TokenKind::IsNot,
            TokenKind::Concat,
            TokenKind::TimestampLiteral,
            TokenKind::Eof,
        ] {
            let syntax: SyntaxKind = kind.into();
            let raw = syntax as u16;
            // Round-trip through the raw representation used by rowan.
            let back = unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) };
            assert_eq!(back, syntax);
        }
    }
}
