//! Structured errors for the PartiQL front-end.
//!
//! Every failure in the pipeline -- lexical, structural, or semantic --
//! surfaces as a single [`SyntaxError`]: a closed [`ErrorCode`] tag, a
//! human-readable message, and a small property bag. The bag always holds
//! the 1-based line and column of the offending position, plus any
//! code-specific properties (expected token type, cast target, arity
//! bounds, ...). Consumers render errors however they like; no textual
//! format is mandated beyond `Display`.

use std::fmt;

use rustc_hash::FxHashMap;

/// Closed catalogue of front-end error codes.
///
/// The `Semantic*`/`Evaluator*` codes are never produced by the parser
/// itself; they are defined here so downstream passes share one catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ── Lexical ────────────────────────────────────────────────────────
    LexInvalidChar,
    LexInvalidLiteral,
    LexUnterminatedString,
    LexUnterminatedComment,
    LexInvalidTimestamp,

    // ── Parse: structural ──────────────────────────────────────────────
    ParseExpectedTokenType,
    ParseExpected2TokenTypes,
    ParseExpectedExpression,
    ParseExpectedKeyword,
    ParseUnexpectedToken,
    ParseUnexpectedTerm,
    ParseUnknownOperator,
    ParseMalformedParseTree,

    // ── Parse: semantic ────────────────────────────────────────────────
    ParseExpectedIdentForAlias,
    ParseExpectedIdentForAt,
    ParseExpectedIdentForGroupName,
    ParseEmptySelect,
    ParseSelectMissingFrom,
    ParseAsteriskIsNotAloneInSelectList,
    ParseInvalidPathComponent,
    ParseInvalidContextForWildcardInSelectList,
    ParseCannotMixSqbAndWildcardInSelectList,
    ParseUnsupportedLiteralsGroupBy,
    ParseNonUnaryAggregateFunctionCall,
    ParseUnsupportedCallWithStar,
    ParseCastArity,
    ParseInvalidTypeParam,
    ParseExpectedTypeName,
    ParseMissingIdentAfterAt,
    ParseExpectedLeftParenAfterCast,
    ParseExpectedLeftParenBuiltinFunctionCall,
    ParseExpectedRightParenBuiltinFunctionCall,
    ParseExpectedArgumentDelimiter,
    ParseExpectedWhenClause,
    ParseExpectedDatePart,

    // ── Downstream (defined for interface completeness) ────────────────
    SemanticHavingUsedWithoutGroupBy,
    EvaluatorBindingDoesNotExist,
}

/// Keys of the error property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    LineNumber,
    ColumnNumber,
    TokenText,
    ExpectedTokenType,
    Keyword,
    CastTo,
    ExpectedArityMin,
    ExpectedArityMax,
    FunctionName,
    BindingName,
}

/// Property values are small scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(u64),
    Text(String),
}

impl PropertyValue {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A structured front-end error.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub message: String,
    pub properties: FxHashMap<Property, PropertyValue>,
}

impl SyntaxError {
    /// Create an error with an empty property bag.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            properties: FxHashMap::default(),
        }
    }

    /// Create an error positioned at a 1-based line and column.
    pub fn at(code: ErrorCode, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(code, message)
            .with(Property::LineNumber, PropertyValue::Integer(line as u64))
            .with(Property::ColumnNumber, PropertyValue::Integer(column as u64))
    }

    /// Attach a property, builder-style.
    pub fn with(mut self, key: Property, value: PropertyValue) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// The 1-based line number, if positioned.
    pub fn line(&self) -> Option<u64> {
        self.properties.get(&Property::LineNumber)?.as_integer()
    }

    /// The 1-based column number, if positioned.
    pub fn column(&self) -> Option<u64> {
        self.properties.get(&Property::ColumnNumber)?.as_integer()
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line(), self.column()) {
            (Some(line), Some(col)) => write!(f, "{} at {line}:{col}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}
