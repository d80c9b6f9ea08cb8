//! The public PartiQL AST.
//!
//! One tagged sum type per category, produced by lowering the parse tree.
//! Every node carries a [`Metas`] bag: at minimum a source location, plus
//! semantic markers for normalized surface forms (`legacy_logical_not` on
//! the `NOT` wrapper of `IS NOT`/`NOT LIKE`/`NOT BETWEEN`/`NOT IN`, and
//! `is_implicit_join` on joins arising from comma-separated from items).
//!
//! The AST is immutable and self-contained: no references into the parse
//! tree or the source text survive lowering.

pub mod expr;
pub mod query;
pub mod types;

pub use expr::{Expr, NAryOp, PathComponent, StructField, TypedOp, WhenClause};
pub use query::{
    FromSource, GroupBy, GroupByItem, GroupingStrategy, JoinOp, Select, SelectListItem,
    SelectProjection,
};
pub use types::{DataType, SqlType};

/// 1-based line/column position in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// Non-semantic annotations attached to every AST node.
///
/// Each known meta tag is a field; this keeps lookups typed and matches
/// exhaustive. Nodes synthesized during lowering (negation wrappers,
/// implicit join conditions) carry the location of the surface token that
/// caused them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metas {
    /// Where in the source this node begins.
    pub location: Option<SourceLocation>,
    /// Set on the `NOT` wrapper produced by normalizing a negated surface
    /// operator into its positive form.
    pub legacy_logical_not: bool,
    /// Set on `FromSource::Join` nodes produced from comma-separated from
    /// items.
    pub is_implicit_join: bool,
}

impl Metas {
    /// Metas carrying just a source location.
    pub fn at(line: u32, column: u32) -> Self {
        Metas {
            location: Some(SourceLocation { line, column }),
            ..Metas::default()
        }
    }

    /// Mark this node as a normalized negation wrapper.
    pub fn with_legacy_logical_not(mut self) -> Self {
        self.legacy_logical_not = true;
        self
    }

    /// Mark this join as implicit (comma-separated from items).
    pub fn with_implicit_join(mut self) -> Self {
        self.is_implicit_join = true;
        self
    }

    /// This metas with the source location cleared. The semantic markers
    /// are structural and survive; only positions are scrubbed, so two
    /// parses of equivalent surface forms compare equal.
    pub fn without_location(self) -> Self {
        Metas {
            location: None,
            ..self
        }
    }
}

/// Whether a variable or path-member reference matches bindings
/// case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// How a variable reference resolves: against the enclosing query scopes
/// or only the lexical scope (`@name`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeQualifier {
    Unqualified,
    Lexical,
}

/// `ALL` (the default) or `DISTINCT`, on SELECT and aggregate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantifier {
    All,
    Distinct,
}
