//! PartiQL parser: token stream -> event parser -> rowan parse tree ->
//! owned AST.
//!
//! The pipeline is strictly linear and purely functional. The lexer
//! produces a folded token stream; the event-based Pratt parser builds a
//! rowan green tree (the internal parse tree); the lowering pass walks
//! that tree and produces the public [`ast::Expr`], attaching source
//! locations and performing the semantic checks that need tree shape
//! (project-all rewriting, cast arity, literal group-by keys).
//!
//! A parse either yields a complete AST or exactly one [`SyntaxError`];
//! there are no partial results and no warning channel.

pub mod ast;
mod cst;
mod lower;
mod parser;
mod syntax_kind;

pub use cst::{PartiQlLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use partiql_common::error::{ErrorCode, Property, PropertyValue, SyntaxError};
pub use syntax_kind::SyntaxKind;

use lower::Lowerer;
use partiql_lexer::Lexer;
use rustc_hash::FxHashSet;

/// The aggregate functions recognized by default.
pub const STANDARD_AGGREGATE_FUNCTIONS: [&str; 5] = ["avg", "count", "max", "min", "sum"];

/// Parser configuration.
///
/// The aggregate-function set is part of the grammar (it decides whether
/// `name(..)` parses as [`ast::Expr::CallAgg`] or a plain call), so hosts
/// that register extra aggregates inject them here.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    aggregates: FxHashSet<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            aggregates: STANDARD_AGGREGATE_FUNCTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ParseOptions {
    /// Options with a custom aggregate-function set. Names are matched
    /// case-insensitively.
    pub fn with_aggregates(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            aggregates: names
                .into_iter()
                .map(|name| name.into().to_ascii_lowercase())
                .collect(),
        }
    }
}

/// Parse one expression statement into the AST.
///
/// A single trailing `;` is accepted; any other trailing input is
/// `PARSE_UNEXPECTED_TOKEN`.
///
/// ```
/// use partiql_parser::ast::Expr;
/// use partiql_parser::parse_expression;
///
/// let ast = parse_expression("SELECT v FROM data").unwrap();
/// assert!(matches!(ast, Expr::Select(_)));
/// ```
pub fn parse_expression(source: &str) -> Result<ast::Expr, SyntaxError> {
    parse_expression_with(source, &ParseOptions::default())
}

/// Like [`parse_expression`], with explicit [`ParseOptions`].
pub fn parse_expression_with(
    source: &str,
    options: &ParseOptions,
) -> Result<ast::Expr, SyntaxError> {
    let tokens = Lexer::tokenize(source)?;
    let mut p = parser::Parser::new(tokens, source, options.aggregates.clone());
    parser::parse_query(&mut p);
    let (green, mut errors) = p.build_tree();
    if let Some(error) = errors.drain(..).next() {
        return Err(error);
    }
    let root = SyntaxNode::new_root(green);
    Lowerer::new(source).lower_query(&root)
}
