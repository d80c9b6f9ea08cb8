//! Expression nodes.

use partiql_common::value::Value;

use crate::ast::query::Select;
use crate::ast::types::DataType;
use crate::ast::{CaseSensitivity, Metas, ScopeQualifier, SetQuantifier};

/// Any expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value: number, string, timestamp, boolean, or null.
    Literal { value: Value, metas: Metas },
    /// The `MISSING` literal, distinct from null in the data model.
    LiteralMissing { metas: Metas },
    /// A variable reference.
    VarRef {
        name: String,
        case: CaseSensitivity,
        scope: ScopeQualifier,
        metas: Metas,
    },
    /// List constructor, from `[..]`, parenthesized lists, and `IN` lists.
    List { items: Vec<Expr>, metas: Metas },
    /// Bag constructor, from `<< .. >>` and `VALUES`.
    Bag { items: Vec<Expr>, metas: Metas },
    /// Struct constructor: `{k: v, ...}`.
    Struct { fields: Vec<StructField>, metas: Metas },
    /// N-ary operator application, including function calls (the callee
    /// is the first argument).
    NAry {
        op: NAryOp,
        args: Vec<Expr>,
        metas: Metas,
    },
    /// Type-directed operators: `CAST(expr AS type)` and `expr IS type`.
    Typed {
        op: TypedOp,
        expr: Box<Expr>,
        data_type: DataType,
        metas: Metas,
    },
    /// Path navigation rooted at an expression, with at least one
    /// component.
    Path {
        root: Box<Expr>,
        components: Vec<PathComponent>,
        metas: Metas,
    },
    /// `CASE operand WHEN v THEN r ... [ELSE e] END`.
    SimpleCase {
        operand: Box<Expr>,
        when_clauses: Vec<WhenClause>,
        else_clause: Option<Box<Expr>>,
        metas: Metas,
    },
    /// `CASE WHEN cond THEN r ... [ELSE e] END`.
    SearchedCase {
        when_clauses: Vec<WhenClause>,
        else_clause: Option<Box<Expr>>,
        metas: Metas,
    },
    /// Aggregate call with exactly one argument.
    CallAgg {
        func: Box<Expr>,
        quantifier: SetQuantifier,
        arg: Box<Expr>,
        metas: Metas,
    },
    /// `COUNT(*)` -- the only permitted wildcard-argument aggregate.
    CallAggWildcard { func: Box<Expr>, metas: Metas },
    /// A SELECT-FROM-WHERE block in expression position.
    Select(Box<Select>),
}

/// One `key : value` member of a struct constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub key: Expr,
    pub value: Expr,
}

/// One `WHEN ... THEN ...` branch of a CASE expression. For the simple
/// form, `condition` is the comparand value.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PathComponent {
    /// `.name` or `[expr]`. Dotted members on unquoted identifiers are
    /// case-insensitive; everything else is case-sensitive.
    Expr { expr: Expr, case: CaseSensitivity },
    /// `[*]`
    Wildcard,
    /// `.*`
    Unpivot,
}

/// Operators of [`Expr::NAry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NAryOp {
    Not,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    /// Multiplication.
    Star,
    Div,
    Mod,
    Concat,
    Like,
    In,
    Between,
    /// Function call; `args[0]` is the callee reference.
    Call,
}

/// Operators of [`Expr::Typed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedOp {
    Cast,
    Is,
}

impl Expr {
    /// The metas of this node.
    pub fn metas(&self) -> &Metas {
        match self {
            Expr::Literal { metas, .. }
            | Expr::LiteralMissing { metas }
            | Expr::VarRef { metas, .. }
            | Expr::List { metas, .. }
            | Expr::Bag { metas, .. }
            | Expr::Struct { metas, .. }
            | Expr::NAry { metas, .. }
            | Expr::Typed { metas, .. }
            | Expr::Path { metas, .. }
            | Expr::SimpleCase { metas, .. }
            | Expr::SearchedCase { metas, .. }
            | Expr::CallAgg { metas, .. }
            | Expr::CallAggWildcard { metas, .. } => metas,
            Expr::Select(select) => &select.metas,
        }
    }

    /// A copy of this expression with all source locations cleared, for
    /// structural comparison: two parses of equivalent surface forms are
    /// identical up to locations. Semantic meta markers
    /// (`legacy_logical_not`, `is_implicit_join`) are structural and
    /// survive.
    pub fn without_metas(&self) -> Expr {
        match self {
            Expr::Literal { value, metas } => Expr::Literal {
                value: value.clone(),
                metas: metas.without_location(),
            },
            Expr::LiteralMissing { metas } => Expr::LiteralMissing {
                metas: metas.without_location(),
            },
            Expr::VarRef {
                name,
                case,
                scope,
                metas,
            } => Expr::VarRef {
                name: name.clone(),
                case: *case,
                scope: *scope,
                metas: metas.without_location(),
            },
            Expr::List { items, metas } => Expr::List {
                items: items.iter().map(Expr::without_metas).collect(),
                metas: metas.without_location(),
            },
            Expr::Bag { items, metas } => Expr::Bag {
                items: items.iter().map(Expr::without_metas).collect(),
                metas: metas.without_location(),
            },
            Expr::Struct { fields, metas } => Expr::Struct {
                fields: fields
                    .iter()
                    .map(|f| StructField {
                        key: f.key.without_metas(),
                        value: f.value.without_metas(),
                    })
                    .collect(),
                metas: metas.without_location(),
            },
            Expr::NAry { op, args, metas } => Expr::NAry {
                op: *op,
                args: args.iter().map(Expr::without_metas).collect(),
                metas: metas.without_location(),
            },
            Expr::Typed {
                op,
                expr,
                data_type,
                metas,
            } => Expr::Typed {
                op: *op,
                expr: Box::new(expr.without_metas()),
                data_type: data_type.without_metas(),
                metas: metas.without_location(),
            },
            Expr::Path {
                root,
                components,
                metas,
            } => Expr::Path {
                root: Box::new(root.without_metas()),
                components: components.iter().map(PathComponent::without_metas).collect(),
                metas: metas.without_location(),
            },
            Expr::SimpleCase {
                operand,
                when_clauses,
                else_clause,
                metas,
            } => Expr::SimpleCase {
                operand: Box::new(operand.without_metas()),
                when_clauses: when_clauses.iter().map(WhenClause::without_metas).collect(),
                else_clause: else_clause.as_ref().map(|e| Box::new(e.without_metas())),
                metas: metas.without_location(),
            },
            Expr::SearchedCase {
                when_clauses,
                else_clause,
                metas,
            } => Expr::SearchedCase {
                when_clauses: when_clauses.iter().map(WhenClause::without_metas).collect(),
                else_clause: else_clause.as_ref().map(|e| Box::new(e.without_metas())),
                metas: metas.without_location(),
            },
            Expr::CallAgg {
                func,
                quantifier,
                arg,
                metas,
            } => Expr::CallAgg {
                func: Box::new(func.without_metas()),
                quantifier: *quantifier,
                arg: Box::new(arg.without_metas()),
                metas: metas.without_location(),
            },
            Expr::CallAggWildcard { func, metas } => Expr::CallAggWildcard {
                func: Box::new(func.without_metas()),
                metas: metas.without_location(),
            },
            Expr::Select(select) => Expr::Select(Box::new(select.without_metas())),
        }
    }
}

impl WhenClause {
    fn without_metas(&self) -> WhenClause {
        WhenClause {
            condition: self.condition.without_metas(),
            result: self.result.without_metas(),
        }
    }
}

impl PathComponent {
    fn without_metas(&self) -> PathComponent {
        match self {
            PathComponent::Expr { expr, case } => PathComponent::Expr {
                expr: expr.without_metas(),
                case: *case,
            },
            PathComponent::Wildcard => PathComponent::Wildcard,
            PathComponent::Unpivot => PathComponent::Unpivot,
        }
    }
}
