//! SELECT-FROM-WHERE nodes: projections, from sources, joins, grouping.

use crate::ast::expr::Expr;
use crate::ast::{Metas, SetQuantifier};

/// A SELECT-FROM-WHERE block.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub set_quantifier: SetQuantifier,
    pub projection: SelectProjection,
    pub from: FromSource,
    pub where_clause: Option<Expr>,
    pub group_by: Option<GroupBy>,
    pub having: Option<Expr>,
    pub limit: Option<Expr>,
    pub metas: Metas,
}

/// What a SELECT projects.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectProjection {
    /// `SELECT item, item, ...`
    List(Vec<SelectListItem>),
    /// `SELECT VALUE expr`
    Value(Expr),
    /// `PIVOT value AT key`
    Pivot { key: Expr, value: Expr },
}

/// One item of a projection list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectListItem {
    /// Bare `*`; must be the sole item of its list.
    Star { metas: Metas },
    /// `expr.path.*` -- project all attributes of the prefix.
    ProjectAll { expr: Expr },
    /// `expr [[AS] alias]`
    Expr { expr: Expr, as_alias: Option<String> },
}

/// A source in the FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    /// `expr [AS a] [AT b]`
    Expr {
        expr: Expr,
        as_alias: Option<String>,
        at_alias: Option<String>,
    },
    /// `UNPIVOT expr [AS a] [AT b]`
    Unpivot {
        expr: Expr,
        as_alias: Option<String>,
        at_alias: Option<String>,
        metas: Metas,
    },
    /// Two sources joined. Comma-separated items fold into inner joins
    /// with a literal-true condition and the `is_implicit_join` meta.
    Join {
        op: JoinOp,
        left: Box<FromSource>,
        right: Box<FromSource>,
        condition: Expr,
        metas: Metas,
    },
}

/// Join operator of [`FromSource::Join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOp {
    Inner,
    Left,
    Right,
    Outer,
}

/// `GROUP [PARTIAL] BY keys [GROUP AS name]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub strategy: GroupingStrategy,
    pub items: Vec<GroupByItem>,
    pub group_as_name: Option<String>,
}

/// One group-by key with its optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByItem {
    pub expr: Expr,
    pub as_alias: Option<String>,
}

/// Whether every binding must fall into a group (`FULL`, the default) or
/// groups may be partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    Full,
    Partial,
}

impl Select {
    /// A copy of this node with all source locations cleared. See
    /// [`Expr::without_metas`](crate::ast::Expr::without_metas).
    pub fn without_metas(&self) -> Select {
        Select {
            set_quantifier: self.set_quantifier,
            projection: self.projection.without_metas(),
            from: self.from.without_metas(),
            where_clause: self.where_clause.as_ref().map(Expr::without_metas),
            group_by: self.group_by.as_ref().map(GroupBy::without_metas),
            having: self.having.as_ref().map(Expr::without_metas),
            limit: self.limit.as_ref().map(Expr::without_metas),
            metas: self.metas.without_location(),
        }
    }
}

impl SelectProjection {
    fn without_metas(&self) -> SelectProjection {
        match self {
            SelectProjection::List(items) => {
                SelectProjection::List(items.iter().map(SelectListItem::without_metas).collect())
            }
            SelectProjection::Value(expr) => SelectProjection::Value(expr.without_metas()),
            SelectProjection::Pivot { key, value } => SelectProjection::Pivot {
                key: key.without_metas(),
                value: value.without_metas(),
            },
        }
    }
}

impl SelectListItem {
    fn without_metas(&self) -> SelectListItem {
        match self {
            SelectListItem::Star { metas } => SelectListItem::Star {
                metas: metas.without_location(),
            },
            SelectListItem::ProjectAll { expr } => SelectListItem::ProjectAll {
                expr: expr.without_metas(),
            },
            SelectListItem::Expr { expr, as_alias } => SelectListItem::Expr {
                expr: expr.without_metas(),
                as_alias: as_alias.clone(),
            },
        }
    }
}

impl FromSource {
    fn without_metas(&self) -> FromSource {
        match self {
            FromSource::Expr {
                expr,
                as_alias,
                at_alias,
            } => FromSource::Expr {
                expr: expr.without_metas(),
                as_alias: as_alias.clone(),
                at_alias: at_alias.clone(),
            },
            FromSource::Unpivot {
                expr,
                as_alias,
                at_alias,
                metas,
            } => FromSource::Unpivot {
                expr: expr.without_metas(),
                as_alias: as_alias.clone(),
                at_alias: at_alias.clone(),
                metas: metas.without_location(),
            },
            FromSource::Join {
                op,
                left,
                right,
                condition,
                metas,
            } => FromSource::Join {
                op: *op,
                left: Box::new(left.without_metas()),
                right: Box::new(right.without_metas()),
                condition: condition.without_metas(),
                metas: metas.without_location(),
            },
        }
    }
}

impl GroupBy {
    fn without_metas(&self) -> GroupBy {
        GroupBy {
            strategy: self.strategy,
            items: self
                .items
                .iter()
                .map(|item| GroupByItem {
                    expr: item.expr.without_metas(),
                    as_alias: item.as_alias.clone(),
                })
                .collect(),
            group_as_name: self.group_as_name.clone(),
        }
    }
}
