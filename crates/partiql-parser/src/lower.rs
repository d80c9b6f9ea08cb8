//! Parse-tree -> AST lowering.
//!
//! A single recursive pass over the rowan tree that produces the public
//! AST. Responsibilities: building literal values through the value
//! model, attaching source-location metas, normalizing negated surface
//! operators into `NAry(Not, ..)` wrappers with the `legacy_logical_not`
//! meta, rewriting trailing-`.*` select-list paths into project-all items,
//! validating cast arity and type parameters, rejecting literal group-by
//! keys, and folding the from-list into left-associative joins.
//!
//! The lowering never panics on tree shape: an impossible shape (which
//! would mean a parser bug) surfaces as `PARSE_MALFORMED_PARSE_TREE`.

use partiql_common::error::{ErrorCode, Property, PropertyValue, SyntaxError};
use partiql_common::span::LineIndex;
use partiql_common::value::Value;

use crate::ast::{
    CaseSensitivity, DataType, Expr, FromSource, GroupBy, GroupByItem, GroupingStrategy, JoinOp,
    Metas, NAryOp, PathComponent, ScopeQualifier, Select, SelectListItem, SelectProjection,
    SetQuantifier, SqlType, StructField, TypedOp, WhenClause,
};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

pub(crate) struct Lowerer {
    line_index: LineIndex,
}

impl Lowerer {
    pub(crate) fn new(source: &str) -> Self {
        Self {
            line_index: LineIndex::new(source),
        }
    }

    /// Lower the QUERY root to its single expression.
    pub(crate) fn lower_query(&self, root: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let expr_node = root
            .children()
            .find(|n| n.kind().is_expr())
            .ok_or_else(|| self.malformed(root))?;
        self.lower_expr(&expr_node)
    }

    // ── Metas and errors ───────────────────────────────────────────────

    fn token_metas(&self, token: &SyntaxToken) -> Metas {
        let (line, column) = self.line_index.position(u32::from(token.text_range().start()));
        Metas::at(line, column)
    }

    /// Metas positioned at the first significant token of a node.
    fn node_metas(&self, node: &SyntaxNode) -> Metas {
        match first_significant_token(node) {
            Some(token) => self.token_metas(&token),
            None => Metas::default(),
        }
    }

    fn error_at_token(
        &self,
        token: &SyntaxToken,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> SyntaxError {
        let (line, column) = self.line_index.position(u32::from(token.text_range().start()));
        SyntaxError::at(code, message, line, column)
    }

    fn error_at_node(
        &self,
        node: &SyntaxNode,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> SyntaxError {
        match first_significant_token(node) {
            Some(token) => self.error_at_token(&token, code, message),
            None => SyntaxError::new(code, message),
        }
    }

    fn malformed(&self, node: &SyntaxNode) -> SyntaxError {
        self.error_at_node(
            node,
            ErrorCode::ParseMalformedParseTree,
            format!("malformed parse tree at {:?}", node.kind()),
        )
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn lower_expr(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        match node.kind() {
            SyntaxKind::LITERAL => self.lower_literal(node),
            SyntaxKind::VAR_REF => self.lower_var_ref(node),
            SyntaxKind::PAREN_EXPR => {
                let inner = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
                self.lower_expr(&inner)
            }
            SyntaxKind::LIST_EXPR => Ok(Expr::List {
                items: self.lower_expr_children(node)?,
                metas: self.node_metas(node),
            }),
            SyntaxKind::BAG_EXPR => Ok(Expr::Bag {
                items: self.lower_expr_children(node)?,
                metas: self.node_metas(node),
            }),
            SyntaxKind::STRUCT_EXPR => self.lower_struct(node),
            SyntaxKind::NOT_EXPR => {
                let inner = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
                Ok(Expr::NAry {
                    op: NAryOp::Not,
                    args: vec![self.lower_expr(&inner)?],
                    metas: self.node_metas(node),
                })
            }
            SyntaxKind::UNARY_EXPR => self.lower_unary(node),
            SyntaxKind::BINARY_EXPR => self.lower_binary(node),
            SyntaxKind::IS_EXPR => self.lower_is(node),
            SyntaxKind::BETWEEN_EXPR => self.lower_between(node),
            SyntaxKind::LIKE_EXPR => self.lower_like(node),
            SyntaxKind::IN_EXPR => self.lower_in(node),
            SyntaxKind::PATH_EXPR => self.lower_path(node),
            SyntaxKind::CALL_EXPR => self.lower_call(node),
            SyntaxKind::AGG_CALL => self.lower_agg_call(node),
            SyntaxKind::CAST_EXPR => self.lower_cast(node),
            SyntaxKind::CASE_EXPR => self.lower_case(node),
            SyntaxKind::SELECT_EXPR => self.lower_select(node),
            SyntaxKind::VALUES_EXPR => self.lower_values(node),
            SyntaxKind::SUBSTRING_EXPR => self.lower_substring(node),
            SyntaxKind::TRIM_EXPR => self.lower_trim(node),
            SyntaxKind::EXTRACT_EXPR => self.lower_extract(node),
            _ => Err(self.malformed(node)),
        }
    }

    fn lower_expr_children(&self, node: &SyntaxNode) -> Result<Vec<Expr>, SyntaxError> {
        node.children()
            .filter(|n| n.kind().is_expr())
            .map(|n| self.lower_expr(&n))
            .collect()
    }

    fn lower_literal(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let token = first_significant_token(node).ok_or_else(|| self.malformed(node))?;
        let metas = self.token_metas(&token);
        let value = match token.kind() {
            SyntaxKind::INT_LITERAL => Value::parse_integer(token.text()).map_err(|e| {
                self.error_at_token(&token, ErrorCode::LexInvalidLiteral, e.message)
            })?,
            SyntaxKind::DECIMAL_LITERAL => Value::parse_decimal(token.text()).map_err(|e| {
                self.error_at_token(&token, ErrorCode::LexInvalidLiteral, e.message)
            })?,
            SyntaxKind::STRING_LITERAL => Value::String(unquote(token.text(), '\'')),
            SyntaxKind::TIMESTAMP_LITERAL => {
                Value::parse_timestamp(&unquote(token.text(), '`')).map_err(|e| {
                    self.error_at_token(&token, ErrorCode::LexInvalidTimestamp, e.message)
                })?
            }
            SyntaxKind::TRUE_KW => Value::Boolean(true),
            SyntaxKind::FALSE_KW => Value::Boolean(false),
            SyntaxKind::NULL_KW => Value::Null,
            SyntaxKind::MISSING_KW => return Ok(Expr::LiteralMissing { metas }),
            _ => return Err(self.malformed(node)),
        };
        Ok(Expr::Literal { value, metas })
    }

    fn lower_var_ref(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let scope = if token_of_kind(node, SyntaxKind::AT_SIGN).is_some() {
            ScopeQualifier::Lexical
        } else {
            ScopeQualifier::Unqualified
        };
        let ident = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::QUOTED_IDENT))
            .ok_or_else(|| self.malformed(node))?;
        let (name, case) = match ident.kind() {
            SyntaxKind::QUOTED_IDENT => (unquote(ident.text(), '"'), CaseSensitivity::Sensitive),
            _ => (ident.text().to_string(), CaseSensitivity::Insensitive),
        };
        Ok(Expr::VarRef {
            name,
            case,
            scope,
            metas: self.node_metas(node),
        })
    }

    fn lower_struct(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let mut fields = Vec::new();
        for field in children_of_kind(node, SyntaxKind::STRUCT_FIELD) {
            let exprs = self.lower_expr_children(&field)?;
            let mut exprs = exprs.into_iter();
            let (key, value) = match (exprs.next(), exprs.next()) {
                (Some(key), Some(value)) => (key, value),
                _ => return Err(self.malformed(&field)),
            };
            fields.push(StructField { key, value });
        }
        Ok(Expr::Struct {
            fields,
            metas: self.node_metas(node),
        })
    }

    fn lower_unary(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op = tokens(node)
            .find_map(|t| match t.kind() {
                SyntaxKind::PLUS => Some(NAryOp::Plus),
                SyntaxKind::MINUS => Some(NAryOp::Minus),
                _ => None,
            })
            .ok_or_else(|| self.malformed(node))?;
        let inner = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        Ok(Expr::NAry {
            op,
            args: vec![self.lower_expr(&inner)?],
            metas: self.node_metas(node),
        })
    }

    fn lower_binary(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op_token = tokens(node)
            .find(|t| binary_op(t.kind()).is_some())
            .ok_or_else(|| self.malformed(node))?;
        let op = binary_op(op_token.kind()).expect("kind was just matched");
        let args = self.lower_expr_children(node)?;
        if args.len() != 2 {
            return Err(self.malformed(node));
        }
        Ok(Expr::NAry {
            op,
            args,
            metas: self.token_metas(&op_token),
        })
    }

    fn lower_is(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op_token = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::IS_KW | SyntaxKind::IS_NOT_KW))
            .ok_or_else(|| self.malformed(node))?;
        let value = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        let type_node =
            child_of_kind(node, SyntaxKind::TYPE_REF).ok_or_else(|| self.malformed(node))?;
        let typed = Expr::Typed {
            op: TypedOp::Is,
            expr: Box::new(self.lower_expr(&value)?),
            data_type: self.lower_type(&type_node)?,
            metas: self.token_metas(&op_token),
        };
        if op_token.kind() == SyntaxKind::IS_NOT_KW {
            Ok(self.negate(typed, &op_token))
        } else {
            Ok(typed)
        }
    }

    fn lower_between(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op_token = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::BETWEEN_KW | SyntaxKind::NOT_BETWEEN_KW))
            .ok_or_else(|| self.malformed(node))?;
        let args = self.lower_expr_children(node)?;
        if args.len() != 3 {
            return Err(self.malformed(node));
        }
        let between = Expr::NAry {
            op: NAryOp::Between,
            args,
            metas: self.token_metas(&op_token),
        };
        if op_token.kind() == SyntaxKind::NOT_BETWEEN_KW {
            Ok(self.negate(between, &op_token))
        } else {
            Ok(between)
        }
    }

    fn lower_like(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op_token = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::LIKE_KW | SyntaxKind::NOT_LIKE_KW))
            .ok_or_else(|| self.malformed(node))?;
        let args = self.lower_expr_children(node)?;
        if args.len() != 2 && args.len() != 3 {
            return Err(self.malformed(node));
        }
        let like = Expr::NAry {
            op: NAryOp::Like,
            args,
            metas: self.token_metas(&op_token),
        };
        if op_token.kind() == SyntaxKind::NOT_LIKE_KW {
            Ok(self.negate(like, &op_token))
        } else {
            Ok(like)
        }
    }

    fn lower_in(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let op_token = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::IN_KW | SyntaxKind::NOT_IN_KW))
            .ok_or_else(|| self.malformed(node))?;
        let args = self.lower_expr_children(node)?;
        if args.len() != 2 {
            return Err(self.malformed(node));
        }
        let in_expr = Expr::NAry {
            op: NAryOp::In,
            args,
            metas: self.token_metas(&op_token),
        };
        if op_token.kind() == SyntaxKind::NOT_IN_KW {
            Ok(self.negate(in_expr, &op_token))
        } else {
            Ok(in_expr)
        }
    }

    /// Wrap a normalized positive operator in `NOT`, tagging the wrapper
    /// with `legacy_logical_not`.
    fn negate(&self, inner: Expr, op_token: &SyntaxToken) -> Expr {
        Expr::NAry {
            op: NAryOp::Not,
            args: vec![inner],
            metas: self.token_metas(op_token).with_legacy_logical_not(),
        }
    }

    fn lower_path(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let root = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        let mut components = Vec::new();
        for child in node.children() {
            match child.kind() {
                SyntaxKind::PATH_MEMBER => components.push(self.lower_path_member(&child)?),
                SyntaxKind::PATH_INDEX => {
                    let index = first_expr_child(&child).ok_or_else(|| self.malformed(&child))?;
                    components.push(PathComponent::Expr {
                        expr: self.lower_expr(&index)?,
                        case: CaseSensitivity::Sensitive,
                    });
                }
                SyntaxKind::PATH_WILDCARD => components.push(PathComponent::Wildcard),
                SyntaxKind::PATH_UNPIVOT => components.push(PathComponent::Unpivot),
                _ => {}
            }
        }
        if components.is_empty() {
            return Err(self.malformed(node));
        }
        Ok(Expr::Path {
            root: Box::new(self.lower_expr(&root)?),
            components,
            metas: self.node_metas(node),
        })
    }

    /// `.name` -- the member becomes a string literal; unquoted members
    /// are case-insensitive, quoted ones case-sensitive.
    fn lower_path_member(&self, node: &SyntaxNode) -> Result<PathComponent, SyntaxError> {
        let ident = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::QUOTED_IDENT))
            .ok_or_else(|| self.malformed(node))?;
        let (name, case) = match ident.kind() {
            SyntaxKind::QUOTED_IDENT => (unquote(ident.text(), '"'), CaseSensitivity::Sensitive),
            _ => (ident.text().to_string(), CaseSensitivity::Insensitive),
        };
        Ok(PathComponent::Expr {
            expr: Expr::Literal {
                value: Value::String(name),
                metas: self.token_metas(&ident),
            },
            case,
        })
    }

    fn lower_call(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let name = token_of_kind(node, SyntaxKind::IDENT).ok_or_else(|| self.malformed(node))?;
        let arg_list =
            child_of_kind(node, SyntaxKind::ARG_LIST).ok_or_else(|| self.malformed(node))?;
        let mut args = vec![Expr::VarRef {
            name: name.text().to_string(),
            case: CaseSensitivity::Insensitive,
            scope: ScopeQualifier::Unqualified,
            metas: self.token_metas(&name),
        }];
        args.extend(self.lower_expr_children(&arg_list)?);
        Ok(Expr::NAry {
            op: NAryOp::Call,
            args,
            metas: self.token_metas(&name),
        })
    }

    fn lower_agg_call(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let name = token_of_kind(node, SyntaxKind::IDENT).ok_or_else(|| self.malformed(node))?;
        let metas = self.token_metas(&name);
        // Aggregate names are canonicalized to lowercase.
        let func = Box::new(Expr::VarRef {
            name: name.text().to_ascii_lowercase(),
            case: CaseSensitivity::Insensitive,
            scope: ScopeQualifier::Unqualified,
            metas,
        });

        if token_of_kind(node, SyntaxKind::STAR).is_some() {
            return Ok(Expr::CallAggWildcard { func, metas });
        }

        let quantifier = if token_of_kind(node, SyntaxKind::DISTINCT_KW).is_some() {
            SetQuantifier::Distinct
        } else {
            SetQuantifier::All
        };
        let arg = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        Ok(Expr::CallAgg {
            func,
            quantifier,
            arg: Box::new(self.lower_expr(&arg)?),
            metas,
        })
    }

    fn lower_cast(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let value = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        let type_node =
            child_of_kind(node, SyntaxKind::TYPE_REF).ok_or_else(|| self.malformed(node))?;
        Ok(Expr::Typed {
            op: TypedOp::Cast,
            expr: Box::new(self.lower_expr(&value)?),
            data_type: self.lower_type(&type_node)?,
            metas: self.node_metas(node),
        })
    }

    /// Lower a TYPE_REF and validate its parameter arity against the type
    /// table.
    fn lower_type(&self, node: &SyntaxNode) -> Result<DataType, SyntaxError> {
        let name_token = tokens(node)
            .find(|t| sql_type(t.kind()).is_some())
            .ok_or_else(|| self.malformed(node))?;
        let sql_type = sql_type(name_token.kind()).expect("kind was just matched");

        let mut args = Vec::new();
        if let Some(arg_list) = child_of_kind(node, SyntaxKind::TYPE_ARG_LIST) {
            for token in tokens(&arg_list).filter(|t| t.kind() == SyntaxKind::INT_LITERAL) {
                let value = token.text().parse::<u64>().map_err(|_| {
                    self.error_at_token(
                        &token,
                        ErrorCode::ParseInvalidTypeParam,
                        format!("type parameter out of range: {}", token.text()),
                    )
                })?;
                args.push(value);
            }
        }

        let arity = sql_type.arity();
        if !arity.contains(&args.len()) {
            let error = self
                .error_at_node(
                    node,
                    ErrorCode::ParseCastArity,
                    format!(
                        "`{}` takes between {} and {} type parameters, found {}",
                        sql_type.name(),
                        arity.start(),
                        arity.end(),
                        args.len()
                    ),
                )
                .with(Property::CastTo, PropertyValue::Text(sql_type.name().to_string()))
                .with(
                    Property::ExpectedArityMin,
                    PropertyValue::Integer(*arity.start() as u64),
                )
                .with(
                    Property::ExpectedArityMax,
                    PropertyValue::Integer(*arity.end() as u64),
                );
            return Err(error);
        }

        Ok(DataType {
            sql_type,
            args,
            metas: self.node_metas(node),
        })
    }

    fn lower_case(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let metas = self.node_metas(node);

        let mut when_clauses = Vec::new();
        for when in children_of_kind(node, SyntaxKind::WHEN_CLAUSE) {
            let exprs = self.lower_expr_children(&when)?;
            let mut exprs = exprs.into_iter();
            let (condition, result) = match (exprs.next(), exprs.next()) {
                (Some(condition), Some(result)) => (condition, result),
                _ => return Err(self.malformed(&when)),
            };
            when_clauses.push(WhenClause { condition, result });
        }

        let else_clause = match child_of_kind(node, SyntaxKind::ELSE_CLAUSE) {
            Some(else_node) => {
                let inner =
                    first_expr_child(&else_node).ok_or_else(|| self.malformed(&else_node))?;
                Some(Box::new(self.lower_expr(&inner)?))
            }
            None => None,
        };

        // An operand expression before the first WHEN makes this the
        // simple form.
        match first_expr_child(node) {
            Some(operand) => Ok(Expr::SimpleCase {
                operand: Box::new(self.lower_expr(&operand)?),
                when_clauses,
                else_clause,
                metas,
            }),
            None => Ok(Expr::SearchedCase {
                when_clauses,
                else_clause,
                metas,
            }),
        }
    }

    fn lower_values(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let mut rows = Vec::new();
        for row in children_of_kind(node, SyntaxKind::VALUES_ROW) {
            rows.push(Expr::List {
                items: self.lower_expr_children(&row)?,
                metas: self.node_metas(&row),
            });
        }
        Ok(Expr::Bag {
            items: rows,
            metas: self.node_metas(node),
        })
    }

    fn lower_substring(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let metas = self.node_metas(node);
        let mut args = vec![self.builtin_callee("substring", metas)];
        args.extend(self.lower_expr_children(node)?);
        if args.len() < 3 || args.len() > 4 {
            return Err(self.malformed(node));
        }
        Ok(Expr::NAry {
            op: NAryOp::Call,
            args,
            metas,
        })
    }

    /// TRIM lowers to a call with the canonical argument order
    /// (specification, characters, source); absent prefix arguments are
    /// simply absent.
    fn lower_trim(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let metas = self.node_metas(node);
        let mut args = vec![self.builtin_callee("trim", metas)];
        if let Some(spec) = tokens(node).find(|t| t.kind().is_trim_spec()) {
            args.push(Expr::Literal {
                value: Value::Symbol(spec.text().to_ascii_lowercase()),
                metas: self.token_metas(&spec),
            });
        }
        args.extend(self.lower_expr_children(node)?);
        if args.len() < 2 || args.len() > 4 {
            return Err(self.malformed(node));
        }
        Ok(Expr::NAry {
            op: NAryOp::Call,
            args,
            metas,
        })
    }

    fn lower_extract(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let metas = self.node_metas(node);
        let part = tokens(node)
            .find(|t| t.kind().is_date_part())
            .ok_or_else(|| self.malformed(node))?;
        let source = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        Ok(Expr::NAry {
            op: NAryOp::Call,
            args: vec![
                self.builtin_callee("extract", metas),
                Expr::Literal {
                    value: Value::Symbol(part.text().to_ascii_lowercase()),
                    metas: self.token_metas(&part),
                },
                self.lower_expr(&source)?,
            ],
            metas,
        })
    }

    fn builtin_callee(&self, name: &str, metas: Metas) -> Expr {
        Expr::VarRef {
            name: name.to_string(),
            case: CaseSensitivity::Insensitive,
            scope: ScopeQualifier::Unqualified,
            metas,
        }
    }

    // ── SELECT ─────────────────────────────────────────────────────────

    fn lower_select(&self, node: &SyntaxNode) -> Result<Expr, SyntaxError> {
        let metas = self.node_metas(node);

        let set_quantifier = if token_of_kind(node, SyntaxKind::DISTINCT_KW).is_some() {
            SetQuantifier::Distinct
        } else {
            SetQuantifier::All
        };

        let projection = if let Some(list) = child_of_kind(node, SyntaxKind::PROJECT_LIST) {
            SelectProjection::List(self.lower_project_list(&list)?)
        } else if let Some(value) = child_of_kind(node, SyntaxKind::PROJECT_VALUE) {
            let inner = first_expr_child(&value).ok_or_else(|| self.malformed(&value))?;
            SelectProjection::Value(self.lower_expr(&inner)?)
        } else if let Some(pivot) = child_of_kind(node, SyntaxKind::PROJECT_PIVOT) {
            // Surface order is `PIVOT value AT key`.
            let exprs = self.lower_expr_children(&pivot)?;
            let mut exprs = exprs.into_iter();
            let (value, key) = match (exprs.next(), exprs.next()) {
                (Some(value), Some(key)) => (value, key),
                _ => return Err(self.malformed(&pivot)),
            };
            SelectProjection::Pivot { key, value }
        } else {
            return Err(self.malformed(node));
        };

        let from_clause =
            child_of_kind(node, SyntaxKind::FROM_CLAUSE).ok_or_else(|| self.malformed(node))?;
        let from = self.lower_from_clause(&from_clause)?;

        let where_clause = self.lower_clause_expr(node, SyntaxKind::WHERE_CLAUSE)?;
        let group_by = match child_of_kind(node, SyntaxKind::GROUP_CLAUSE) {
            Some(group) => Some(self.lower_group_clause(&group)?),
            None => None,
        };
        let having = self.lower_clause_expr(node, SyntaxKind::HAVING_CLAUSE)?;
        let limit = self.lower_clause_expr(node, SyntaxKind::LIMIT_CLAUSE)?;

        Ok(Expr::Select(Box::new(Select {
            set_quantifier,
            projection,
            from,
            where_clause,
            group_by,
            having,
            limit,
            metas,
        })))
    }

    /// Lower the expression inside a single-expression clause node.
    fn lower_clause_expr(
        &self,
        parent: &SyntaxNode,
        kind: SyntaxKind,
    ) -> Result<Option<Expr>, SyntaxError> {
        match child_of_kind(parent, kind) {
            Some(clause) => {
                let inner = first_expr_child(&clause).ok_or_else(|| self.malformed(&clause))?;
                Ok(Some(self.lower_expr(&inner)?))
            }
            None => Ok(None),
        }
    }

    fn lower_project_list(
        &self,
        node: &SyntaxNode,
    ) -> Result<Vec<SelectListItem>, SyntaxError> {
        let mut items = Vec::new();
        for item in node.children() {
            match item.kind() {
                SyntaxKind::PROJECT_STAR => items.push(SelectListItem::Star {
                    metas: self.node_metas(&item),
                }),
                SyntaxKind::PROJECT_ITEM => {
                    let expr_node =
                        first_expr_child(&item).ok_or_else(|| self.malformed(&item))?;
                    let as_alias = self.alias_text(&item, SyntaxKind::AS_ALIAS)?;
                    if expr_node.kind() == SyntaxKind::PATH_EXPR {
                        items.push(self.lower_project_path(&expr_node, as_alias)?);
                    } else {
                        items.push(SelectListItem::Expr {
                            expr: self.lower_expr(&expr_node)?,
                            as_alias,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(items)
    }

    /// Disambiguate a path in the select list: reject `[*]` anywhere and
    /// interior `.*`; a trailing `.*` (with no `[..]` subscripts before
    /// it) rewrites the item to project-all over the path prefix.
    fn lower_project_path(
        &self,
        path: &SyntaxNode,
        as_alias: Option<String>,
    ) -> Result<SelectListItem, SyntaxError> {
        let components: Vec<SyntaxNode> = path
            .children()
            .filter(|c| {
                matches!(
                    c.kind(),
                    SyntaxKind::PATH_MEMBER
                        | SyntaxKind::PATH_INDEX
                        | SyntaxKind::PATH_WILDCARD
                        | SyntaxKind::PATH_UNPIVOT
                )
            })
            .collect();
        let count = components.len();

        for (i, component) in components.iter().enumerate() {
            match component.kind() {
                SyntaxKind::PATH_WILDCARD => {
                    return Err(self.error_at_node(
                        component,
                        ErrorCode::ParseInvalidContextForWildcardInSelectList,
                        "`[*]` is not allowed in a select list path",
                    ));
                }
                SyntaxKind::PATH_UNPIVOT if i + 1 != count => {
                    return Err(self.error_at_node(
                        component,
                        ErrorCode::ParseInvalidContextForWildcardInSelectList,
                        "`.*` must be the final component of a select list path",
                    ));
                }
                _ => {}
            }
        }

        let ends_with_unpivot = components
            .last()
            .is_some_and(|c| c.kind() == SyntaxKind::PATH_UNPIVOT);
        if !ends_with_unpivot {
            return Ok(SelectListItem::Expr {
                expr: self.lower_expr(path)?,
                as_alias,
            });
        }

        if components[..count - 1]
            .iter()
            .any(|c| c.kind() == SyntaxKind::PATH_INDEX)
        {
            return Err(self.error_at_node(
                path,
                ErrorCode::ParseCannotMixSqbAndWildcardInSelectList,
                "cannot mix `[..]` subscripts with a trailing `.*` in a select list path",
            ));
        }

        // Rewrite to project-all over the prefix, collapsing to the bare
        // root when only the root remains.
        let root_node = first_expr_child(path).ok_or_else(|| self.malformed(path))?;
        let root = self.lower_expr(&root_node)?;
        let prefix: Result<Vec<PathComponent>, SyntaxError> = components[..count - 1]
            .iter()
            .map(|c| match c.kind() {
                SyntaxKind::PATH_MEMBER => self.lower_path_member(c),
                SyntaxKind::PATH_INDEX => {
                    let index = first_expr_child(c).ok_or_else(|| self.malformed(c))?;
                    Ok(PathComponent::Expr {
                        expr: self.lower_expr(&index)?,
                        case: CaseSensitivity::Sensitive,
                    })
                }
                _ => Err(self.malformed(c)),
            })
            .collect();
        let prefix = prefix?;

        let expr = if prefix.is_empty() {
            root
        } else {
            Expr::Path {
                root: Box::new(root),
                components: prefix,
                metas: self.node_metas(path),
            }
        };
        Ok(SelectListItem::ProjectAll { expr })
    }

    // ── FROM ───────────────────────────────────────────────────────────

    fn lower_from_clause(&self, node: &SyntaxNode) -> Result<FromSource, SyntaxError> {
        let first = child_of_kind(node, SyntaxKind::FROM_SOURCE)
            .ok_or_else(|| self.malformed(node))?;
        let mut result = self.lower_from_source(&first)?;

        for join in children_of_kind(node, SyntaxKind::JOIN_CLAUSE) {
            let anchor = tokens(&join)
                .find(|t| {
                    matches!(
                        t.kind(),
                        SyntaxKind::COMMA
                            | SyntaxKind::INNER_JOIN_KW
                            | SyntaxKind::LEFT_JOIN_KW
                            | SyntaxKind::RIGHT_JOIN_KW
                            | SyntaxKind::OUTER_JOIN_KW
                    )
                })
                .ok_or_else(|| self.malformed(&join))?;
            let implicit = anchor.kind() == SyntaxKind::COMMA;
            let op = match anchor.kind() {
                SyntaxKind::LEFT_JOIN_KW => JoinOp::Left,
                SyntaxKind::RIGHT_JOIN_KW => JoinOp::Right,
                SyntaxKind::OUTER_JOIN_KW => JoinOp::Outer,
                _ => JoinOp::Inner,
            };

            let right_node = child_of_kind(&join, SyntaxKind::FROM_SOURCE)
                .ok_or_else(|| self.malformed(&join))?;
            let right = self.lower_from_source(&right_node)?;

            // Absent ON (comma joins, cross joins) means literal true.
            let condition = match child_of_kind(&join, SyntaxKind::ON_CLAUSE) {
                Some(on) => {
                    let inner = first_expr_child(&on).ok_or_else(|| self.malformed(&on))?;
                    self.lower_expr(&inner)?
                }
                None => Expr::Literal {
                    value: Value::Boolean(true),
                    metas: self.token_metas(&anchor),
                },
            };

            let mut metas = self.token_metas(&anchor);
            if implicit {
                metas = metas.with_implicit_join();
            }
            result = FromSource::Join {
                op,
                left: Box::new(result),
                right: Box::new(right),
                condition,
                metas,
            };
        }

        Ok(result)
    }

    fn lower_from_source(&self, node: &SyntaxNode) -> Result<FromSource, SyntaxError> {
        let expr_node = first_expr_child(node).ok_or_else(|| self.malformed(node))?;
        let expr = self.lower_expr(&expr_node)?;
        let as_alias = self.alias_text(node, SyntaxKind::AS_ALIAS)?;
        let at_alias = self.alias_text(node, SyntaxKind::AT_ALIAS)?;

        if token_of_kind(node, SyntaxKind::UNPIVOT_KW).is_some() {
            Ok(FromSource::Unpivot {
                expr,
                as_alias,
                at_alias,
                metas: self.node_metas(node),
            })
        } else {
            Ok(FromSource::Expr {
                expr,
                as_alias,
                at_alias,
            })
        }
    }

    // ── GROUP BY ───────────────────────────────────────────────────────

    fn lower_group_clause(&self, node: &SyntaxNode) -> Result<GroupBy, SyntaxError> {
        let strategy = if token_of_kind(node, SyntaxKind::PARTIAL_KW).is_some() {
            GroupingStrategy::Partial
        } else {
            GroupingStrategy::Full
        };

        let mut items = Vec::new();
        for key in children_of_kind(node, SyntaxKind::GROUP_KEY) {
            let expr_node = first_expr_child(&key).ok_or_else(|| self.malformed(&key))?;
            let expr = self.lower_expr(&expr_node)?;
            if matches!(expr, Expr::Literal { .. } | Expr::LiteralMissing { .. }) {
                return Err(self.error_at_node(
                    &key,
                    ErrorCode::ParseUnsupportedLiteralsGroupBy,
                    "literal group-by keys are not supported",
                ));
            }
            items.push(GroupByItem {
                expr,
                as_alias: self.alias_text(&key, SyntaxKind::AS_ALIAS)?,
            });
        }

        let group_as_name = match child_of_kind(node, SyntaxKind::GROUP_AS) {
            Some(group_as) => Some(self.binding_name(&group_as)?),
            None => None,
        };

        Ok(GroupBy {
            strategy,
            items,
            group_as_name,
        })
    }

    // ── Names and aliases ──────────────────────────────────────────────

    /// The identifier text inside an alias node of the given kind, if
    /// present.
    fn alias_text(
        &self,
        parent: &SyntaxNode,
        kind: SyntaxKind,
    ) -> Result<Option<String>, SyntaxError> {
        match child_of_kind(parent, kind) {
            Some(alias) => Ok(Some(self.binding_name(&alias)?)),
            None => Ok(None),
        }
    }

    fn binding_name(&self, node: &SyntaxNode) -> Result<String, SyntaxError> {
        let ident = tokens(node)
            .find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::QUOTED_IDENT))
            .ok_or_else(|| self.malformed(node))?;
        Ok(match ident.kind() {
            SyntaxKind::QUOTED_IDENT => unquote(ident.text(), '"'),
            _ => ident.text().to_string(),
        })
    }
}

// ── Tree helpers ───────────────────────────────────────────────────────

/// Direct token children of a node, trivia excluded.
fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
}

fn token_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    tokens(node).find(|token| token.kind() == kind)
}

fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|child| child.kind() == kind)
}

fn children_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Vec<SyntaxNode> {
    node.children().filter(|child| child.kind() == kind).collect()
}

fn first_expr_child(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.children().find(|child| child.kind().is_expr())
}

/// First non-trivia token anywhere under a node; its offset is the node's
/// source position.
fn first_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

/// Map a binary operator token to its AST operator.
fn binary_op(kind: SyntaxKind) -> Option<NAryOp> {
    let op = match kind {
        SyntaxKind::EQ => NAryOp::Eq,
        SyntaxKind::NOT_EQ => NAryOp::Ne,
        SyntaxKind::LT => NAryOp::Lt,
        SyntaxKind::LT_EQ => NAryOp::Lte,
        SyntaxKind::GT => NAryOp::Gt,
        SyntaxKind::GT_EQ => NAryOp::Gte,
        SyntaxKind::CONCAT => NAryOp::Concat,
        SyntaxKind::PLUS => NAryOp::Plus,
        SyntaxKind::MINUS => NAryOp::Minus,
        SyntaxKind::STAR => NAryOp::Star,
        SyntaxKind::SLASH => NAryOp::Div,
        SyntaxKind::PERCENT => NAryOp::Mod,
        SyntaxKind::AND_KW => NAryOp::And,
        SyntaxKind::OR_KW => NAryOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Map a type-name token to its SQL type.
fn sql_type(kind: SyntaxKind) -> Option<SqlType> {
    let sql_type = match kind {
        SyntaxKind::CHAR_KW | SyntaxKind::CHARACTER_KW => SqlType::Char,
        SyntaxKind::VARCHAR_KW => SqlType::Varchar,
        SyntaxKind::STRING_KW => SqlType::String,
        SyntaxKind::SYMBOL_KW => SqlType::Symbol,
        SyntaxKind::BOOLEAN_KW => SqlType::Boolean,
        SyntaxKind::SMALLINT_KW => SqlType::Smallint,
        SyntaxKind::INT_KW | SyntaxKind::INTEGER_KW => SqlType::Integer,
        SyntaxKind::FLOAT_KW => SqlType::Float,
        SyntaxKind::REAL_KW => SqlType::Real,
        SyntaxKind::DOUBLE_PRECISION_KW => SqlType::DoublePrecision,
        SyntaxKind::DECIMAL_KW => SqlType::Decimal,
        SyntaxKind::NUMERIC_KW => SqlType::Numeric,
        SyntaxKind::TIMESTAMP_KW => SqlType::Timestamp,
        SyntaxKind::STRUCT_KW => SqlType::Struct,
        SyntaxKind::BAG_KW => SqlType::Bag,
        SyntaxKind::LIST_KW => SqlType::List,
        SyntaxKind::SEXP_KW => SqlType::Sexp,
        SyntaxKind::BLOB_KW => SqlType::Blob,
        SyntaxKind::CLOB_KW => SqlType::Clob,
        SyntaxKind::NULL_KW => SqlType::Null,
        SyntaxKind::MISSING_KW => SqlType::Missing,
        _ => return None,
    };
    Some(sql_type)
}

/// Strip matching delimiters and undouble the embedded escape form.
fn unquote(text: &str, quote: char) -> String {
    let inner = text
        .strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text);
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}

#[cfg(test)]
mod tests {
    use super::unquote;

    #[test]
    fn unquote_strips_and_unescapes() {
        assert_eq!(unquote("'abc'", '\''), "abc");
        assert_eq!(unquote("'it''s'", '\''), "it's");
        assert_eq!(unquote("\"a\"\"b\"", '"'), "a\"b");
        assert_eq!(unquote("`2001T`", '`'), "2001T");
        assert_eq!(unquote("''", '\''), "");
    }
}
