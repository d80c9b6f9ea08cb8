//! Pratt expression parser for PartiQL.
//!
//! Implements operator precedence parsing using binding power tables.
//! Handles all expression forms: literals, variable references, binary and
//! unary operators, the contextual operators (`IS`, `BETWEEN`, `LIKE`,
//! `IN` and their negated compounds), path suffixes, collection
//! constructors, `CASE`, `CAST`, `VALUES`, function and aggregate calls,
//! and the `SUBSTRING`/`TRIM`/`EXTRACT` builtin forms. SFW blocks are
//! delegated to the query module.

use partiql_common::error::{ErrorCode, Property, PropertyValue};

use crate::syntax_kind::SyntaxKind;

use super::{query, MarkClosed, Parser};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators.
///
/// Left < right means left-associative. The tiers mirror the published
/// precedence table: `OR` < `AND` < (prefix `NOT`) < equality/`IS` <
/// comparison < `IN`/`LIKE`/`BETWEEN` < `||` < additive < multiplicative.
fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        SyntaxKind::OR_KW => Some((1, 2)),

        SyntaxKind::AND_KW => Some((3, 4)),

        // Equality; IS/IS NOT sit at the same tier but take a type on the
        // right instead of an expression.
        SyntaxKind::EQ | SyntaxKind::NOT_EQ | SyntaxKind::IS_KW | SyntaxKind::IS_NOT_KW => {
            Some((7, 8))
        }

        SyntaxKind::LT | SyntaxKind::LT_EQ | SyntaxKind::GT | SyntaxKind::GT_EQ => Some((9, 10)),

        SyntaxKind::IN_KW
        | SyntaxKind::NOT_IN_KW
        | SyntaxKind::LIKE_KW
        | SyntaxKind::NOT_LIKE_KW
        | SyntaxKind::BETWEEN_KW
        | SyntaxKind::NOT_BETWEEN_KW => Some((11, 12)),

        SyntaxKind::CONCAT => Some((13, 14)),

        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((15, 16)),

        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((17, 18)),

        _ => None,
    }
}

/// Operand binding power of prefix `NOT`: tighter than `AND`, looser than
/// equality, so `NOT a = b` parses as `NOT (a = b)`.
const NOT_BP: u8 = 6;

/// Operand binding power of unary `+`/`-`.
const SIGN_BP: u8 = 20;

/// Path suffixes (`.name`, `[expr]`, `.*`, `[*]`) bind tightest of all.
const PATH_BP: u8 = 21;

// ── Expression Entry Point ─────────────────────────────────────────────

/// Parse an expression at the default (lowest) binding power.
pub(crate) fn expr(p: &mut Parser) {
    expr_bp(p, 0);
}

/// Parse an expression with the given minimum binding power.
///
/// This is the core Pratt loop. It first parses a term or prefix
/// expression (the LHS), then loops over path suffixes and infix
/// operators, consuming them as long as their binding power allows.
fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;

    loop {
        if p.has_error() {
            break;
        }

        let current = p.current();

        // ── Path suffixes ──
        if (current == SyntaxKind::DOT || current == SyntaxKind::L_BRACKET) && PATH_BP >= min_bp {
            lhs = parse_path(p, lhs);
            continue;
        }

        // ── Infix operators ──
        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }

            let m = p.open_before(lhs);
            match current {
                // `IS`/`IS NOT` take a data type on the right.
                SyntaxKind::IS_KW | SyntaxKind::IS_NOT_KW => {
                    p.advance();
                    parse_type(p);
                    lhs = p.close(m, SyntaxKind::IS_EXPR);
                }
                // `BETWEEN lo AND hi`: the bounds bind at BETWEEN's own
                // precedence so the `AND` here is not the logical one.
                SyntaxKind::BETWEEN_KW | SyntaxKind::NOT_BETWEEN_KW => {
                    p.advance();
                    expr_bp(p, r_bp);
                    if !p.has_error() {
                        p.expect_keyword(SyntaxKind::AND_KW, "and");
                    }
                    if !p.has_error() {
                        expr_bp(p, r_bp);
                    }
                    lhs = p.close(m, SyntaxKind::BETWEEN_EXPR);
                }
                // `LIKE pattern [ESCAPE esc]`.
                SyntaxKind::LIKE_KW | SyntaxKind::NOT_LIKE_KW => {
                    p.advance();
                    expr_bp(p, r_bp);
                    if !p.has_error() && p.eat(SyntaxKind::ESCAPE_KW) {
                        expr_bp(p, r_bp);
                    }
                    lhs = p.close(m, SyntaxKind::LIKE_EXPR);
                }
                SyntaxKind::IN_KW | SyntaxKind::NOT_IN_KW => {
                    p.advance();
                    parse_in_rhs(p, r_bp);
                    lhs = p.close(m, SyntaxKind::IN_EXPR);
                }
                _ => {
                    p.advance();
                    expr_bp(p, r_bp);
                    lhs = p.close(m, SyntaxKind::BINARY_EXPR);
                }
            }
            continue;
        }

        break;
    }

    Some(lhs)
}

/// Right-hand side of `IN`: a parenthesized expression list becomes a
/// LIST unless it opens a subquery or table value constructor.
fn parse_in_rhs(p: &mut Parser, r_bp: u8) {
    if p.at(SyntaxKind::L_PAREN)
        && !matches!(p.nth(1), SyntaxKind::SELECT_KW | SyntaxKind::VALUES_KW)
    {
        let m = p.open();
        p.advance(); // (
        expr(p);
        while !p.has_error() && p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
        if !p.has_error() {
            p.expect(SyntaxKind::R_PAREN);
        }
        p.close(m, SyntaxKind::LIST_EXPR);
    } else {
        expr_bp(p, r_bp);
    }
}

// ── Term / Prefix Parsing (LHS) ────────────────────────────────────────

/// Parse the left-hand side of an expression: a term or a prefix operator.
fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        // ── Prefix operators ──
        SyntaxKind::NOT_KW => {
            let m = p.open();
            p.advance();
            expr_bp(p, NOT_BP);
            Some(p.close(m, SyntaxKind::NOT_EXPR))
        }
        SyntaxKind::PLUS | SyntaxKind::MINUS => {
            let m = p.open();
            p.advance();
            expr_bp(p, SIGN_BP);
            Some(p.close(m, SyntaxKind::UNARY_EXPR))
        }

        // ── Lexically scoped variable: `@name` ──
        SyntaxKind::AT_SIGN => {
            let m = p.open();
            p.advance();
            if p.at_any(&[SyntaxKind::IDENT, SyntaxKind::QUOTED_IDENT]) {
                p.advance();
            } else {
                p.error(
                    ErrorCode::ParseMissingIdentAfterAt,
                    "expected identifier after `@`",
                );
            }
            Some(p.close(m, SyntaxKind::VAR_REF))
        }

        // ── Literals ──
        SyntaxKind::INT_LITERAL
        | SyntaxKind::DECIMAL_LITERAL
        | SyntaxKind::STRING_LITERAL
        | SyntaxKind::TIMESTAMP_LITERAL
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW
        | SyntaxKind::MISSING_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        // ── Identifiers: variable, call, or aggregate call ──
        SyntaxKind::IDENT => Some(ident_term(p)),
        SyntaxKind::QUOTED_IDENT => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::VAR_REF))
        }

        // ── Grouping and collection constructors ──
        SyntaxKind::L_PAREN => Some(paren_term(p)),
        SyntaxKind::L_BRACKET => Some(list_term(p)),
        SyntaxKind::LT_LT => Some(bag_term(p)),
        SyntaxKind::L_BRACE => Some(struct_term(p)),

        // ── Keyword-led forms ──
        SyntaxKind::CASE_KW => Some(case_expr(p)),
        SyntaxKind::CAST_KW => Some(cast_expr(p)),
        SyntaxKind::SELECT_KW | SyntaxKind::PIVOT_KW => query::parse_sfw(p),
        SyntaxKind::VALUES_KW => Some(values_expr(p)),
        SyntaxKind::SUBSTRING_KW => Some(substring_expr(p)),
        SyntaxKind::TRIM_KW => Some(trim_expr(p)),
        SyntaxKind::EXTRACT_KW => Some(extract_expr(p)),

        _ => {
            let found = found(p);
            p.error(
                ErrorCode::ParseExpectedExpression,
                format!("expected expression, found {found}"),
            );
            None
        }
    }
}

/// Describe the current token for an error message.
fn found(p: &Parser) -> String {
    let text = p.current_text();
    if text.is_empty() {
        "end of input".to_string()
    } else {
        format!("`{text}`")
    }
}

/// An identifier in term position: a plain variable reference, or -- when
/// immediately followed by `(` -- a function call or aggregate call.
fn ident_term(p: &mut Parser) -> MarkClosed {
    if p.nth(1) == SyntaxKind::L_PAREN {
        let name = p.current_text().to_ascii_lowercase();
        if p.is_aggregate(&name) {
            return agg_call(p, &name);
        }
        let m = p.open();
        p.advance(); // name
        arg_list(p);
        return p.close(m, SyntaxKind::CALL_EXPR);
    }
    let m = p.open();
    p.advance();
    p.close(m, SyntaxKind::VAR_REF)
}

/// Argument list of a regular call: `(expr, expr, ...)`. Zero arguments
/// are allowed.
fn arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    if !p.at(SyntaxKind::R_PAREN) {
        expr(p);
        while !p.has_error() && p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
    }
    if !p.has_error() {
        p.expect(SyntaxKind::R_PAREN);
    }
    p.close(m, SyntaxKind::ARG_LIST);
}

/// Aggregate call: `name([DISTINCT|ALL] arg)` with exactly one argument.
/// `COUNT(*)` is the only wildcard form.
fn agg_call(p: &mut Parser, name: &str) -> MarkClosed {
    let m = p.open();
    p.advance(); // name
    p.advance(); // (

    let quantified = p.at_any(&[SyntaxKind::DISTINCT_KW, SyntaxKind::ALL_KW]);
    if quantified {
        p.advance();
    }

    if p.at(SyntaxKind::STAR) {
        if name == "count" && !quantified {
            p.advance(); // *
        } else {
            let error = p
                .syntax_error(
                    ErrorCode::ParseUnsupportedCallWithStar,
                    format!("`*` argument is not supported for `{name}`"),
                )
                .with(Property::FunctionName, PropertyValue::Text(name.to_string()));
            p.report(error);
        }
    } else {
        expr(p);
        if !p.has_error() && p.at(SyntaxKind::COMMA) {
            let error = p
                .syntax_error(
                    ErrorCode::ParseNonUnaryAggregateFunctionCall,
                    format!("aggregate function `{name}` takes exactly one argument"),
                )
                .with(Property::FunctionName, PropertyValue::Text(name.to_string()));
            p.report(error);
        }
    }

    if !p.has_error() {
        p.expect(SyntaxKind::R_PAREN);
    }
    p.close(m, SyntaxKind::AGG_CALL)
}

/// Parenthesized group. A single element is transparent grouping; two or
/// more comma-separated elements form a LIST.
fn paren_term(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // (

    if p.at(SyntaxKind::R_PAREN) {
        p.error(
            ErrorCode::ParseExpectedExpression,
            "expected expression inside parentheses",
        );
        return p.close(m, SyntaxKind::PAREN_EXPR);
    }

    expr(p);
    let mut elements = 1;
    while !p.has_error() && p.eat(SyntaxKind::COMMA) {
        expr(p);
        elements += 1;
    }
    if !p.has_error() {
        p.expect(SyntaxKind::R_PAREN);
    }

    let kind = if elements > 1 {
        SyntaxKind::LIST_EXPR
    } else {
        SyntaxKind::PAREN_EXPR
    };
    p.close(m, kind)
}

/// List constructor: `[a, b, ...]`. May be empty.
fn list_term(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [
    if !p.at(SyntaxKind::R_BRACKET) {
        expr(p);
        while !p.has_error() && p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
    }
    if !p.has_error() {
        p.expect(SyntaxKind::R_BRACKET);
    }
    p.close(m, SyntaxKind::LIST_EXPR)
}

/// Bag constructor: `<< a, b, ... >>`. May be empty.
fn bag_term(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // <<
    if !p.at(SyntaxKind::GT_GT) {
        expr(p);
        while !p.has_error() && p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
    }
    if !p.has_error() {
        p.expect(SyntaxKind::GT_GT);
    }
    p.close(m, SyntaxKind::BAG_EXPR)
}

/// Struct constructor: `{ key: value, ... }`. May be empty.
fn struct_term(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // {
    if !p.at(SyntaxKind::R_BRACE) {
        loop {
            let field = p.open();
            expr(p);
            if !p.has_error() {
                p.expect(SyntaxKind::COLON);
            }
            if !p.has_error() {
                expr(p);
            }
            p.close(field, SyntaxKind::STRUCT_FIELD);
            if p.has_error() || !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }
    if !p.has_error() {
        p.expect(SyntaxKind::R_BRACE);
    }
    p.close(m, SyntaxKind::STRUCT_EXPR)
}

/// `CASE ... END`. Simple form when an operand expression precedes the
/// first `WHEN`, searched form otherwise.
fn case_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // CASE

    if !p.at_any(&[SyntaxKind::WHEN_KW, SyntaxKind::ELSE_KW, SyntaxKind::END_KW]) {
        expr(p);
    }

    if !p.has_error() && !p.at(SyntaxKind::WHEN_KW) {
        p.error(
            ErrorCode::ParseExpectedWhenClause,
            "expected WHEN clause in CASE expression",
        );
    }

    while !p.has_error() && p.at(SyntaxKind::WHEN_KW) {
        let when = p.open();
        p.advance(); // WHEN
        expr(p);
        if !p.has_error() {
            p.expect_keyword(SyntaxKind::THEN_KW, "then");
        }
        if !p.has_error() {
            expr(p);
        }
        p.close(when, SyntaxKind::WHEN_CLAUSE);
    }

    if !p.has_error() && p.at(SyntaxKind::ELSE_KW) {
        let else_branch = p.open();
        p.advance(); // ELSE
        expr(p);
        p.close(else_branch, SyntaxKind::ELSE_CLAUSE);
    }

    if !p.has_error() {
        p.expect_keyword(SyntaxKind::END_KW, "end");
    }
    p.close(m, SyntaxKind::CASE_EXPR)
}

/// `CAST(expr AS type)`.
fn cast_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // CAST
    if p.at(SyntaxKind::L_PAREN) {
        p.advance();
    } else {
        p.error(
            ErrorCode::ParseExpectedLeftParenAfterCast,
            "expected `(` after CAST",
        );
    }
    if !p.has_error() {
        expr(p);
    }
    if !p.has_error() {
        p.expect_keyword(SyntaxKind::AS_KW, "as");
    }
    if !p.has_error() {
        parse_type(p);
    }
    if !p.has_error() {
        p.expect(SyntaxKind::R_PAREN);
    }
    p.close(m, SyntaxKind::CAST_EXPR)
}

/// A type reference: a type-name keyword with an optional parenthesized
/// parameter list. Parameters must be unsigned integer literals; the
/// arity check happens during lowering where the type table lives.
pub(crate) fn parse_type(p: &mut Parser) {
    let m = p.open();
    if p.current().is_type_name() {
        p.advance();
        if p.at(SyntaxKind::L_PAREN) {
            let args = p.open();
            p.advance(); // (
            loop {
                if p.at(SyntaxKind::INT_LITERAL) {
                    p.advance();
                } else {
                    let found = found(p);
                    p.error(
                        ErrorCode::ParseInvalidTypeParam,
                        format!("type parameter must be an unsigned integer literal, found {found}"),
                    );
                    break;
                }
                if !p.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            if !p.has_error() {
                p.expect(SyntaxKind::R_PAREN);
            }
            p.close(args, SyntaxKind::TYPE_ARG_LIST);
        }
    } else {
        let found = found(p);
        p.error(
            ErrorCode::ParseExpectedTypeName,
            format!("expected type name, found {found}"),
        );
    }
    p.close(m, SyntaxKind::TYPE_REF);
}

/// `VALUES (row), (row), ...` -- each row is a parenthesized expression
/// list; the whole construct lowers to a bag of lists.
fn values_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // VALUES
    loop {
        let row = p.open();
        if p.expect(SyntaxKind::L_PAREN) {
            if !p.at(SyntaxKind::R_PAREN) {
                expr(p);
                while !p.has_error() && p.eat(SyntaxKind::COMMA) {
                    expr(p);
                }
            }
            if !p.has_error() {
                p.expect(SyntaxKind::R_PAREN);
            }
        }
        p.close(row, SyntaxKind::VALUES_ROW);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.close(m, SyntaxKind::VALUES_EXPR)
}

/// `SUBSTRING(str FROM start [FOR len])` or `SUBSTRING(str, start [, len])`.
fn substring_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // SUBSTRING
    expect_left_paren_builtin(p, "SUBSTRING");
    if !p.has_error() {
        expr(p);
    }
    if !p.has_error() {
        match p.current() {
            SyntaxKind::FROM_KW => {
                p.advance();
                expr(p);
                if !p.has_error() && p.eat(SyntaxKind::FOR_KW) {
                    expr(p);
                }
            }
            SyntaxKind::COMMA => {
                p.advance();
                expr(p);
                if !p.has_error() && p.eat(SyntaxKind::COMMA) {
                    expr(p);
                }
            }
            _ => {
                p.error(
                    ErrorCode::ParseExpectedArgumentDelimiter,
                    "expected `FROM` or `,` in SUBSTRING",
                );
            }
        }
    }
    expect_right_paren_builtin(p, "SUBSTRING");
    p.close(m, SyntaxKind::SUBSTRING_EXPR)
}

/// `TRIM([[LEADING|TRAILING|BOTH] [chars] FROM] src)`.
fn trim_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // TRIM
    expect_left_paren_builtin(p, "TRIM");
    if !p.has_error() {
        if p.current().is_trim_spec() {
            p.advance(); // specification
            if p.at(SyntaxKind::FROM_KW) {
                // trim(spec FROM src)
                p.advance();
                expr(p);
            } else {
                // trim(spec chars FROM src)
                expr(p);
                if !p.has_error() {
                    p.expect_keyword(SyntaxKind::FROM_KW, "from");
                }
                if !p.has_error() {
                    expr(p);
                }
            }
        } else {
            expr(p);
            if !p.has_error() && p.eat(SyntaxKind::FROM_KW) {
                // trim(chars FROM src)
                expr(p);
            }
            // otherwise: trim(src)
        }
    }
    expect_right_paren_builtin(p, "TRIM");
    p.close(m, SyntaxKind::TRIM_EXPR)
}

/// `EXTRACT(date_part FROM expr)`.
fn extract_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // EXTRACT
    expect_left_paren_builtin(p, "EXTRACT");
    if !p.has_error() {
        if p.current().is_date_part() {
            p.advance();
        } else {
            let found = found(p);
            p.error(
                ErrorCode::ParseExpectedDatePart,
                format!("expected date part, found {found}"),
            );
        }
    }
    if !p.has_error() {
        p.expect_keyword(SyntaxKind::FROM_KW, "from");
    }
    if !p.has_error() {
        expr(p);
    }
    expect_right_paren_builtin(p, "EXTRACT");
    p.close(m, SyntaxKind::EXTRACT_EXPR)
}

fn expect_left_paren_builtin(p: &mut Parser, name: &str) {
    if p.at(SyntaxKind::L_PAREN) {
        p.advance();
    } else {
        p.error(
            ErrorCode::ParseExpectedLeftParenBuiltinFunctionCall,
            format!("expected `(` after {name}"),
        );
    }
}

fn expect_right_paren_builtin(p: &mut Parser, name: &str) {
    if p.has_error() {
        return;
    }
    if p.at(SyntaxKind::R_PAREN) {
        p.advance();
    } else {
        p.error(
            ErrorCode::ParseExpectedRightParenBuiltinFunctionCall,
            format!("expected `)` to close {name}"),
        );
    }
}

// ── Path Suffixes ──────────────────────────────────────────────────────

/// Fold path suffixes onto a completed term: `.name`, `.*`, `[expr]`,
/// `[*]`. All suffixes are consumed greedily into a single PATH_EXPR node
/// whose first child is the root expression.
fn parse_path(p: &mut Parser, lhs: MarkClosed) -> MarkClosed {
    let m = p.open_before(lhs);
    loop {
        if p.at(SyntaxKind::DOT) {
            let component = p.open();
            p.advance(); // .
            match p.current() {
                SyntaxKind::IDENT | SyntaxKind::QUOTED_IDENT => {
                    p.advance();
                    p.close(component, SyntaxKind::PATH_MEMBER);
                }
                SyntaxKind::STAR => {
                    p.advance();
                    p.close(component, SyntaxKind::PATH_UNPIVOT);
                }
                _ => {
                    let found = found(p);
                    p.error(
                        ErrorCode::ParseInvalidPathComponent,
                        format!("expected path component after `.`, found {found}"),
                    );
                    p.close(component, SyntaxKind::PATH_MEMBER);
                }
            }
        } else if p.at(SyntaxKind::L_BRACKET) {
            let component = p.open();
            p.advance(); // [
            if p.at(SyntaxKind::STAR) && p.nth(1) == SyntaxKind::R_BRACKET {
                p.advance(); // *
                p.advance(); // ]
                p.close(component, SyntaxKind::PATH_WILDCARD);
            } else {
                expr(p);
                if !p.has_error() {
                    p.expect(SyntaxKind::R_BRACKET);
                }
                p.close(component, SyntaxKind::PATH_INDEX);
            }
        } else {
            break;
        }
        if p.has_error() {
            break;
        }
    }
    p.close(m, SyntaxKind::PATH_EXPR)
}
