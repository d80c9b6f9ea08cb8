//! SFW (SELECT-FROM-WHERE) parsing.
//!
//! Covers `SELECT [DISTINCT|ALL]` with list/`VALUE` projections, `PIVOT
//! value AT key`, the mandatory FROM clause with comma and JOIN separated
//! sources, `UNPIVOT` prefixes, `AS`/`AT` aliases, `ON` conditions, and
//! the `WHERE`/`GROUP BY`/`HAVING`/`LIMIT` tail.

use partiql_common::error::ErrorCode;

use crate::syntax_kind::SyntaxKind;

use super::{expressions, MarkClosed, Parser};

/// Parse an SFW block starting at `SELECT` or `PIVOT`.
pub(crate) fn parse_sfw(p: &mut Parser) -> Option<MarkClosed> {
    let m = p.open();

    match p.current() {
        SyntaxKind::PIVOT_KW => parse_pivot_projection(p),
        _ => {
            p.advance(); // SELECT
            if p.at_any(&[SyntaxKind::DISTINCT_KW, SyntaxKind::ALL_KW]) {
                p.advance();
            }
            if p.at(SyntaxKind::VALUE_KW) {
                let projection = p.open();
                p.advance(); // VALUE
                expressions::expr(p);
                p.close(projection, SyntaxKind::PROJECT_VALUE);
            } else {
                parse_project_list(p);
            }
        }
    }

    if !p.has_error() {
        if p.at(SyntaxKind::FROM_KW) {
            p.advance();
            parse_from_clause(p);
        } else {
            p.error(
                ErrorCode::ParseSelectMissingFrom,
                "expected FROM clause after the projection",
            );
        }
    }

    if !p.has_error() && p.at(SyntaxKind::WHERE_KW) {
        let clause = p.open();
        p.advance();
        expressions::expr(p);
        p.close(clause, SyntaxKind::WHERE_CLAUSE);
    }

    if !p.has_error() && p.at(SyntaxKind::GROUP_KW) {
        parse_group_clause(p);
    }

    if !p.has_error() && p.at(SyntaxKind::HAVING_KW) {
        let clause = p.open();
        p.advance();
        expressions::expr(p);
        p.close(clause, SyntaxKind::HAVING_CLAUSE);
    }

    if !p.has_error() && p.at(SyntaxKind::LIMIT_KW) {
        let clause = p.open();
        p.advance();
        expressions::expr(p);
        p.close(clause, SyntaxKind::LIMIT_CLAUSE);
    }

    Some(p.close(m, SyntaxKind::SELECT_EXPR))
}

/// `PIVOT value AT key`.
fn parse_pivot_projection(p: &mut Parser) {
    let projection = p.open();
    p.advance(); // PIVOT
    expressions::expr(p); // value
    if !p.has_error() {
        p.expect_keyword(SyntaxKind::AT_KW, "at");
    }
    if !p.has_error() {
        expressions::expr(p); // key
    }
    p.close(projection, SyntaxKind::PROJECT_PIVOT);
}

/// The comma-separated projection list. A bare `*` must be the only item.
fn parse_project_list(p: &mut Parser) {
    let list = p.open();

    if p.at_any(&[SyntaxKind::FROM_KW, SyntaxKind::EOF]) {
        p.error(ErrorCode::ParseEmptySelect, "select list cannot be empty");
        p.close(list, SyntaxKind::PROJECT_LIST);
        return;
    }

    let mut stars = 0usize;
    let mut items = 0usize;
    loop {
        if p.at(SyntaxKind::STAR) {
            let item = p.open();
            p.advance();
            p.close(item, SyntaxKind::PROJECT_STAR);
            stars += 1;
        } else {
            let item = p.open();
            expressions::expr(p);
            if !p.has_error() {
                parse_as_alias(p, AliasRule::AllowImplicit, ErrorCode::ParseExpectedIdentForAlias);
            }
            p.close(item, SyntaxKind::PROJECT_ITEM);
        }
        items += 1;
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }

    if !p.has_error() && stars > 0 && items > 1 {
        p.error(
            ErrorCode::ParseAsteriskIsNotAloneInSelectList,
            "`*` must be the only item in the select list",
        );
    }
    p.close(list, SyntaxKind::PROJECT_LIST);
}

/// FROM clause: one source followed by any number of join clauses. A
/// comma is an implicit inner join; explicit joins may carry `ON`.
fn parse_from_clause(p: &mut Parser) {
    let clause = p.open();
    parse_from_source(p);

    loop {
        if p.has_error() {
            break;
        }
        match p.current() {
            SyntaxKind::COMMA => {
                let join = p.open();
                p.advance(); // ,
                parse_from_source(p);
                p.close(join, SyntaxKind::JOIN_CLAUSE);
            }
            SyntaxKind::INNER_JOIN_KW
            | SyntaxKind::LEFT_JOIN_KW
            | SyntaxKind::RIGHT_JOIN_KW
            | SyntaxKind::OUTER_JOIN_KW => {
                let join = p.open();
                p.advance(); // join keyword
                parse_from_source(p);
                if !p.has_error() && p.at(SyntaxKind::ON_KW) {
                    let on = p.open();
                    p.advance(); // ON
                    expressions::expr(p);
                    p.close(on, SyntaxKind::ON_CLAUSE);
                }
                p.close(join, SyntaxKind::JOIN_CLAUSE);
            }
            _ => break,
        }
    }

    p.close(clause, SyntaxKind::FROM_CLAUSE);
}

/// One from-source: `[UNPIVOT] expr`, then `AS`/`AT` aliases in either
/// order, at most one of each.
fn parse_from_source(p: &mut Parser) {
    let source = p.open();
    p.eat(SyntaxKind::UNPIVOT_KW);
    expressions::expr(p);

    let mut seen_as = false;
    let mut seen_at = false;
    loop {
        if p.has_error() {
            break;
        }
        if p.at(SyntaxKind::AS_KW) && !seen_as {
            seen_as = true;
            parse_as_alias(p, AliasRule::ExplicitOnly, ErrorCode::ParseExpectedIdentForAlias);
        } else if p.at(SyntaxKind::AT_KW) && !seen_at {
            seen_at = true;
            let alias = p.open();
            p.advance(); // AT
            if p.at_any(&[SyntaxKind::IDENT, SyntaxKind::QUOTED_IDENT]) {
                p.advance();
            } else {
                p.error(
                    ErrorCode::ParseExpectedIdentForAt,
                    "expected identifier after AT",
                );
            }
            p.close(alias, SyntaxKind::AT_ALIAS);
        } else {
            break;
        }
    }

    p.close(source, SyntaxKind::FROM_SOURCE);
}

/// Whether an alias may omit the `AS` keyword.
#[derive(PartialEq)]
enum AliasRule {
    AllowImplicit,
    ExplicitOnly,
}

/// `AS name`, or a bare identifier when the implicit form is allowed.
fn parse_as_alias(p: &mut Parser, rule: AliasRule, missing_ident_code: ErrorCode) {
    if p.at(SyntaxKind::AS_KW) {
        let alias = p.open();
        p.advance(); // AS
        if p.at_any(&[SyntaxKind::IDENT, SyntaxKind::QUOTED_IDENT]) {
            p.advance();
        } else {
            p.error(missing_ident_code, "expected identifier after AS");
        }
        p.close(alias, SyntaxKind::AS_ALIAS);
    } else if rule == AliasRule::AllowImplicit && p.at(SyntaxKind::IDENT) {
        let alias = p.open();
        p.advance();
        p.close(alias, SyntaxKind::AS_ALIAS);
    }
}

/// `GROUP [PARTIAL] BY key [AS alias], ... [GROUP AS name]`.
fn parse_group_clause(p: &mut Parser) {
    let clause = p.open();
    p.advance(); // GROUP
    p.eat(SyntaxKind::PARTIAL_KW);
    p.expect_keyword(SyntaxKind::BY_KW, "by");

    if !p.has_error() {
        loop {
            let key = p.open();
            expressions::expr(p);
            if !p.has_error() {
                parse_as_alias(p, AliasRule::ExplicitOnly, ErrorCode::ParseExpectedIdentForAlias);
            }
            p.close(key, SyntaxKind::GROUP_KEY);
            if p.has_error() || !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }

    if !p.has_error() && p.at(SyntaxKind::GROUP_KW) && p.nth(1) == SyntaxKind::AS_KW {
        let group_as = p.open();
        p.advance(); // GROUP
        p.advance(); // AS
        if p.at_any(&[SyntaxKind::IDENT, SyntaxKind::QUOTED_IDENT]) {
            p.advance();
        } else {
            p.error(
                ErrorCode::ParseExpectedIdentForGroupName,
                "expected identifier after GROUP AS",
            );
        }
        p.close(group_as, SyntaxKind::GROUP_AS);
    }

    p.close(clause, SyntaxKind::GROUP_CLAUSE);
}
