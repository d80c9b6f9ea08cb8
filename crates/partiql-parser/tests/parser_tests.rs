//! Parser integration tests.
//!
//! Shape assertions compare `without_metas()` copies against hand-built
//! AST values, so they are insensitive to source positions but sensitive
//! to the semantic meta markers (`legacy_logical_not`, `is_implicit_join`).

use std::str::FromStr;

use bigdecimal::BigDecimal;
use partiql_common::value::{Timestamp, Value};
use partiql_parser::ast::{
    CaseSensitivity, DataType, Expr, FromSource, GroupBy, GroupByItem, GroupingStrategy, JoinOp,
    Metas, NAryOp, PathComponent, ScopeQualifier, Select, SelectListItem, SelectProjection,
    SetQuantifier, SqlType, StructField, TypedOp, WhenClause,
};
use partiql_parser::{
    parse_expression, parse_expression_with, ErrorCode, ParseOptions, Property, PropertyValue,
    SyntaxError,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn parse(source: &str) -> Expr {
    parse_expression(source).unwrap_or_else(|e| panic!("`{source}` should parse: {e}"))
}

fn shape(source: &str) -> Expr {
    parse(source).without_metas()
}

fn parse_err(source: &str) -> SyntaxError {
    parse_expression(source).expect_err("parse should fail")
}

fn m() -> Metas {
    Metas::default()
}

fn var(name: &str) -> Expr {
    Expr::VarRef {
        name: name.to_string(),
        case: CaseSensitivity::Insensitive,
        scope: ScopeQualifier::Unqualified,
        metas: m(),
    }
}

fn int(value: i64) -> Expr {
    Expr::Literal {
        value: Value::Integer(value),
        metas: m(),
    }
}

fn string(value: &str) -> Expr {
    Expr::Literal {
        value: Value::String(value.to_string()),
        metas: m(),
    }
}

fn symbol(value: &str) -> Expr {
    Expr::Literal {
        value: Value::Symbol(value.to_string()),
        metas: m(),
    }
}

fn nary(op: NAryOp, args: Vec<Expr>) -> Expr {
    Expr::NAry {
        op,
        args,
        metas: m(),
    }
}

fn negated(inner: Expr) -> Expr {
    Expr::NAry {
        op: NAryOp::Not,
        args: vec![inner],
        metas: m().with_legacy_logical_not(),
    }
}

fn member(name: &str) -> PathComponent {
    PathComponent::Expr {
        expr: string(name),
        case: CaseSensitivity::Insensitive,
    }
}

fn path(root: &str, members: &[&str]) -> Expr {
    Expr::Path {
        root: Box::new(var(root)),
        components: members.iter().map(|name| member(name)).collect(),
        metas: m(),
    }
}

fn data_type(sql_type: SqlType, args: Vec<u64>) -> DataType {
    DataType {
        sql_type,
        args,
        metas: m(),
    }
}

fn from_expr(name: &str) -> FromSource {
    FromSource::Expr {
        expr: var(name),
        as_alias: None,
        at_alias: None,
    }
}

fn select_shape(source: &str) -> Select {
    match shape(source) {
        Expr::Select(select) => *select,
        other => panic!("expected a select, got {other:?}"),
    }
}

// ── Literals ───────────────────────────────────────────────────────────

#[test]
fn literal_integer() {
    assert_eq!(shape("42"), int(42));
}

#[test]
fn literal_decimal_forms() {
    for (source, expected) in [("3.14", "3.14"), ("1e6", "1e6"), ("2.5e-3", "2.5e-3")] {
        assert_eq!(
            shape(source),
            Expr::Literal {
                value: Value::Decimal(BigDecimal::from_str(expected).unwrap()),
                metas: m(),
            }
        );
    }
}

#[test]
fn literal_string_unescapes_quotes() {
    assert_eq!(shape("'it''s'"), string("it's"));
}

#[test]
fn literal_timestamp() {
    assert_eq!(
        shape("`2001T`"),
        Expr::Literal {
            value: Value::Timestamp(Timestamp::parse("2001T").unwrap()),
            metas: m(),
        }
    );
}

#[test]
fn literal_keywords() {
    assert_eq!(
        shape("true"),
        Expr::Literal {
            value: Value::Boolean(true),
            metas: m(),
        }
    );
    assert_eq!(
        shape("null"),
        Expr::Literal {
            value: Value::Null,
            metas: m(),
        }
    );
    assert_eq!(shape("missing"), Expr::LiteralMissing { metas: m() });
}

// ── Variable references ────────────────────────────────────────────────

#[test]
fn var_ref_case_and_scope() {
    assert_eq!(shape("abc"), var("abc"));
    assert_eq!(
        shape("\"Abc\""),
        Expr::VarRef {
            name: "Abc".to_string(),
            case: CaseSensitivity::Sensitive,
            scope: ScopeQualifier::Unqualified,
            metas: m(),
        }
    );
    assert_eq!(
        shape("@x"),
        Expr::VarRef {
            name: "x".to_string(),
            case: CaseSensitivity::Insensitive,
            scope: ScopeQualifier::Lexical,
            metas: m(),
        }
    );
}

// ── Operator precedence and associativity ──────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        shape("a + b * c"),
        nary(
            NAryOp::Plus,
            vec![var("a"), nary(NAryOp::Star, vec![var("b"), var("c")])]
        )
    );
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(
        shape("a - b - c"),
        nary(
            NAryOp::Minus,
            vec![nary(NAryOp::Minus, vec![var("a"), var("b")]), var("c")]
        )
    );
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(
        shape("a or b and c"),
        nary(
            NAryOp::Or,
            vec![var("a"), nary(NAryOp::And, vec![var("b"), var("c")])]
        )
    );
}

#[test]
fn not_scopes_over_comparison_not_conjunction() {
    assert_eq!(
        shape("not a = b"),
        nary(NAryOp::Not, vec![nary(NAryOp::Eq, vec![var("a"), var("b")])])
    );
    assert_eq!(
        shape("not a and b"),
        nary(
            NAryOp::And,
            vec![nary(NAryOp::Not, vec![var("a")]), var("b")]
        )
    );
}

#[test]
fn concat_binds_tighter_than_in() {
    assert_eq!(
        shape("a || b in c"),
        nary(
            NAryOp::In,
            vec![nary(NAryOp::Concat, vec![var("a"), var("b")]), var("c")]
        )
    );
}

#[test]
fn redundant_parentheses_do_not_change_shape() {
    assert_eq!(shape("a + b * c"), shape("a + (b * c)"));
    assert_eq!(shape("a or b and c"), shape("a or (b and c)"));
    assert_ne!(shape("a + b * c"), shape("(a + b) * c"));
}

#[test]
fn unary_sign() {
    assert_eq!(shape("-a"), nary(NAryOp::Minus, vec![var("a")]));
    assert_eq!(shape("+5"), nary(NAryOp::Plus, vec![int(5)]));
}

#[test]
fn comparison_operators_lower() {
    assert_eq!(shape("a = b"), nary(NAryOp::Eq, vec![var("a"), var("b")]));
    assert_eq!(shape("a <> b"), nary(NAryOp::Ne, vec![var("a"), var("b")]));
    assert_eq!(shape("a != b"), nary(NAryOp::Ne, vec![var("a"), var("b")]));
    assert_eq!(shape("a <= b"), nary(NAryOp::Lte, vec![var("a"), var("b")]));
    assert_eq!(shape("a >= b"), nary(NAryOp::Gte, vec![var("a"), var("b")]));
    assert_eq!(shape("a % b"), nary(NAryOp::Mod, vec![var("a"), var("b")]));
    assert_eq!(shape("a / b"), nary(NAryOp::Div, vec![var("a"), var("b")]));
}

// ── Contextual operators ───────────────────────────────────────────────

#[test]
fn is_takes_a_type() {
    assert_eq!(
        shape("a is null"),
        Expr::Typed {
            op: TypedOp::Is,
            expr: Box::new(var("a")),
            data_type: data_type(SqlType::Null, vec![]),
            metas: m(),
        }
    );
}

#[test]
fn is_not_normalizes_to_not_wrapper() {
    let expected = negated(Expr::Typed {
        op: TypedOp::Is,
        expr: Box::new(var("a")),
        data_type: data_type(SqlType::Missing, vec![]),
        metas: m(),
    });
    assert_eq!(shape("a is not missing"), expected);

    // The wrapper carries the legacy marker on the real parse too.
    let parsed = parse("a is not missing");
    assert!(parsed.metas().legacy_logical_not);
}

#[test]
fn between_is_ternary() {
    assert_eq!(
        shape("a between 1 and 3"),
        nary(NAryOp::Between, vec![var("a"), int(1), int(3)])
    );
    assert_eq!(
        shape("a not between 1 and 3"),
        negated(nary(NAryOp::Between, vec![var("a"), int(1), int(3)]))
    );
}

#[test]
fn between_bounds_do_not_swallow_logical_and() {
    assert_eq!(
        shape("a between b and c and d"),
        nary(
            NAryOp::And,
            vec![
                nary(NAryOp::Between, vec![var("a"), var("b"), var("c")]),
                var("d")
            ]
        )
    );
}

#[test]
fn like_with_and_without_escape() {
    assert_eq!(
        shape("a like 'x%'"),
        nary(NAryOp::Like, vec![var("a"), string("x%")])
    );
    assert_eq!(
        shape("a like 'x%' escape '!'"),
        nary(NAryOp::Like, vec![var("a"), string("x%"), string("!")])
    );
    assert_eq!(
        shape("a not like 'x'"),
        negated(nary(NAryOp::Like, vec![var("a"), string("x")]))
    );
}

#[test]
fn in_parenthesized_list_becomes_a_list() {
    assert_eq!(
        shape("a in (1, 2, 3)"),
        nary(
            NAryOp::In,
            vec![
                var("a"),
                Expr::List {
                    items: vec![int(1), int(2), int(3)],
                    metas: m(),
                }
            ]
        )
    );
    // Even a single parenthesized element is a list in IN position.
    assert_eq!(
        shape("a in (1)"),
        nary(
            NAryOp::In,
            vec![
                var("a"),
                Expr::List {
                    items: vec![int(1)],
                    metas: m(),
                }
            ]
        )
    );
}

#[test]
fn in_general_expression_stays_an_expression() {
    assert_eq!(
        shape("a in b"),
        nary(NAryOp::In, vec![var("a"), var("b")])
    );
    assert_eq!(
        shape("a not in (1, 2)"),
        negated(nary(
            NAryOp::In,
            vec![
                var("a"),
                Expr::List {
                    items: vec![int(1), int(2)],
                    metas: m(),
                }
            ]
        ))
    );
}

#[test]
fn in_subquery_is_not_a_list() {
    let parsed = shape("a in (select b from c)");
    match parsed {
        Expr::NAry { op: NAryOp::In, args, .. } => {
            assert!(matches!(args[1], Expr::Select(_)), "rhs should be a select");
        }
        other => panic!("expected IN, got {other:?}"),
    }
}

// ── Paths ──────────────────────────────────────────────────────────────

#[test]
fn dotted_path_members() {
    assert_eq!(shape("t.a"), path("t", &["a"]));
    assert_eq!(shape("t.a.b"), path("t", &["a", "b"]));
}

#[test]
fn quoted_member_is_case_sensitive() {
    assert_eq!(
        shape("t.\"A\""),
        Expr::Path {
            root: Box::new(var("t")),
            components: vec![PathComponent::Expr {
                expr: string("A"),
                case: CaseSensitivity::Sensitive,
            }],
            metas: m(),
        }
    );
}

#[test]
fn bracket_index_is_case_sensitive() {
    assert_eq!(
        shape("t[0]"),
        Expr::Path {
            root: Box::new(var("t")),
            components: vec![PathComponent::Expr {
                expr: int(0),
                case: CaseSensitivity::Sensitive,
            }],
            metas: m(),
        }
    );
}

#[test]
fn path_wildcard_and_unpivot_components() {
    assert_eq!(
        shape("t.a[*].b"),
        Expr::Path {
            root: Box::new(var("t")),
            components: vec![member("a"), PathComponent::Wildcard, member("b")],
            metas: m(),
        }
    );
    assert_eq!(
        shape("t.*"),
        Expr::Path {
            root: Box::new(var("t")),
            components: vec![PathComponent::Unpivot],
            metas: m(),
        }
    );
}

#[test]
fn path_binds_tighter_than_operators() {
    assert_eq!(
        shape("a.b + c"),
        nary(NAryOp::Plus, vec![path("a", &["b"]), var("c")])
    );
    assert_eq!(
        shape("-a.b"),
        nary(NAryOp::Minus, vec![path("a", &["b"])])
    );
}

// ── Collections ────────────────────────────────────────────────────────

#[test]
fn collection_constructors() {
    assert_eq!(
        shape("[1, 2]"),
        Expr::List {
            items: vec![int(1), int(2)],
            metas: m(),
        }
    );
    assert_eq!(
        shape("<<1>>"),
        Expr::Bag {
            items: vec![int(1)],
            metas: m(),
        }
    );
    assert_eq!(
        shape("{'a': 1, 'b': 2}"),
        Expr::Struct {
            fields: vec![
                StructField {
                    key: string("a"),
                    value: int(1),
                },
                StructField {
                    key: string("b"),
                    value: int(2),
                },
            ],
            metas: m(),
        }
    );
    assert_eq!(
        shape("[]"),
        Expr::List {
            items: vec![],
            metas: m(),
        }
    );
}

#[test]
fn parenthesized_list_of_many_is_a_list() {
    assert_eq!(
        shape("(1, 2)"),
        Expr::List {
            items: vec![int(1), int(2)],
            metas: m(),
        }
    );
    // A single element is transparent grouping.
    assert_eq!(shape("(1)"), int(1));
}

#[test]
fn values_builds_a_bag_of_lists() {
    assert_eq!(
        shape("values (1, 2), (3)"),
        Expr::Bag {
            items: vec![
                Expr::List {
                    items: vec![int(1), int(2)],
                    metas: m(),
                },
                Expr::List {
                    items: vec![int(3)],
                    metas: m(),
                },
            ],
            metas: m(),
        }
    );
}

// ── CASE ───────────────────────────────────────────────────────────────

#[test]
fn simple_case() {
    assert_eq!(
        shape("case x when 1 then 'one' else 'other' end"),
        Expr::SimpleCase {
            operand: Box::new(var("x")),
            when_clauses: vec![WhenClause {
                condition: int(1),
                result: string("one"),
            }],
            else_clause: Some(Box::new(string("other"))),
            metas: m(),
        }
    );
}

#[test]
fn searched_case() {
    assert_eq!(
        shape("case when a > 1 then 'big' when a > 0 then 'small' end"),
        Expr::SearchedCase {
            when_clauses: vec![
                WhenClause {
                    condition: nary(NAryOp::Gt, vec![var("a"), int(1)]),
                    result: string("big"),
                },
                WhenClause {
                    condition: nary(NAryOp::Gt, vec![var("a"), int(0)]),
                    result: string("small"),
                },
            ],
            else_clause: None,
            metas: m(),
        }
    );
}

// ── CAST and types ─────────────────────────────────────────────────────

#[test]
fn cast_with_type_parameters() {
    assert_eq!(
        shape("cast(a as decimal(10, 2))"),
        Expr::Typed {
            op: TypedOp::Cast,
            expr: Box::new(var("a")),
            data_type: data_type(SqlType::Decimal, vec![10, 2]),
            metas: m(),
        }
    );
    assert_eq!(
        shape("cast(a as varchar)"),
        Expr::Typed {
            op: TypedOp::Cast,
            expr: Box::new(var("a")),
            data_type: data_type(SqlType::Varchar, vec![]),
            metas: m(),
        }
    );
}

#[test]
fn cast_to_double_precision_uses_the_folded_keyword() {
    assert_eq!(
        shape("cast(a as double precision)"),
        Expr::Typed {
            op: TypedOp::Cast,
            expr: Box::new(var("a")),
            data_type: data_type(SqlType::DoublePrecision, vec![]),
            metas: m(),
        }
    );
}

// ── Calls and aggregates ───────────────────────────────────────────────

#[test]
fn function_call_callee_is_first_argument() {
    assert_eq!(
        shape("foo(1, b)"),
        nary(NAryOp::Call, vec![var("foo"), int(1), var("b")])
    );
    assert_eq!(shape("foo()"), nary(NAryOp::Call, vec![var("foo")]));
}

#[test]
fn aggregate_calls() {
    assert_eq!(
        shape("sum(x)"),
        Expr::CallAgg {
            func: Box::new(var("sum")),
            quantifier: SetQuantifier::All,
            arg: Box::new(var("x")),
            metas: m(),
        }
    );
    assert_eq!(
        shape("count(distinct x)"),
        Expr::CallAgg {
            func: Box::new(var("count")),
            quantifier: SetQuantifier::Distinct,
            arg: Box::new(var("x")),
            metas: m(),
        }
    );
    // Aggregate names are canonicalized to lowercase.
    assert_eq!(shape("SUM(x)"), shape("sum(x)"));
}

#[test]
fn count_star_is_the_wildcard_aggregate() {
    assert_eq!(
        shape("count(*)"),
        Expr::CallAggWildcard {
            func: Box::new(var("count")),
            metas: m(),
        }
    );
}

#[test]
fn aggregate_set_is_configurable() {
    let options = ParseOptions::with_aggregates(["median"]);
    let parsed = parse_expression_with("median(x)", &options)
        .unwrap()
        .without_metas();
    assert_eq!(
        parsed,
        Expr::CallAgg {
            func: Box::new(var("median")),
            quantifier: SetQuantifier::All,
            arg: Box::new(var("x")),
            metas: m(),
        }
    );

    // With the replaced set, `sum` is a plain call again.
    let parsed = parse_expression_with("sum(x)", &options)
        .unwrap()
        .without_metas();
    assert_eq!(parsed, nary(NAryOp::Call, vec![var("sum"), var("x")]));
}

// ── Builtin call forms ─────────────────────────────────────────────────

#[test]
fn substring_forms_normalize_to_one_call() {
    let expected = nary(
        NAryOp::Call,
        vec![var("substring"), var("s"), int(2), int(3)],
    );
    assert_eq!(shape("substring(s from 2 for 3)"), expected);
    assert_eq!(shape("substring(s, 2, 3)"), expected);

    let two_arg = nary(NAryOp::Call, vec![var("substring"), var("s"), int(2)]);
    assert_eq!(shape("substring(s from 2)"), two_arg);
    assert_eq!(shape("substring(s, 2)"), two_arg);
}

#[test]
fn trim_forms_normalize_in_canonical_order() {
    assert_eq!(shape("trim(s)"), nary(NAryOp::Call, vec![var("trim"), var("s")]));
    assert_eq!(
        shape("trim(leading from s)"),
        nary(NAryOp::Call, vec![var("trim"), symbol("leading"), var("s")])
    );
    assert_eq!(
        shape("trim(both '-' from s)"),
        nary(
            NAryOp::Call,
            vec![var("trim"), symbol("both"), string("-"), var("s")]
        )
    );
    assert_eq!(
        shape("trim('-' from s)"),
        nary(NAryOp::Call, vec![var("trim"), string("-"), var("s")])
    );
}

#[test]
fn extract_passes_the_date_part_as_a_symbol() {
    assert_eq!(
        shape("extract(year from ts)"),
        nary(
            NAryOp::Call,
            vec![var("extract"), symbol("year"), var("ts")]
        )
    );
    assert_eq!(
        shape("extract(timezone_hour from ts)"),
        nary(
            NAryOp::Call,
            vec![var("extract"), symbol("timezone_hour"), var("ts")]
        )
    );
}

// ── SFW end-to-end shapes ──────────────────────────────────────────────

#[test]
fn select_with_group_by() {
    let select = select_shape("SELECT col1 FROM t GROUP BY col1");
    assert_eq!(select.set_quantifier, SetQuantifier::All);
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![SelectListItem::Expr {
            expr: var("col1"),
            as_alias: None,
        }])
    );
    assert_eq!(select.from, from_expr("t"));
    assert_eq!(
        select.group_by,
        Some(GroupBy {
            strategy: GroupingStrategy::Full,
            items: vec![GroupByItem {
                expr: var("col1"),
                as_alias: None,
            }],
            group_as_name: None,
        })
    );
    assert_eq!(select.where_clause, None);
    assert_eq!(select.having, None);
    assert_eq!(select.limit, None);
}

#[test]
fn select_with_group_as() {
    let select = select_shape("SELECT col1, g FROM t GROUP BY col1 GROUP AS g");
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![
            SelectListItem::Expr {
                expr: var("col1"),
                as_alias: None,
            },
            SelectListItem::Expr {
                expr: var("g"),
                as_alias: None,
            },
        ])
    );
    let group_by = select.group_by.expect("group by should be present");
    assert_eq!(group_by.group_as_name.as_deref(), Some("g"));
}

#[test]
fn select_with_aggregate_where_and_group() {
    let select = select_shape(
        "SELECT rep, SUM(total_sales) AS total FROM r WHERE fiscal_year >= `2001T` GROUP BY rep",
    );
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![
            SelectListItem::Expr {
                expr: var("rep"),
                as_alias: None,
            },
            SelectListItem::Expr {
                expr: Expr::CallAgg {
                    func: Box::new(var("sum")),
                    quantifier: SetQuantifier::All,
                    arg: Box::new(var("total_sales")),
                    metas: m(),
                },
                as_alias: Some("total".to_string()),
            },
        ])
    );
    assert_eq!(
        select.where_clause,
        Some(nary(
            NAryOp::Gte,
            vec![
                var("fiscal_year"),
                Expr::Literal {
                    value: Value::Timestamp(Timestamp::parse("2001T").unwrap()),
                    metas: m(),
                }
            ]
        ))
    );
    assert_eq!(
        select.group_by,
        Some(GroupBy {
            strategy: GroupingStrategy::Full,
            items: vec![GroupByItem {
                expr: var("rep"),
                as_alias: None,
            }],
            group_as_name: None,
        })
    );
}

#[test]
fn explicit_join_with_on_condition() {
    let select = select_shape("SELECT * FROM j1 JOIN j2 ON j1.i = j2.i");
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![SelectListItem::Star { metas: m() }])
    );
    assert_eq!(
        select.from,
        FromSource::Join {
            op: JoinOp::Inner,
            left: Box::new(from_expr("j1")),
            right: Box::new(from_expr("j2")),
            condition: nary(NAryOp::Eq, vec![path("j1", &["i"]), path("j2", &["i"])]),
            metas: m(),
        }
    );
}

#[test]
fn comma_join_is_implicit_inner_with_literal_true() {
    let select = select_shape("SELECT * FROM a, b");
    assert_eq!(
        select.from,
        FromSource::Join {
            op: JoinOp::Inner,
            left: Box::new(from_expr("a")),
            right: Box::new(from_expr("b")),
            condition: Expr::Literal {
                value: Value::Boolean(true),
                metas: m(),
            },
            metas: m().with_implicit_join(),
        }
    );
}

#[test]
fn left_join_with_where_clause() {
    let select = select_shape("SELECT * FROM t LEFT JOIN u ON t.i = u.i WHERE u.k = 1");
    assert_eq!(
        select.from,
        FromSource::Join {
            op: JoinOp::Left,
            left: Box::new(from_expr("t")),
            right: Box::new(from_expr("u")),
            condition: nary(NAryOp::Eq, vec![path("t", &["i"]), path("u", &["i"])]),
            metas: m(),
        }
    );
    assert_eq!(
        select.where_clause,
        Some(nary(NAryOp::Eq, vec![path("u", &["k"]), int(1)]))
    );
}

#[test]
fn cross_join_is_explicit_inner_with_literal_true() {
    let select = select_shape("SELECT * FROM a CROSS JOIN b");
    match select.from {
        FromSource::Join {
            op, condition, metas, ..
        } => {
            assert_eq!(op, JoinOp::Inner);
            assert_eq!(
                condition,
                Expr::Literal {
                    value: Value::Boolean(true),
                    metas: m(),
                }
            );
            assert!(!metas.is_implicit_join);
        }
        other => panic!("expected a join, got {other:?}"),
    }
}

#[test]
fn join_variants_map_to_their_ops() {
    for (source, op) in [
        ("SELECT * FROM a INNER JOIN b ON x", JoinOp::Inner),
        ("SELECT * FROM a LEFT OUTER JOIN b ON x", JoinOp::Left),
        ("SELECT * FROM a RIGHT JOIN b ON x", JoinOp::Right),
        ("SELECT * FROM a FULL OUTER JOIN b ON x", JoinOp::Outer),
        ("SELECT * FROM a OUTER JOIN b ON x", JoinOp::Outer),
    ] {
        let select = select_shape(source);
        match select.from {
            FromSource::Join { op: actual, .. } => assert_eq!(actual, op, "for `{source}`"),
            other => panic!("expected a join for `{source}`, got {other:?}"),
        }
    }
}

#[test]
fn joins_fold_left_associatively() {
    let select = select_shape("SELECT * FROM a, b, c");
    match select.from {
        FromSource::Join { left, right, .. } => {
            assert!(matches!(*left, FromSource::Join { .. }));
            assert_eq!(
                *right,
                FromSource::Expr {
                    expr: var("c"),
                    as_alias: None,
                    at_alias: None,
                }
            );
        }
        other => panic!("expected a join, got {other:?}"),
    }
}

#[test]
fn select_value_projection() {
    let select = select_shape("SELECT VALUE v FROM data");
    assert_eq!(select.projection, SelectProjection::Value(var("v")));
}

#[test]
fn pivot_projection_swaps_into_key_value() {
    let select = select_shape("PIVOT v AT k FROM data");
    assert_eq!(
        select.projection,
        SelectProjection::Pivot {
            key: var("k"),
            value: var("v"),
        }
    );
}

#[test]
fn select_distinct_lifts_into_the_quantifier() {
    let select = select_shape("SELECT DISTINCT a FROM t");
    assert_eq!(select.set_quantifier, SetQuantifier::Distinct);
}

#[test]
fn from_unpivot_with_aliases() {
    let select = select_shape("SELECT * FROM UNPIVOT e AS v AT a");
    assert_eq!(
        select.from,
        FromSource::Unpivot {
            expr: var("e"),
            as_alias: Some("v".to_string()),
            at_alias: Some("a".to_string()),
            metas: m(),
        }
    );
}

#[test]
fn at_and_as_aliases_accepted_in_either_order() {
    let select = select_shape("SELECT * FROM e AT i AS v");
    assert_eq!(
        select.from,
        FromSource::Expr {
            expr: var("e"),
            as_alias: Some("v".to_string()),
            at_alias: Some("i".to_string()),
        }
    );
}

#[test]
fn implicit_projection_alias() {
    let select = select_shape("SELECT a b FROM t");
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![SelectListItem::Expr {
            expr: var("a"),
            as_alias: Some("b".to_string()),
        }])
    );
}

#[test]
fn group_partial_by() {
    let select = select_shape("SELECT a FROM t GROUP PARTIAL BY a");
    assert_eq!(
        select.group_by.map(|g| g.strategy),
        Some(GroupingStrategy::Partial)
    );
}

#[test]
fn group_key_alias() {
    let select = select_shape("SELECT a FROM t GROUP BY a AS key1");
    assert_eq!(
        select.group_by.unwrap().items,
        vec![GroupByItem {
            expr: var("a"),
            as_alias: Some("key1".to_string()),
        }]
    );
}

#[test]
fn having_and_limit() {
    let select = select_shape("SELECT a FROM t GROUP BY a HAVING a > 1 LIMIT 10");
    assert_eq!(select.having, Some(nary(NAryOp::Gt, vec![var("a"), int(1)])));
    assert_eq!(select.limit, Some(int(10)));
}

#[test]
fn having_without_group_by_is_accepted_syntactically() {
    let select = select_shape("SELECT a FROM t HAVING a > 1");
    assert_eq!(select.group_by, None);
    assert!(select.having.is_some());
}

#[test]
fn subquery_in_from_with_alias() {
    let select = select_shape("SELECT a FROM (SELECT b FROM c) AS x");
    match select.from {
        FromSource::Expr { expr, as_alias, .. } => {
            assert!(matches!(expr, Expr::Select(_)));
            assert_eq!(as_alias.as_deref(), Some("x"));
        }
        other => panic!("expected an expression source, got {other:?}"),
    }
}

// ── Project-all rewriting ──────────────────────────────────────────────

#[test]
fn trailing_dot_star_becomes_project_all() {
    let select = select_shape("SELECT a.b.* FROM t");
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![SelectListItem::ProjectAll {
            expr: path("a", &["b"]),
        }])
    );

    // Only the root remaining collapses to the bare variable.
    let select = select_shape("SELECT a.* FROM t");
    assert_eq!(
        select.projection,
        SelectProjection::List(vec![SelectListItem::ProjectAll { expr: var("a") }])
    );
}

#[test]
fn plain_paths_in_the_select_list_stay_expressions() {
    let select = select_shape("SELECT a.b, c[0] FROM t");
    match select.projection {
        SelectProjection::List(items) => {
            assert_eq!(items.len(), 2);
            assert!(matches!(items[0], SelectListItem::Expr { .. }));
            assert!(matches!(items[1], SelectListItem::Expr { .. }));
        }
        other => panic!("expected a list projection, got {other:?}"),
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn empty_select_list() {
    assert_eq!(parse_err("SELECT FROM t").code, ErrorCode::ParseEmptySelect);
}

#[test]
fn star_must_be_alone() {
    assert_eq!(
        parse_err("SELECT *, x FROM t").code,
        ErrorCode::ParseAsteriskIsNotAloneInSelectList
    );
    assert_eq!(
        parse_err("SELECT x, * FROM t").code,
        ErrorCode::ParseAsteriskIsNotAloneInSelectList
    );
}

#[test]
fn select_requires_from() {
    assert_eq!(parse_err("SELECT a").code, ErrorCode::ParseSelectMissingFrom);
}

#[test]
fn cast_arity_violation_carries_properties() {
    let err = parse_err("CAST(x AS DECIMAL(1,2,3))");
    assert_eq!(err.code, ErrorCode::ParseCastArity);
    assert_eq!(
        err.properties.get(&Property::CastTo),
        Some(&PropertyValue::Text("decimal".to_string()))
    );
    assert_eq!(
        err.properties.get(&Property::ExpectedArityMin),
        Some(&PropertyValue::Integer(0))
    );
    assert_eq!(
        err.properties.get(&Property::ExpectedArityMax),
        Some(&PropertyValue::Integer(2))
    );

    assert_eq!(
        parse_err("CAST(x AS BOOLEAN(1))").code,
        ErrorCode::ParseCastArity
    );
}

#[test]
fn type_parameters_must_be_unsigned_integers() {
    assert_eq!(
        parse_err("CAST(x AS CHAR(a))").code,
        ErrorCode::ParseInvalidTypeParam
    );
    assert_eq!(
        parse_err("CAST(x AS CHAR(-1))").code,
        ErrorCode::ParseInvalidTypeParam
    );
}

#[test]
fn cast_requires_a_type_name() {
    assert_eq!(
        parse_err("CAST(x AS foo)").code,
        ErrorCode::ParseExpectedTypeName
    );
}

#[test]
fn wildcards_rejected_in_select_list_paths() {
    assert_eq!(
        parse_err("SELECT foo.*.bar FROM t").code,
        ErrorCode::ParseInvalidContextForWildcardInSelectList
    );
    assert_eq!(
        parse_err("SELECT foo[*] FROM t").code,
        ErrorCode::ParseInvalidContextForWildcardInSelectList
    );
    assert_eq!(
        parse_err("SELECT foo[1].* FROM t").code,
        ErrorCode::ParseCannotMixSqbAndWildcardInSelectList
    );
}

#[test]
fn group_by_rejects_literals() {
    assert_eq!(
        parse_err("SELECT a FROM t GROUP BY 1").code,
        ErrorCode::ParseUnsupportedLiteralsGroupBy
    );
}

#[test]
fn aggregates_are_unary() {
    let err = parse_err("SELECT sum(a, b) FROM t");
    assert_eq!(err.code, ErrorCode::ParseNonUnaryAggregateFunctionCall);
    assert_eq!(
        err.properties.get(&Property::FunctionName),
        Some(&PropertyValue::Text("sum".to_string()))
    );
}

#[test]
fn star_argument_only_for_count() {
    assert_eq!(
        parse_err("SELECT sum(*) FROM t").code,
        ErrorCode::ParseUnsupportedCallWithStar
    );
    assert_eq!(
        parse_err("SELECT count(distinct *) FROM t").code,
        ErrorCode::ParseUnsupportedCallWithStar
    );
}

#[test]
fn trailing_tokens_are_rejected() {
    assert_eq!(parse_err("1 1").code, ErrorCode::ParseUnexpectedToken);
    assert_eq!(parse_err("1; 2").code, ErrorCode::ParseUnexpectedToken);
    // One trailing semicolon is fine.
    assert!(parse_expression("1;").is_ok());
}

#[test]
fn order_by_is_not_supported() {
    assert_eq!(
        parse_err("SELECT a FROM t ORDER BY a").code,
        ErrorCode::ParseUnexpectedToken
    );
}

#[test]
fn empty_input_expects_an_expression() {
    assert_eq!(parse_err("").code, ErrorCode::ParseExpectedExpression);
    assert_eq!(parse_err("(  )").code, ErrorCode::ParseExpectedExpression);
}

#[test]
fn at_sign_requires_an_identifier() {
    assert_eq!(parse_err("@").code, ErrorCode::ParseMissingIdentAfterAt);
    assert_eq!(parse_err("@1").code, ErrorCode::ParseMissingIdentAfterAt);
}

#[test]
fn alias_errors() {
    assert_eq!(
        parse_err("SELECT a AS 1 FROM t").code,
        ErrorCode::ParseExpectedIdentForAlias
    );
    assert_eq!(
        parse_err("SELECT * FROM t AT 1").code,
        ErrorCode::ParseExpectedIdentForAt
    );
    assert_eq!(
        parse_err("SELECT a FROM t GROUP BY a GROUP AS 1").code,
        ErrorCode::ParseExpectedIdentForGroupName
    );
}

#[test]
fn case_requires_a_when_clause() {
    assert_eq!(
        parse_err("CASE a END").code,
        ErrorCode::ParseExpectedWhenClause
    );
}

#[test]
fn extract_requires_a_date_part() {
    assert_eq!(
        parse_err("extract(foo from x)").code,
        ErrorCode::ParseExpectedDatePart
    );
}

#[test]
fn between_requires_and() {
    let err = parse_err("a between 1 or 2");
    assert_eq!(err.code, ErrorCode::ParseExpectedKeyword);
    assert_eq!(
        err.properties.get(&Property::Keyword),
        Some(&PropertyValue::Text("and".to_string()))
    );
}

#[test]
fn invalid_path_component() {
    assert_eq!(
        parse_err("a.").code,
        ErrorCode::ParseInvalidPathComponent
    );
    assert_eq!(
        parse_err("a.1").code,
        ErrorCode::ParseInvalidPathComponent
    );
}

#[test]
fn errors_carry_positions() {
    let err = parse_err("SELECT\nFROM t");
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(1));

    let err = parse_err("  CAST(x AS DECIMAL(1,2,3))");
    assert!(err.line().is_some());
    assert!(err.column().is_some());
}

// ── Universal invariants ───────────────────────────────────────────────

/// Walk an expression asserting every node carries a source location.
fn assert_located(expr: &Expr) {
    assert!(
        expr.metas().location.is_some(),
        "node without location: {expr:?}"
    );
    match expr {
        Expr::Literal { .. } | Expr::LiteralMissing { .. } | Expr::VarRef { .. } => {}
        Expr::List { items, .. } | Expr::Bag { items, .. } => {
            items.iter().for_each(assert_located);
        }
        Expr::Struct { fields, .. } => {
            for field in fields {
                assert_located(&field.key);
                assert_located(&field.value);
            }
        }
        Expr::NAry { args, .. } => args.iter().for_each(assert_located),
        Expr::Typed { expr, .. } => assert_located(expr),
        Expr::Path { root, components, .. } => {
            assert_located(root);
            for component in components {
                if let PathComponent::Expr { expr, .. } = component {
                    assert_located(expr);
                }
            }
        }
        Expr::SimpleCase {
            operand,
            when_clauses,
            else_clause,
            ..
        } => {
            assert_located(operand);
            for clause in when_clauses {
                assert_located(&clause.condition);
                assert_located(&clause.result);
            }
            if let Some(else_clause) = else_clause {
                assert_located(else_clause);
            }
        }
        Expr::SearchedCase {
            when_clauses,
            else_clause,
            ..
        } => {
            for clause in when_clauses {
                assert_located(&clause.condition);
                assert_located(&clause.result);
            }
            if let Some(else_clause) = else_clause {
                assert_located(else_clause);
            }
        }
        Expr::CallAgg { func, arg, .. } => {
            assert_located(func);
            assert_located(arg);
        }
        Expr::CallAggWildcard { func, .. } => assert_located(func),
        Expr::Select(select) => {
            match &select.projection {
                SelectProjection::List(items) => {
                    for item in items {
                        match item {
                            SelectListItem::Star { metas } => {
                                assert!(metas.location.is_some());
                            }
                            SelectListItem::ProjectAll { expr }
                            | SelectListItem::Expr { expr, .. } => assert_located(expr),
                        }
                    }
                }
                SelectProjection::Value(expr) => assert_located(expr),
                SelectProjection::Pivot { key, value } => {
                    assert_located(key);
                    assert_located(value);
                }
            }
            assert_from_located(&select.from);
            if let Some(where_clause) = &select.where_clause {
                assert_located(where_clause);
            }
            if let Some(group_by) = &select.group_by {
                for item in &group_by.items {
                    assert_located(&item.expr);
                }
            }
            if let Some(having) = &select.having {
                assert_located(having);
            }
            if let Some(limit) = &select.limit {
                assert_located(limit);
            }
        }
    }
}

fn assert_from_located(from: &FromSource) {
    match from {
        FromSource::Expr { expr, .. } => assert_located(expr),
        FromSource::Unpivot { expr, metas, .. } => {
            assert!(metas.location.is_some());
            assert_located(expr);
        }
        FromSource::Join {
            left,
            right,
            condition,
            metas,
            ..
        } => {
            assert!(metas.location.is_some());
            assert_from_located(left);
            assert_from_located(right);
            assert_located(condition);
        }
    }
}

#[test]
fn every_node_carries_a_source_location() {
    for source in [
        "a + b * c - foo(1, x.y)",
        "SELECT rep, SUM(total_sales) AS total FROM r WHERE y >= `2001T` GROUP BY rep",
        "SELECT * FROM a, b LEFT JOIN c ON a.x = c.x WHERE a.k = 1 HAVING z LIMIT 5",
        "PIVOT v AT k FROM data, other",
        "case when a then [1, {'k': <<2>>}] else cast(b as decimal(1)) end",
        "SELECT a.b.* FROM UNPIVOT e AS v AT i",
        "a is not null and b not in (1, 2) and c not like 'x' and d not between 1 and 2",
    ] {
        let parsed = parse(source);
        assert_located(&parsed);
    }
}

#[test]
fn parsing_is_deterministic() {
    let source = "SELECT rep, SUM(total) FROM r WHERE y >= `2001T` GROUP BY rep GROUP AS g";
    assert_eq!(parse(source), parse(source));
}

#[test]
fn negated_operators_always_normalize() {
    for source in [
        "a is not null",
        "a not like 'x'",
        "a not between 1 and 2",
        "a not in (1)",
    ] {
        match parse(source) {
            Expr::NAry { op, args, metas } => {
                assert_eq!(op, NAryOp::Not, "for `{source}`");
                assert_eq!(args.len(), 1, "for `{source}`");
                assert!(metas.legacy_logical_not, "for `{source}`");
            }
            other => panic!("expected a NOT wrapper for `{source}`, got {other:?}"),
        }
    }
}

#[test]
fn whitespace_and_comments_do_not_change_shape() {
    assert_eq!(
        shape("SELECT a FROM t WHERE b = 1"),
        shape("SELECT /* projection */ a\n  FROM t -- source\n  WHERE b = 1")
    );
}
