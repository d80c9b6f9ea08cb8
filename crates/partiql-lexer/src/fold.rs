//! Keyword folding: collapse multi-word keyword sequences into single
//! compound tokens with merged spans.
//!
//! The scanner emits one token per word; this pass rewrites the stream so
//! the parser only ever sees the canonical forms: `is not` becomes
//! [`TokenKind::IsNot`], `left outer join` becomes [`TokenKind::LeftJoin`],
//! `cross join` and bare `join` both become [`TokenKind::InnerJoin`], and
//! `double precision` becomes a single type-name token.
//!
//! Trivia between the words is absorbed into the compound token's span,
//! so the stream still tiles the source text exactly.

use partiql_common::token::{Token, TokenKind};

/// Fold recognized keyword sequences in a token stream.
///
/// Longest match wins: three-word joins are tried before two-word joins.
pub(crate) fn fold_keywords(tokens: Vec<Token>) -> Vec<Token> {
    let mut folded = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].kind.is_trivia() {
            folded.push(tokens[i].clone());
            i += 1;
            continue;
        }

        let j = next_significant(&tokens, i + 1);
        let k = j.and_then(|j| next_significant(&tokens, j + 1));
        let k0 = tokens[i].kind;
        let k1 = j.map(|j| tokens[j].kind);
        let k2 = k.map(|k| tokens[k].kind);

        // Three-word sequences: `left|right|full outer join`.
        if let (Some(TokenKind::Outer), Some(TokenKind::Join)) = (k1, k2) {
            let compound = match k0 {
                TokenKind::Left => Some(TokenKind::LeftJoin),
                TokenKind::Right => Some(TokenKind::RightJoin),
                TokenKind::Full => Some(TokenKind::OuterJoin),
                _ => None,
            };
            if let Some(kind) = compound {
                let last = k.expect("third token exists when its kind matched");
                folded.push(merge(kind, &tokens[i], &tokens[last]));
                i = last + 1;
                continue;
            }
        }

        // Two-word sequences.
        let compound = match (k0, k1) {
            (TokenKind::Is, Some(TokenKind::Not)) => Some(TokenKind::IsNot),
            (TokenKind::Not, Some(TokenKind::Between)) => Some(TokenKind::NotBetween),
            (TokenKind::Not, Some(TokenKind::Like)) => Some(TokenKind::NotLike),
            (TokenKind::Not, Some(TokenKind::In)) => Some(TokenKind::NotIn),
            (TokenKind::Left, Some(TokenKind::Join)) => Some(TokenKind::LeftJoin),
            (TokenKind::Right, Some(TokenKind::Join)) => Some(TokenKind::RightJoin),
            (TokenKind::Full, Some(TokenKind::Join)) => Some(TokenKind::OuterJoin),
            (TokenKind::Outer, Some(TokenKind::Join)) => Some(TokenKind::OuterJoin),
            (TokenKind::Inner, Some(TokenKind::Join)) => Some(TokenKind::InnerJoin),
            (TokenKind::Cross, Some(TokenKind::Join)) => Some(TokenKind::InnerJoin),
            (TokenKind::Double, Some(TokenKind::Precision)) => Some(TokenKind::DoublePrecision),
            _ => None,
        };
        if let Some(kind) = compound {
            let last = j.expect("second token exists when its kind matched");
            folded.push(merge(kind, &tokens[i], &tokens[last]));
            i = last + 1;
            continue;
        }

        // Bare `join` is an inner join.
        if k0 == TokenKind::Join {
            folded.push(Token {
                kind: TokenKind::InnerJoin,
                span: tokens[i].span,
            });
            i += 1;
            continue;
        }

        folded.push(tokens[i].clone());
        i += 1;
    }

    folded
}

/// Index of the next non-trivia token at or after `i`.
fn next_significant(tokens: &[Token], mut i: usize) -> Option<usize> {
    while i < tokens.len() {
        if !tokens[i].kind.is_trivia() {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn merge(kind: TokenKind, first: &Token, last: &Token) -> Token {
    Token {
        kind,
        span: first.span.cover(last.span),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn folds_is_not() {
        assert_eq!(
            kinds("a is not null"),
            vec![TokenKind::Ident, TokenKind::IsNot, TokenKind::Null, TokenKind::Eof]
        );
    }

    #[test]
    fn folds_negated_operators() {
        assert_eq!(kinds("a not between b and c")[1], TokenKind::NotBetween);
        assert_eq!(kinds("a not like b")[1], TokenKind::NotLike);
        assert_eq!(kinds("a not in b")[1], TokenKind::NotIn);
    }

    #[test]
    fn folds_join_variants() {
        assert_eq!(kinds("a join b")[1], TokenKind::InnerJoin);
        assert_eq!(kinds("a inner join b")[1], TokenKind::InnerJoin);
        assert_eq!(kinds("a cross join b")[1], TokenKind::InnerJoin);
        assert_eq!(kinds("a left join b")[1], TokenKind::LeftJoin);
        assert_eq!(kinds("a left outer join b")[1], TokenKind::LeftJoin);
        assert_eq!(kinds("a right join b")[1], TokenKind::RightJoin);
        assert_eq!(kinds("a right outer join b")[1], TokenKind::RightJoin);
        assert_eq!(kinds("a full join b")[1], TokenKind::OuterJoin);
        assert_eq!(kinds("a full outer join b")[1], TokenKind::OuterJoin);
        assert_eq!(kinds("a outer join b")[1], TokenKind::OuterJoin);
    }

    #[test]
    fn folds_double_precision() {
        assert_eq!(
            kinds("cast(x as double precision)"),
            vec![
                TokenKind::Cast,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::As,
                TokenKind::DoublePrecision,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn folded_span_covers_all_words() {
        let tokens: Vec<_> = Lexer::tokenize("x left outer join y")
            .unwrap()
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        // x=0..1, left=2..6, outer=7..12, join=13..17, y=18..19
        assert_eq!(tokens[1].kind, TokenKind::LeftJoin);
        assert_eq!(tokens[1].span.start, 2);
        assert_eq!(tokens[1].span.end, 17);
    }

    #[test]
    fn folds_across_interior_comments() {
        assert_eq!(
            kinds("a is /* odd */ not null"),
            vec![TokenKind::Ident, TokenKind::IsNot, TokenKind::Null, TokenKind::Eof]
        );
    }

    #[test]
    fn folded_stream_still_tiles_the_source() {
        let source = "x left outer join y";
        let tokens = Lexer::tokenize(source).unwrap();
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(token.span.start, offset);
            offset = token.span.end;
        }
        assert_eq!(offset as usize, source.len());
    }

    #[test]
    fn bare_not_is_left_alone() {
        assert_eq!(
            kinds("not a"),
            vec![TokenKind::Not, TokenKind::Ident, TokenKind::Eof]
        );
    }
}
