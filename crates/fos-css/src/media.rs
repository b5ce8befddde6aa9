//! Media Query Evaluation
//!
//! Media queries are evaluated against a single configured media type.
//! A query is a list of groups separated by `,` or `or`; it holds when any
//! group holds. Terms inside a group are joined by `and` and all must hold.
//! `not` negates the next term and `only` is ignored. Parenthesized
//! feature expressions are skipped and do not affect the result.

use crate::token::{Token, TokenKind};

/// Whether a media word names the configured media
fn media_matches(word: &str, media: &str) -> bool {
    word.eq_ignore_ascii_case("all") || word.eq_ignore_ascii_case(media)
}

/// Evaluate a media query given as tokens; an empty query holds
pub fn evaluate(tokens: &[Token], media: &str) -> bool {
    let mut any = false;
    let mut group = true;
    let mut negate = false;
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;
        match &tok.kind {
            TokenKind::Reserved(',') => {
                any |= group;
                group = true;
                negate = false;
            }
            TokenKind::Str(word) if word.eq_ignore_ascii_case("or") => {
                any |= group;
                group = true;
                negate = false;
            }
            TokenKind::Str(word) if word.eq_ignore_ascii_case("not") => negate = !negate,
            TokenKind::Str(word)
                if word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("only") => {}
            TokenKind::Str(word) if word.starts_with('(') => {
                let mut depth = word.matches('(').count();
                while depth > 0 && i < tokens.len() {
                    match &tokens[i].kind {
                        TokenKind::Reserved(')') => depth -= 1,
                        TokenKind::Str(s) => depth += s.matches('(').count(),
                        _ => {}
                    }
                    i += 1;
                }
                negate = false;
            }
            _ => {
                let term = media_matches(&tok.text(), media);
                group &= term != negate;
                negate = false;
            }
        }
    }
    any || group
}
