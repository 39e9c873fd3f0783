//! Default precedence table.
//!
//! Higher values bind tighter. A node is parenthesized when its precedence
//! is lower than the ambient one set by its parent.

use super::{Compiler, PrecedenceKey};
use crate::ast::types;

/// Top level of a statement.
pub const TOP: u8 = 0;
/// Select or set operation carrying ORDER BY, LIMIT or OFFSET.
pub const LIMITED_QUERY: u8 = 3;
/// Set operation.
pub const SET_OPERATION: u8 = 4;
/// Plain select.
pub const SELECT: u8 = 5;
/// Clause level: select list, WHERE, FROM, function arguments.
pub const CLAUSE: u8 = 6;
/// `OR`.
pub const OR: u8 = 80;
/// `AND`.
pub const AND: u8 = 90;
/// Prefix `NOT`.
pub const NOT: u8 = 100;
/// `=`, `<>`, `<=`, `>=` and friends.
pub const COMPARISON: u8 = 110;
/// `<` and `>`.
pub const ORDER_COMPARISON: u8 = 120;
/// `LIKE` family and `BETWEEN`.
pub const PATTERN: u8 = 130;
/// `IN` and `NOT IN`.
pub const IN: u8 = 140;
/// `IS` and `IS NOT`.
pub const IS: u8 = 150;
/// Operators without a dedicated entry.
pub const OTHER: u8 = 160;
/// Binary `+` and `-`.
pub const ADDITIVE: u8 = 170;
/// `*`, `/` and `%`.
pub const MULTIPLICATIVE: u8 = 180;
/// `^`.
pub const EXPONENT: u8 = 190;
/// Prefix `-`, `+` and `~`.
pub const UNARY: u8 = 200;
/// Atoms that never need parentheses.
pub const MAX: u8 = 255;

/// Operator symbol reported by a select or set operation carrying ORDER BY,
/// LIMIT or OFFSET.
pub const LIMITED: &str = "LIMIT";

/// Operators rendered with their right operand at the same precedence.
pub(crate) fn is_associative(op: &str) -> bool {
    matches!(op, "AND" | "OR" | "+" | "*" | "||")
}

/// Registers the default precedence table on `compiler`.
pub fn install(compiler: &Compiler) {
    use PrecedenceKey as K;

    let binary = |op: &str| K::op(&types::BINARY, op);
    compiler
        .set_precedence(LIMITED_QUERY, [
            K::op(&types::SELECT, LIMITED),
            K::op(&types::UNION, LIMITED),
            K::op(&types::INTERSECT, LIMITED),
            K::op(&types::EXCEPT, LIMITED),
        ])
        .set_precedence(SET_OPERATION, [
            K::of(&types::UNION),
            K::of(&types::INTERSECT),
            K::of(&types::EXCEPT),
        ])
        .set_precedence(SELECT, [K::of(&types::SELECT)])
        .set_precedence(CLAUSE, [K::of(&types::TABLE_ALIAS)])
        .set_precedence(OR, [binary("OR")])
        .set_precedence(AND, [binary("AND")])
        .set_precedence(NOT, [K::op(&types::PREFIX, "NOT")])
        .set_precedence(COMPARISON, [
            binary("="),
            binary("<>"),
            binary("!="),
            binary("<="),
            binary(">="),
        ])
        .set_precedence(ORDER_COMPARISON, [binary("<"), binary(">")])
        .set_precedence(PATTERN, [K::of(&types::LIKE), K::of(&types::TERNARY)])
        .set_precedence(IN, [binary("IN"), binary("NOT IN")])
        .set_precedence(IS, [binary("IS"), binary("IS NOT")])
        .set_precedence(OTHER, [K::of(&types::BINARY), K::of(&types::CONCAT)])
        .set_precedence(ADDITIVE, [binary("+"), binary("-")])
        .set_precedence(MULTIPLICATIVE, [binary("*"), binary("/"), binary("%")])
        .set_precedence(EXPONENT, [binary("^")])
        .set_precedence(UNARY, [
            K::op(&types::PREFIX, "-"),
            K::op(&types::PREFIX, "+"),
            K::op(&types::PREFIX, "~"),
        ])
        .set_precedence(MAX, [
            K::of(&types::VALUE),
            K::of(&types::NAME),
            K::of(&types::FIELD),
            K::of(&types::PARENTHESES),
            K::of(&types::FUNC),
        ]);
}
