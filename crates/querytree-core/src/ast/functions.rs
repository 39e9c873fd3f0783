//! Shorthands for common SQL functions.

use super::datatype;
use super::expression::{raw, Func};
use super::{Expr, Node, Operand};

/// `COUNT(expr)`.
pub fn count(expr: impl Into<Operand>) -> Func {
    Func::new("COUNT", [expr]).returning(&datatype::INTEGER)
}

/// `COUNT(*)`.
#[must_use]
pub fn count_all() -> Func {
    Func::new("COUNT", [raw("*")]).returning(&datatype::INTEGER)
}

/// `SUM(expr)`.
pub fn sum(expr: impl Into<Operand>) -> Func {
    Func::new("SUM", [expr]).returning(&datatype::NUMERIC)
}

/// `AVG(expr)`.
pub fn avg(expr: impl Into<Operand>) -> Func {
    Func::new("AVG", [expr]).returning(&datatype::NUMERIC)
}

/// `MIN(expr)`.
pub fn min(expr: impl Into<Expr>) -> Func {
    let expr = expr.into();
    let ty = expr.data_type();
    Func::new("MIN", [expr]).returning(ty)
}

/// `MAX(expr)`.
pub fn max(expr: impl Into<Expr>) -> Func {
    let expr = expr.into();
    let ty = expr.data_type();
    Func::new("MAX", [expr]).returning(ty)
}

/// `LOWER(expr)`.
pub fn lower(expr: impl Into<Operand>) -> Func {
    Func::new("LOWER", [expr]).returning(&datatype::TEXT)
}

/// `UPPER(expr)`.
pub fn upper(expr: impl Into<Operand>) -> Func {
    Func::new("UPPER", [expr]).returning(&datatype::TEXT)
}

/// `COALESCE(a, b, ...)`.
pub fn coalesce(items: impl IntoIterator<Item = impl Into<Operand>>) -> Func {
    Func::new("COALESCE", items)
}

/// `REPLACE(expr, from, to)`.
pub fn replace(expr: impl Into<Expr>, from: &str, to: &str) -> Func {
    Func::new(
        "REPLACE",
        [
            Operand::Expr(expr.into()),
            Operand::from(from),
            Operand::from(to),
        ],
    )
    .returning(&datatype::TEXT)
}
