//! Operator surface of [`Expr`]: comparison and pattern methods plus the
//! `std::ops` impls.

use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, RangeInclusive, Rem, Sub};

use super::datatype;
use super::expression::{
    value, Alias, Binary, Cast, EscapeForLike, ExprList, Like, LikeKind, Ordering, Over,
    Parentheses, Prefix, Raw, Ternary,
};
use super::operators::OperatorRegistry;
use super::{Expr, Operand};
use crate::builder::value::SqlValue;
use crate::error::{Error, Result};

/// Where the `%` wildcards go around an escaped pattern.
#[derive(Clone, Copy)]
enum Wildcards {
    Prefix,
    Suffix,
    Both,
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    /// Builds `self op rhs` through the global operator registry.
    #[must_use]
    pub fn binary(&self, op: &str, rhs: impl Into<Operand>) -> Self {
        self.binary_with(OperatorRegistry::global(), op, rhs)
    }

    /// Builds `self op rhs` through an explicit operator registry.
    #[must_use]
    pub fn binary_with(&self, registry: &OperatorRegistry, op: &str, rhs: impl Into<Operand>) -> Self {
        registry.build(op, self.clone(), Operand::wrap(rhs))
    }

    fn compare(&self, op: &str, null_op: &str, list_op: &str, rhs: Operand) -> Self {
        match rhs {
            Operand::Value(SqlValue::Null) => Self::new(Binary::new(
                null_op,
                self.clone(),
                Raw::new("NULL"),
                &datatype::BOOLEAN,
            )),
            Operand::List(items) => Self::new(Binary::new(
                list_op,
                self.clone(),
                Parentheses::new(ExprList::from_operands(items)),
                &datatype::BOOLEAN,
            )),
            other => self.binary(op, other),
        }
    }

    /// `self = rhs`, `self IS NULL` for `None`, `self IN (...)` for lists.
    #[must_use]
    pub fn eq(&self, rhs: impl Into<Operand>) -> Self {
        self.compare("=", "IS", "IN", rhs.into())
    }

    /// `self <> rhs`, `self IS NOT NULL` for `None`, `self NOT IN (...)` for
    /// lists.
    #[must_use]
    pub fn ne(&self, rhs: impl Into<Operand>) -> Self {
        self.compare("<>", "IS NOT", "NOT IN", rhs.into())
    }

    /// `self < rhs`.
    #[must_use]
    pub fn lt(&self, rhs: impl Into<Operand>) -> Self {
        self.binary("<", rhs)
    }

    /// `self <= rhs`.
    #[must_use]
    pub fn le(&self, rhs: impl Into<Operand>) -> Self {
        self.binary("<=", rhs)
    }

    /// `self > rhs`.
    #[must_use]
    pub fn gt(&self, rhs: impl Into<Operand>) -> Self {
        self.binary(">", rhs)
    }

    /// `self >= rhs`.
    #[must_use]
    pub fn ge(&self, rhs: impl Into<Operand>) -> Self {
        self.binary(">=", rhs)
    }

    /// `self AND rhs`.
    #[must_use]
    pub fn and(&self, rhs: impl Into<Operand>) -> Self {
        self.binary("AND", rhs)
    }

    /// `self OR rhs`.
    #[must_use]
    pub fn or(&self, rhs: impl Into<Operand>) -> Self {
        self.binary("OR", rhs)
    }

    /// `NOT self`.
    #[must_use]
    pub fn not(&self) -> Self {
        Self::new(Prefix::new("NOT", self.clone()))
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(&self) -> Self {
        self.eq(SqlValue::Null)
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(&self) -> Self {
        self.ne(SqlValue::Null)
    }

    /// `self IN (items)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollection`] when `items` is empty.
    pub fn in_list(&self, items: impl IntoIterator<Item = impl Into<Operand>>) -> Result<Self> {
        self.membership("IN", items)
    }

    /// `self NOT IN (items)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollection`] when `items` is empty.
    pub fn not_in_list(&self, items: impl IntoIterator<Item = impl Into<Operand>>) -> Result<Self> {
        self.membership("NOT IN", items)
    }

    fn membership(&self, op: &str, items: impl IntoIterator<Item = impl Into<Operand>>) -> Result<Self> {
        let items: Vec<Operand> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(Error::EmptyCollection);
        }
        Ok(Self::new(Binary::new(
            op,
            self.clone(),
            Parentheses::new(ExprList::from_operands(items)),
            &datatype::BOOLEAN,
        )))
    }

    /// `self BETWEEN low AND high`.
    #[must_use]
    pub fn between(&self, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        Self::new(Ternary::new(
            "BETWEEN",
            "AND",
            self.clone(),
            Operand::wrap(low),
            Operand::wrap(high),
        ))
    }

    /// `self NOT BETWEEN low AND high`.
    #[must_use]
    pub fn not_between(&self, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        Self::new(Ternary::new(
            "NOT BETWEEN",
            "AND",
            self.clone(),
            Operand::wrap(low),
            Operand::wrap(high),
        ))
    }

    /// `self BETWEEN start AND end` for an inclusive range.
    #[must_use]
    pub fn slice<T: Into<Operand>>(&self, range: RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        self.between(start, end)
    }

    /// Equality against a single index value.
    #[must_use]
    pub fn index(&self, at: impl Into<Operand>) -> Self {
        self.eq(at)
    }

    /// `self LIKE pattern`, with the pattern used verbatim.
    #[must_use]
    pub fn like(&self, pattern: impl Into<Operand>) -> Self {
        Self::new(Like::new(LikeKind::Like, self.clone(), Operand::wrap(pattern)))
    }

    /// `self ILIKE pattern`.
    #[must_use]
    pub fn ilike(&self, pattern: impl Into<Operand>) -> Self {
        Self::new(Like::new(LikeKind::ILike, self.clone(), Operand::wrap(pattern)))
    }

    /// `self NOT LIKE pattern`.
    #[must_use]
    pub fn not_like(&self, pattern: impl Into<Operand>) -> Self {
        Self::new(Like::new(LikeKind::NotLike, self.clone(), Operand::wrap(pattern)))
    }

    /// `self NOT ILIKE pattern`.
    #[must_use]
    pub fn not_ilike(&self, pattern: impl Into<Operand>) -> Self {
        Self::new(Like::new(LikeKind::NotILike, self.clone(), Operand::wrap(pattern)))
    }

    /// `self` starts with `prefix`; wildcards in `prefix` match literally.
    #[must_use]
    pub fn startswith(&self, prefix: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, self.clone(), Operand::wrap(prefix), Wildcards::Suffix)
    }

    /// Case-insensitive [`Expr::startswith`].
    #[must_use]
    pub fn istartswith(&self, prefix: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, self.clone(), Operand::wrap(prefix), Wildcards::Suffix)
    }

    /// `self` ends with `suffix`; wildcards in `suffix` match literally.
    #[must_use]
    pub fn endswith(&self, suffix: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, self.clone(), Operand::wrap(suffix), Wildcards::Prefix)
    }

    /// Case-insensitive [`Expr::endswith`].
    #[must_use]
    pub fn iendswith(&self, suffix: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, self.clone(), Operand::wrap(suffix), Wildcards::Prefix)
    }

    /// `self` contains `needle`; wildcards in `needle` match literally.
    #[must_use]
    pub fn contains(&self, needle: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, self.clone(), Operand::wrap(needle), Wildcards::Both)
    }

    /// Case-insensitive [`Expr::contains`].
    #[must_use]
    pub fn icontains(&self, needle: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, self.clone(), Operand::wrap(needle), Wildcards::Both)
    }

    /// `subject` starts with the value of `self`.
    #[must_use]
    pub fn rstartswith(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, Operand::wrap(subject), self.clone(), Wildcards::Suffix)
    }

    /// `subject` ends with the value of `self`.
    #[must_use]
    pub fn rendswith(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, Operand::wrap(subject), self.clone(), Wildcards::Prefix)
    }

    /// `subject` contains the value of `self`.
    #[must_use]
    pub fn rcontains(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::Like, Operand::wrap(subject), self.clone(), Wildcards::Both)
    }

    /// Case-insensitive [`Expr::rstartswith`].
    #[must_use]
    pub fn ristartswith(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, Operand::wrap(subject), self.clone(), Wildcards::Suffix)
    }

    /// Case-insensitive [`Expr::rendswith`].
    #[must_use]
    pub fn riendswith(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, Operand::wrap(subject), self.clone(), Wildcards::Prefix)
    }

    /// Case-insensitive [`Expr::rcontains`].
    #[must_use]
    pub fn ricontains(&self, subject: impl Into<Operand>) -> Self {
        escaped_like(LikeKind::ILike, Operand::wrap(subject), self.clone(), Wildcards::Both)
    }

    /// `self || rhs`, resolved through the operator registry.
    #[must_use]
    pub fn concat(&self, rhs: impl Into<Operand>) -> Self {
        self.binary("||", rhs)
    }

    /// `self AS alias` in a select list, `alias` elsewhere.
    #[must_use]
    pub fn as_alias(&self, alias: impl Into<String>) -> Self {
        Self::new(Alias::new(self.clone(), alias))
    }

    /// `self ASC`.
    #[must_use]
    pub fn asc(&self) -> Self {
        Self::new(Ordering::asc(self.clone()))
    }

    /// `self DESC`.
    #[must_use]
    pub fn desc(&self) -> Self {
        Self::new(Ordering::desc(self.clone()))
    }

    /// `CAST(self AS target)`.
    #[must_use]
    pub fn cast(&self, target: impl Into<String>) -> Self {
        Self::new(Cast::new(self.clone(), target))
    }

    /// Starts a window over `self`.
    #[must_use]
    pub fn over(&self) -> Over {
        Over::new(self.clone())
    }
}

fn escaped_like(kind: LikeKind, subject: Expr, pattern: Expr, wildcards: Wildcards) -> Expr {
    let mut parts = Vec::with_capacity(3);
    if matches!(wildcards, Wildcards::Prefix | Wildcards::Both) {
        parts.push(value("%"));
    }
    parts.push(Expr::new(EscapeForLike::new(pattern)));
    if matches!(wildcards, Wildcards::Suffix | Wildcards::Both) {
        parts.push(value("%"));
    }
    Expr::new(Like::new(kind, subject, ExprList::concat(parts)).escaped())
}

impl<R: Into<Operand>> BitAnd<R> for Expr {
    type Output = Self;

    fn bitand(self, rhs: R) -> Self {
        self.and(rhs)
    }
}

impl<R: Into<Operand>> BitOr<R> for Expr {
    type Output = Self;

    fn bitor(self, rhs: R) -> Self {
        self.or(rhs)
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::new(Prefix::new("NOT", self))
    }
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(Prefix::new("-", self))
    }
}

macro_rules! arithmetic {
    ($($trait:ident, $method:ident, $op:literal);* $(;)?) => {
        $(
            impl<R: Into<Operand>> $trait<R> for Expr {
                type Output = Self;

                fn $method(self, rhs: R) -> Self {
                    self.binary($op, rhs)
                }
            }
        )*
    };
}

arithmetic!(
    Add, add, "+";
    Sub, sub, "-";
    Mul, mul, "*";
    Div, div, "/";
    Rem, rem, "%";
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{field, types, Node};

    #[test]
    fn test_eq_none_becomes_is_null() {
        let e = field("a").eq(None::<i32>);
        let b = e.downcast_ref::<Binary>().unwrap();
        assert_eq!(b.op(), "IS");
        assert_eq!(b.right().node_type(), &types::RAW);
    }

    #[test]
    fn test_eq_list_becomes_in() {
        let e = field("a").eq(vec![1, 2, 3]);
        let b = e.downcast_ref::<Binary>().unwrap();
        assert_eq!(b.op(), "IN");
        assert_eq!(b.right().node_type(), &types::PARENTHESES);
        let e = field("a").ne([1, 2]);
        assert_eq!(e.operator(), Some("NOT IN"));
    }

    #[test]
    fn test_in_list_rejects_empty() {
        let err = field("a").in_list(Vec::<i32>::new()).unwrap_err();
        assert_eq!(err, Error::EmptyCollection);
        assert!(field("a").not_in_list(Vec::<i32>::new()).is_err());
        assert!(field("a").in_list([1]).is_ok());
    }

    #[test]
    fn test_ops_traits_build_logical_nodes() {
        let e = field("a").gt(1) & field("b").lt(2);
        assert_eq!(e.operator(), Some("AND"));
        let e = field("a").gt(1) | field("b").lt(2);
        assert_eq!(e.operator(), Some("OR"));
        let e = !field("a");
        assert_eq!(e.node_type(), &types::PREFIX);
        let e = field("a") + 1;
        assert_eq!(e.operator(), Some("+"));
    }

    #[test]
    fn test_slice_is_between() {
        let e = field("a").slice(1..=5);
        let t = e.downcast_ref::<Ternary>().unwrap();
        assert_eq!(t.op(), "BETWEEN");
        assert_eq!(t.separator(), "AND");
    }

    #[test]
    fn test_startswith_wraps_pattern() {
        let e = field("a").startswith("x");
        let like = e.downcast_ref::<Like>().unwrap();
        assert!(like.has_escape());
        let pattern = like.pattern().downcast_ref::<ExprList>().unwrap();
        assert_eq!(pattern.node_type(), &types::CONCAT);
        assert_eq!(pattern.len(), 2);
        assert_eq!(pattern.items()[0].node_type(), &types::ESCAPE_FOR_LIKE);
    }

    #[test]
    fn test_reversed_case_insensitive_helpers() {
        let needle = value("ab");
        let e = needle.ricontains(field("title"));
        let like = e.downcast_ref::<Like>().unwrap();
        assert_eq!(like.kind(), LikeKind::ILike);
        assert_eq!(like.left().node_type(), &types::FIELD);
        let pattern = like.pattern().downcast_ref::<ExprList>().unwrap();
        assert_eq!(pattern.len(), 3);
        assert_eq!(pattern.items()[1].node_type(), &types::ESCAPE_FOR_LIKE);

        let e = needle.ristartswith(field("title"));
        let like = e.downcast_ref::<Like>().unwrap();
        let pattern = like.pattern().downcast_ref::<ExprList>().unwrap();
        assert_eq!(pattern.items()[0].node_type(), &types::ESCAPE_FOR_LIKE);

        let e = needle.riendswith(field("title"));
        let like = e.downcast_ref::<Like>().unwrap();
        let pattern = like.pattern().downcast_ref::<ExprList>().unwrap();
        assert_eq!(pattern.items()[1].node_type(), &types::ESCAPE_FOR_LIKE);
    }
}
