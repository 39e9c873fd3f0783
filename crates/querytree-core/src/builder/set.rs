//! UNION, INTERSECT and EXCEPT.

use std::any::Any;
use std::sync::Arc;

use super::options::ListOptions;
use super::select::extend_list;
use crate::ast::{types, Expr, ExprList, LimitOffset, Node, NodeType, Ordering};
use crate::compiler::precedence;

/// Set operator of a [`SetOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    /// `UNION`, or `UNION ALL` when duplicates are kept.
    Union,
    /// `INTERSECT`.
    Intersect,
    /// `EXCEPT`.
    Except,
}

impl SetKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }

    const fn node_type(self) -> &'static NodeType {
        match self {
            Self::Union => &types::UNION,
            Self::Intersect => &types::INTERSECT,
            Self::Except => &types::EXCEPT,
        }
    }
}

/// A set operation over two or more queries.
///
/// Chained operations of the same kind are flattened into one operand
/// list: `a.union(b).union(c)` holds `[a, b, c]`.
#[derive(Debug, Clone)]
pub struct SetOperation {
    kind: SetKind,
    all: bool,
    operands: Arc<Vec<Expr>>,
    order_by: ExprList,
    bounds: LimitOffset,
}

impl SetOperation {
    /// Combines `left` and `right`, flattening operands of the same shape.
    pub fn new(kind: SetKind, all: bool, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        let mut operands = Vec::new();
        Self::push_operand(&mut operands, kind, all, left.into());
        let right = right.into();
        if kind == SetKind::Except {
            operands.push(right);
        } else {
            Self::push_operand(&mut operands, kind, all, right);
        }
        Self {
            kind,
            all,
            operands: Arc::new(operands),
            order_by: ExprList::new(),
            bounds: LimitOffset::default(),
        }
    }

    fn push_operand(operands: &mut Vec<Expr>, kind: SetKind, all: bool, operand: Expr) {
        match operand.downcast_ref::<Self>() {
            Some(set) if set.kind == kind && set.all == all && !set.is_limited() => {
                operands.extend(set.operands.iter().cloned());
            }
            _ => operands.push(operand),
        }
    }

    /// Returns the set operator.
    #[must_use]
    pub const fn kind(&self) -> SetKind {
        self.kind
    }

    /// Returns `true` for the ALL variant.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.all
    }

    /// Returns the combined queries.
    #[must_use]
    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }

    /// `self UNION other`.
    #[must_use]
    pub fn union(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Union, false, self.clone(), other)
    }

    /// `self UNION ALL other`.
    #[must_use]
    pub fn union_all(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Union, true, self.clone(), other)
    }

    /// `self INTERSECT other`.
    #[must_use]
    pub fn intersect(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Intersect, false, self.clone(), other)
    }

    /// `self INTERSECT ALL other`.
    #[must_use]
    pub fn intersect_all(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Intersect, true, self.clone(), other)
    }

    /// `self EXCEPT other`.
    #[must_use]
    pub fn except(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Except, false, self.clone(), other)
    }

    /// `self EXCEPT ALL other`.
    #[must_use]
    pub fn except_all(&self, other: impl Into<Expr>) -> Self {
        Self::new(SetKind::Except, true, self.clone(), other)
    }

    /// Appends ascending items to the ORDER BY list.
    #[must_use]
    pub fn order_by(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.order_by_with(items, ListOptions::default())
    }

    /// Appends to, or with `reset` replaces, the ORDER BY list.
    #[must_use]
    pub fn order_by_with(
        &self,
        items: impl IntoIterator<Item = impl Into<Expr>>,
        options: ListOptions,
    ) -> Self {
        let items = items.into_iter().map(|item| {
            let item: Expr = item.into();
            match (item.downcast_ref::<Ordering>(), options.desc) {
                (Some(_), _) => item,
                (None, true) => Expr::new(Ordering::desc(item)),
                (None, false) => Expr::new(Ordering::asc(item)),
            }
        });
        Self {
            order_by: extend_list(&self.order_by, items, options),
            ..self.clone()
        }
    }

    /// Returns the ORDER BY list.
    #[must_use]
    pub const fn get_order_by(&self) -> &ExprList {
        &self.order_by
    }

    /// Sets LIMIT.
    #[must_use]
    pub fn limit(&self, limit: u64) -> Self {
        Self {
            bounds: LimitOffset::new(Some(limit), self.bounds.offset()),
            ..self.clone()
        }
    }

    /// Sets OFFSET.
    #[must_use]
    pub fn offset(&self, offset: u64) -> Self {
        Self {
            bounds: LimitOffset::new(self.bounds.limit(), Some(offset)),
            ..self.clone()
        }
    }

    /// Returns LIMIT and OFFSET.
    #[must_use]
    pub const fn bounds(&self) -> LimitOffset {
        self.bounds
    }

    /// Returns `true` if the operation carries ORDER BY, LIMIT or OFFSET.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        !self.order_by.is_empty() || !self.bounds.is_empty()
    }
}

impl Node for SetOperation {
    fn node_type(&self) -> &'static NodeType {
        self.kind.node_type()
    }

    fn operator(&self) -> Option<&str> {
        self.is_limited().then_some(precedence::LIMITED)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::ast::into_expr!(SetOperation);
