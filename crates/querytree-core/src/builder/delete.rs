//! DELETE builder.

use std::any::Any;

use super::options::Logical;
use super::select::combine;
use crate::ast::{types, Expr, ExprList, LimitOffset, Node, NodeType};

/// An immutable DELETE builder.
#[derive(Debug, Clone)]
pub struct Delete {
    table: Option<Expr>,
    where_clause: Option<Expr>,
    order_by: ExprList,
    bounds: LimitOffset,
    returning: ExprList,
}

impl Delete {
    /// Creates a delete from `table`.
    pub fn new(table: impl Into<Expr>) -> Self {
        Self::from_parts(Some(table.into()), None, ExprList::new(), LimitOffset::default())
    }

    pub(crate) fn from_parts(
        table: Option<Expr>,
        where_clause: Option<Expr>,
        order_by: ExprList,
        bounds: LimitOffset,
    ) -> Self {
        Self {
            table,
            where_clause,
            order_by,
            bounds,
            returning: ExprList::new(),
        }
    }

    /// ANDs a condition into WHERE.
    #[must_use]
    pub fn where_clause(&self, condition: impl Into<Expr>) -> Self {
        self.where_with(condition, Some(Logical::And))
    }

    /// Combines a condition into WHERE, or replaces it when `logical` is
    /// `None`.
    #[must_use]
    pub fn where_with(&self, condition: impl Into<Expr>, logical: Option<Logical>) -> Self {
        Self {
            where_clause: Some(combine(self.where_clause.as_ref(), condition.into(), logical)),
            ..self.clone()
        }
    }

    /// Appends to the RETURNING list.
    #[must_use]
    pub fn returning(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        let mut list = self.returning.clone();
        list.extend(items);
        Self {
            returning: list,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn get_table(&self) -> Option<&Expr> {
        self.table.as_ref()
    }

    #[must_use]
    pub const fn get_where(&self) -> Option<&Expr> {
        self.where_clause.as_ref()
    }

    #[must_use]
    pub const fn get_order_by(&self) -> &ExprList {
        &self.order_by
    }

    #[must_use]
    pub const fn bounds(&self) -> LimitOffset {
        self.bounds
    }

    #[must_use]
    pub const fn get_returning(&self) -> &ExprList {
        &self.returning
    }
}

impl Node for Delete {
    fn node_type(&self) -> &'static NodeType {
        &types::DELETE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::ast::into_expr!(Delete);
