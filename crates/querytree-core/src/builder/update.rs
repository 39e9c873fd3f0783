//! UPDATE builder.

use std::any::Any;
use std::sync::Arc;

use super::options::Logical;
use super::select::combine;
use crate::ast::{types, Expr, ExprList, LimitOffset, Node, NodeType, Operand};

/// An immutable UPDATE builder.
#[derive(Debug, Clone)]
pub struct Update {
    table: Option<Expr>,
    assignments: Arc<Vec<(Expr, Expr)>>,
    where_clause: Option<Expr>,
    order_by: ExprList,
    bounds: LimitOffset,
    returning: ExprList,
}

impl Update {
    /// Creates an update of `table`.
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
            assignments: Arc::new(Vec::new()),
            where_clause,
            order_by,
            bounds,
            returning: ExprList::new(),
        }
    }

    /// Adds `field = value` to the SET list.
    #[must_use]
    pub fn set(&self, field: impl Into<Expr>, value: impl Into<Operand>) -> Self {
        let mut assignments = Arc::clone(&self.assignments);
        Arc::make_mut(&mut assignments).push((field.into(), Operand::wrap(value)));
        Self {
            assignments,
            ..self.clone()
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

    /// Returns the updated table.
    #[must_use]
    pub const fn get_table(&self) -> Option<&Expr> {
        self.table.as_ref()
    }

    /// Returns the SET assignments.
    #[must_use]
    pub fn get_assignments(&self) -> &[(Expr, Expr)] {
        &self.assignments
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

impl Node for Update {
    fn node_type(&self) -> &'static NodeType {
        &types::UPDATE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::ast::into_expr!(Update);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Table;
    use crate::builder::Select;

    #[test]
    fn test_update_carries_query_parts() {
        let t = Table::new("t");
        let update = Select::new()
            .from(&t)
            .where_clause(t.get_field("id").eq(1))
            .order_by([t.get_field("id")])
            .limit(2)
            .update([(t.get_field("a"), 5)]);
        assert!(update.get_table().is_some());
        assert!(update.get_where().is_some());
        assert_eq!(update.get_order_by().len(), 1);
        assert_eq!(update.bounds().limit(), Some(2));
        assert_eq!(update.get_assignments().len(), 1);
    }

    #[test]
    fn test_set_does_not_alias() {
        let t = Table::new("t");
        let base = Update::new(&t);
        let one = base.set(t.get_field("a"), 1);
        let two = one.set(t.get_field("b"), 2);
        assert!(base.get_assignments().is_empty());
        assert_eq!(one.get_assignments().len(), 1);
        assert_eq!(two.get_assignments().len(), 2);
    }
}
