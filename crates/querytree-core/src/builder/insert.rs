//! INSERT builder and its conflict clause.

use std::any::Any;
use std::sync::Arc;

use crate::ast::{types, Expr, ExprList, Node, NodeType, Operand};

/// Row source of an INSERT.
#[derive(Debug, Clone)]
pub enum InsertSource {
    /// `VALUES (..), (..)`; no rows renders `DEFAULT VALUES`.
    Values(Arc<Vec<ExprList>>),
    /// `INSERT ... SELECT`.
    Select(Expr),
}

/// What an INSERT does when a row conflicts with an existing one.
#[derive(Debug, Clone)]
pub struct OnConflict {
    target: ExprList,
    ignore: bool,
    update: Arc<Vec<(Expr, Expr)>>,
}

/// The conflict action actually emitted.
#[derive(Debug, Clone, Copy)]
pub enum ConflictAction<'a> {
    /// Skip conflicting rows.
    Ignore,
    /// Update the existing row with these assignments.
    Update(&'a [(Expr, Expr)]),
}

impl OnConflict {
    fn empty() -> Self {
        Self {
            target: ExprList::new(),
            ignore: false,
            update: Arc::new(Vec::new()),
        }
    }

    /// Returns the conflict target columns.
    #[must_use]
    pub const fn target(&self) -> &ExprList {
        &self.target
    }

    /// Returns the emitted action. Ignoring takes priority over updating.
    #[must_use]
    pub fn action(&self) -> ConflictAction<'_> {
        if self.ignore || self.update.is_empty() {
            ConflictAction::Ignore
        } else {
            ConflictAction::Update(&self.update)
        }
    }

    /// Returns `true` when update assignments exist but ignoring wins.
    #[must_use]
    pub fn is_update_suppressed(&self) -> bool {
        self.ignore && !self.update.is_empty()
    }
}

impl Node for OnConflict {
    fn node_type(&self) -> &'static NodeType {
        &types::ON_CONFLICT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An immutable INSERT builder.
#[derive(Debug, Clone)]
pub struct Insert {
    table: Option<Expr>,
    fields: ExprList,
    source: InsertSource,
    conflict: Option<OnConflict>,
    returning: ExprList,
}

impl Insert {
    /// Creates an insert into `table`.
    pub fn new(table: impl Into<Expr>) -> Self {
        Self::with_table(Some(table.into()))
    }

    /// Creates an insert whose table, when `None`, is inferred from the
    /// prefixes of the inserted fields.
    #[must_use]
    pub fn with_table(table: Option<Expr>) -> Self {
        Self {
            table,
            fields: ExprList::new(),
            source: InsertSource::Values(Arc::new(Vec::new())),
            conflict: None,
            returning: ExprList::new(),
        }
    }

    /// Sets the target table.
    #[must_use]
    pub fn into_table(&self, table: impl Into<Expr>) -> Self {
        Self {
            table: Some(table.into()),
            ..self.clone()
        }
    }

    /// Appends to the column list.
    #[must_use]
    pub fn fields(&self, fields: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        let mut list = self.fields.clone();
        list.extend(fields);
        Self {
            fields: list,
            ..self.clone()
        }
    }

    /// Appends a row of values, replacing a SELECT source.
    #[must_use]
    pub fn values(&self, row: impl IntoIterator<Item = impl Into<Operand>>) -> Self {
        let row = ExprList::from_items(row.into_iter().map(Operand::wrap));
        let mut rows = match &self.source {
            InsertSource::Values(rows) => Arc::clone(rows),
            InsertSource::Select(_) => Arc::new(Vec::new()),
        };
        Arc::make_mut(&mut rows).push(row);
        Self {
            source: InsertSource::Values(rows),
            ..self.clone()
        }
    }

    /// Inserts the result of `query`.
    #[must_use]
    pub fn select(&self, query: impl Into<Expr>) -> Self {
        Self {
            source: InsertSource::Select(query.into()),
            ..self.clone()
        }
    }

    /// Skips rows conflicting with existing ones.
    #[must_use]
    pub fn ignore_conflicts(&self) -> Self {
        let mut conflict = self.conflict.clone().unwrap_or_else(OnConflict::empty);
        conflict.ignore = true;
        Self {
            conflict: Some(conflict),
            ..self.clone()
        }
    }

    /// Updates the conflicting row with field/value pairs.
    ///
    /// Has no effect on the emitted SQL when [`Insert::ignore_conflicts`]
    /// is also set.
    #[must_use]
    pub fn on_conflict_update<K, V>(
        &self,
        target: impl IntoIterator<Item = impl Into<Expr>>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<Expr>,
        V: Into<Operand>,
    {
        let mut conflict = self.conflict.clone().unwrap_or_else(OnConflict::empty);
        conflict.target = ExprList::from_items(target);
        conflict.update = Arc::new(
            pairs
                .into_iter()
                .map(|(field, value)| (field.into(), Operand::wrap(value)))
                .collect(),
        );
        Self {
            conflict: Some(conflict),
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

    /// Returns the target table.
    #[must_use]
    pub const fn get_table(&self) -> Option<&Expr> {
        self.table.as_ref()
    }

    /// Returns the column list.
    #[must_use]
    pub const fn get_fields(&self) -> &ExprList {
        &self.fields
    }

    /// Returns the row source.
    #[must_use]
    pub const fn get_source(&self) -> &InsertSource {
        &self.source
    }

    /// Returns the conflict clause.
    #[must_use]
    pub const fn get_conflict(&self) -> Option<&OnConflict> {
        self.conflict.as_ref()
    }

    /// Returns the RETURNING list.
    #[must_use]
    pub const fn get_returning(&self) -> &ExprList {
        &self.returning
    }
}

impl Node for Insert {
    fn node_type(&self) -> &'static NodeType {
        &types::INSERT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::ast::into_expr!(Insert, OnConflict);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Table;

    #[test]
    fn test_values_append_rows() {
        let t = Table::new("t");
        let insert = Insert::new(&t)
            .fields([t.get_field("a"), t.get_field("b")])
            .values([1, 2]);
        let more = insert.values([3, 4]);
        assert!(matches!(insert.get_source(), InsertSource::Values(rows) if rows.len() == 1));
        assert!(matches!(more.get_source(), InsertSource::Values(rows) if rows.len() == 2));
    }

    #[test]
    fn test_ignore_wins_over_update() {
        let t = Table::new("t");
        let insert = Insert::new(&t)
            .on_conflict_update([t.get_field("id")], [(t.get_field("a"), 1)])
            .ignore_conflicts();
        let conflict = insert.get_conflict().unwrap();
        assert!(matches!(conflict.action(), ConflictAction::Ignore));
        assert!(conflict.is_update_suppressed());
        assert_eq!(conflict.target().len(), 1);
    }

    #[test]
    fn test_update_action() {
        let t = Table::new("t");
        let insert = Insert::new(&t).on_conflict_update([t.get_field("id")], [(t.get_field("a"), 1)]);
        let conflict = insert.get_conflict().unwrap();
        assert!(matches!(conflict.action(), ConflictAction::Update(pairs) if pairs.len() == 1));
        assert!(!conflict.is_update_suppressed());
    }
}
