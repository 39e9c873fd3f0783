//! Tables, table aliases and join trees.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::datatype::{self, DataType};
use super::expression::{ExprList, Field};
use super::types::NodeType;
use super::{Expr, Node, Operand};
use crate::builder::Factory;
use crate::error::{Error, Result};
use crate::schema::Entity;

/// The renderable part of a table: its name and, for aliases, the aliased
/// source (a table or a subquery).
pub struct TableNode {
    kind: &'static NodeType,
    name: String,
    source: Option<Expr>,
}

impl TableNode {
    pub(crate) fn new(kind: &'static NodeType, name: impl Into<String>, source: Option<Expr>) -> Self {
        Self {
            kind,
            name: name.into(),
            source,
        }
    }

    /// Returns the table name, or the alias for an aliased source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliased source.
    #[must_use]
    pub const fn source(&self) -> Option<&Expr> {
        self.source.as_ref()
    }
}

impl fmt::Debug for TableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl Node for TableNode {
    fn node_type(&self) -> &'static NodeType {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A table handle with an interning cache of its fields.
///
/// Clones share the node and the cache. Fields point back at the node, not
/// at the cache, so there is no reference cycle.
#[derive(Clone)]
pub struct Table {
    node: Arc<TableNode>,
    fields: Arc<Mutex<HashMap<String, Expr>>>,
    factory: Factory,
}

impl Table {
    /// Creates a table through the standard factory.
    pub fn new(name: impl Into<String>) -> Self {
        Factory::standard().table(name)
    }

    pub(crate) fn from_node(node: TableNode, factory: Factory) -> Self {
        Self {
            node: Arc::new(node),
            fields: Arc::new(Mutex::new(HashMap::new())),
            factory,
        }
    }

    /// Creates the table mapped by an entity, with its columns interned in
    /// declaration order.
    #[must_use]
    pub fn for_entity<E: Entity>() -> Self {
        let table = Self::new(E::TABLE);
        let columns: Vec<&str> = E::COLUMNS.iter().map(|(_, column)| *column).collect();
        let _ = table.get_fields(&columns);
        table
    }

    /// Returns the table name, or the alias for an aliased table.
    #[must_use]
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Returns the shared table node.
    #[must_use]
    pub const fn node(&self) -> &Arc<TableNode> {
        &self.node
    }

    /// Returns the factory that created this table.
    #[must_use]
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Returns `true` if this table aliases another source.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.node.source.is_some()
    }

    /// Returns the field `name` qualified by this table.
    ///
    /// Repeated lookups return the same node.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Expr {
        self.get_field_as(name, &datatype::ANY)
    }

    /// Returns the field `name` with a declared datatype.
    ///
    /// The datatype only applies when the field is first interned.
    #[must_use]
    pub fn get_field_as(&self, name: &str, data_type: &'static DataType) -> Expr {
        let mut fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        fields
            .entry(name.to_owned())
            .or_insert_with(|| Expr::new(Field::prefixed(name, Arc::clone(&self.node), data_type)))
            .clone()
    }

    /// Returns the field mapped to an entity attribute.
    #[must_use]
    pub fn get_attribute<E: Entity>(&self, attribute: &str) -> Option<Expr> {
        E::column(attribute).map(|column| self.get_field(column))
    }

    /// Returns several fields at once.
    #[must_use]
    pub fn get_fields(&self, names: &[&str]) -> Vec<Expr> {
        names.iter().map(|name| self.get_field(name)).collect()
    }

    /// Returns `table.*`.
    #[must_use]
    pub fn all(&self) -> Expr {
        self.get_field("*")
    }

    /// Returns an alias of this table.
    #[must_use]
    pub fn as_alias(&self, alias: impl Into<String>) -> Self {
        self.factory.table_alias(self.clone(), alias)
    }

    /// Starts a join tree with this table on the left.
    #[must_use]
    pub fn join_root(&self) -> TableJoin {
        self.factory.join(self.clone())
    }

    /// `self INNER JOIN right`.
    #[must_use]
    pub fn inner_join(&self, right: impl Into<Expr>) -> TableJoin {
        self.join_root().inner_join(right)
    }

    /// `self LEFT OUTER JOIN right`.
    #[must_use]
    pub fn left_join(&self, right: impl Into<Expr>) -> TableJoin {
        self.join_root().left_join(right)
    }

    /// `self RIGHT OUTER JOIN right`.
    #[must_use]
    pub fn right_join(&self, right: impl Into<Expr>) -> TableJoin {
        self.join_root().right_join(right)
    }

    /// `self FULL OUTER JOIN right`.
    #[must_use]
    pub fn full_join(&self, right: impl Into<Expr>) -> TableJoin {
        self.join_root().full_join(right)
    }

    /// `self CROSS JOIN right`.
    #[must_use]
    pub fn cross_join(&self, right: impl Into<Expr>) -> TableJoin {
        self.join_root().cross_join(right)
    }

    /// Joins with an explicit join type.
    #[must_use]
    pub fn join_with(&self, join_type: JoinType, right: impl Into<Expr>) -> TableJoin {
        self.join_root().join_with(join_type, right)
    }

    /// Returns `true` when both handles share the same node.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Table").field(&self.node).finish()
    }
}

impl From<Table> for Expr {
    fn from(table: Table) -> Self {
        Self::from_arc(table.node)
    }
}

impl From<&Table> for Expr {
    fn from(table: &Table) -> Self {
        Self::from_arc(Arc::clone(&table.node) as Arc<dyn Node>)
    }
}

impl From<Table> for Operand {
    fn from(table: Table) -> Self {
        Self::Expr(table.into())
    }
}

/// Join operator between two join steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinType {
    /// `INNER JOIN`
    Inner,
    /// `LEFT OUTER JOIN`
    Left,
    /// `RIGHT OUTER JOIN`
    Right,
    /// `FULL OUTER JOIN`
    Full,
    /// `CROSS JOIN`
    Cross,
    /// A dialect-specific join keyword, emitted verbatim.
    Raw(String),
}

impl JoinType {
    /// Returns the SQL keyword.
    #[must_use]
    pub fn as_sql(&self) -> &str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT OUTER JOIN",
            Self::Right => "RIGHT OUTER JOIN",
            Self::Full => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Raw(sql) => sql,
        }
    }
}

/// A step of a left-folding join tree.
///
/// The root step holds a single table and no join type. Each join call
/// wraps the current tree as the left side of a new step.
#[derive(Debug, Clone)]
pub struct TableJoin {
    kind: &'static NodeType,
    factory: Factory,
    left: Option<Expr>,
    join_type: Option<JoinType>,
    right: Expr,
    on: Option<Expr>,
    using: Option<ExprList>,
    hints: Option<Expr>,
    nested: bool,
}

impl TableJoin {
    /// Starts a join tree through the standard factory.
    pub fn new(table: impl Into<Expr>) -> Self {
        Factory::standard().join(table)
    }

    pub(crate) fn root(kind: &'static NodeType, factory: Factory, table: Expr) -> Self {
        Self {
            kind,
            factory,
            left: None,
            join_type: None,
            right: table,
            on: None,
            using: None,
            hints: None,
            nested: false,
        }
    }

    /// Appends a join with an explicit join type.
    #[must_use]
    pub fn join_with(&self, join_type: JoinType, right: impl Into<Expr>) -> Self {
        Self {
            left: Some(Expr::new(self.clone())),
            join_type: Some(join_type),
            ..Self::root(self.kind, self.factory.clone(), right.into())
        }
    }

    /// Appends an `INNER JOIN`.
    #[must_use]
    pub fn inner_join(&self, right: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Inner, right)
    }

    /// Appends a `LEFT OUTER JOIN`.
    #[must_use]
    pub fn left_join(&self, right: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Left, right)
    }

    /// Appends a `RIGHT OUTER JOIN`.
    #[must_use]
    pub fn right_join(&self, right: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Right, right)
    }

    /// Appends a `FULL OUTER JOIN`.
    #[must_use]
    pub fn full_join(&self, right: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Full, right)
    }

    /// Appends a `CROSS JOIN`.
    #[must_use]
    pub fn cross_join(&self, right: impl Into<Expr>) -> Self {
        self.join_with(JoinType::Cross, right)
    }

    /// Sets the ON condition of this step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingJoinTarget`] on a root step and
    /// [`Error::MultipleOnClause`] if the step already has a condition.
    pub fn on(&self, condition: impl Into<Expr>) -> Result<Self> {
        if self.join_type.is_none() {
            return Err(Error::MissingJoinTarget("ON"));
        }
        if self.on.is_some() {
            return Err(Error::MultipleOnClause);
        }
        Ok(Self {
            on: Some(condition.into()),
            ..self.clone()
        })
    }

    /// Sets the USING column list of this step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingJoinTarget`] on a root step.
    pub fn using(&self, fields: impl IntoIterator<Item = impl Into<Expr>>) -> Result<Self> {
        if self.join_type.is_none() {
            return Err(Error::MissingJoinTarget("USING"));
        }
        Ok(Self {
            using: Some(ExprList::from_items(fields)),
            ..self.clone()
        })
    }

    /// Adds index hints after the right-hand table.
    #[must_use]
    pub fn hint(&self, hints: impl Into<Expr>) -> Self {
        Self {
            hints: Some(hints.into()),
            ..self.clone()
        }
    }

    /// Marks the tree as a group, parenthesized when used as the right side
    /// of another join.
    #[must_use]
    pub fn group(&self) -> Self {
        Self {
            nested: true,
            ..self.clone()
        }
    }

    /// Returns the factory that created this tree.
    #[must_use]
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Returns the left side, `None` for a root step.
    #[must_use]
    pub const fn left(&self) -> Option<&Expr> {
        self.left.as_ref()
    }

    /// Returns the joined table.
    #[must_use]
    pub const fn right(&self) -> &Expr {
        &self.right
    }

    /// Returns the join type, `None` for a root step.
    #[must_use]
    pub const fn join_type(&self) -> Option<&JoinType> {
        self.join_type.as_ref()
    }

    /// Returns the ON condition.
    #[must_use]
    pub const fn on_condition(&self) -> Option<&Expr> {
        self.on.as_ref()
    }

    /// Returns the USING list.
    #[must_use]
    pub const fn using_fields(&self) -> Option<&ExprList> {
        self.using.as_ref()
    }

    /// Returns the index hints.
    #[must_use]
    pub const fn hints(&self) -> Option<&Expr> {
        self.hints.as_ref()
    }

    /// Returns `true` if the tree is grouped.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.nested
    }
}

impl Node for TableJoin {
    fn node_type(&self) -> &'static NodeType {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<TableJoin> for Expr {
    fn from(join: TableJoin) -> Self {
        Self::new(join)
    }
}

impl From<TableJoin> for Operand {
    fn from(join: TableJoin) -> Self {
        Self::Expr(Expr::new(join))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types;

    #[test]
    fn test_get_field_interns() {
        let author = Table::new("author");
        let a = author.get_field("id");
        let b = author.get_field("id");
        assert!(Expr::ptr_eq(&a, &b));
        assert!(!Expr::ptr_eq(&a, &author.get_field("name")));
    }

    #[test]
    fn test_clone_shares_field_cache() {
        let author = Table::new("author");
        let copy = author.clone();
        assert!(Expr::ptr_eq(&author.get_field("id"), &copy.get_field("id")));
        assert!(Table::ptr_eq(&author, &copy));
    }

    #[test]
    fn test_alias_fields_are_distinct() {
        let author = Table::new("author");
        let a = author.as_alias("a");
        assert!(a.is_alias());
        assert_eq!(a.name(), "a");
        assert_eq!(a.node().node_type(), &types::TABLE_ALIAS);
        assert!(!Expr::ptr_eq(&author.get_field("id"), &a.get_field("id")));
    }

    #[test]
    fn test_on_requires_join_target() {
        let root = TableJoin::new(Table::new("a"));
        assert_eq!(
            root.on(Table::new("a").get_field("id")).unwrap_err(),
            Error::MissingJoinTarget("ON")
        );
        assert_eq!(
            root.using([Table::new("a").get_field("id")]).unwrap_err(),
            Error::MissingJoinTarget("USING")
        );
    }

    #[test]
    fn test_second_on_is_rejected() {
        let a = Table::new("a");
        let b = Table::new("b");
        let cond = a.get_field("id").eq(b.get_field("a_id"));
        let join = a.inner_join(&b).on(cond.clone()).unwrap();
        assert_eq!(join.on(cond).unwrap_err(), Error::MultipleOnClause);
    }

    #[test]
    fn test_joins_fold_left() {
        let a = Table::new("a");
        let join = a.inner_join(Table::new("b")).left_join(Table::new("c"));
        assert_eq!(join.join_type(), Some(&JoinType::Left));
        let left = join.left().and_then(|l| l.downcast_ref::<TableJoin>()).unwrap();
        assert_eq!(left.join_type(), Some(&JoinType::Inner));
    }
}
