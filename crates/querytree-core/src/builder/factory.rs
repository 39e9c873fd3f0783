//! Single point of substitution for table, alias, join and select kinds.
//!
//! Tables, joins and selects remember the factory that created them and
//! use it for every node they derive (aliases, joins, count subqueries),
//! so a substituted kind propagates through all cross-references.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::select::Select;
use crate::ast::{types, Expr, NodeType, Table, TableJoin, TableNode};

/// Transformation applied to every select the factory creates.
pub type SelectHook = Arc<dyn Fn(Select) -> Select + Send + Sync>;

struct Inner {
    table: &'static NodeType,
    table_alias: &'static NodeType,
    table_join: &'static NodeType,
    select: &'static NodeType,
    select_hook: Option<SelectHook>,
}

/// Creates tables, aliases, joins and selects of configurable kinds.
#[derive(Clone)]
pub struct Factory(Arc<Inner>);

impl Factory {
    /// Returns the shared factory producing the built-in kinds.
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<Factory> = OnceLock::new();
        STANDARD.get_or_init(|| Self::builder().build())
    }

    /// Starts a factory with the built-in kinds.
    #[must_use]
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder {
            table: &types::TABLE,
            table_alias: &types::TABLE_ALIAS,
            table_join: &types::TABLE_JOIN,
            select: &types::SELECT,
            select_hook: None,
        }
    }

    /// Creates a table.
    #[must_use]
    pub fn table(&self, name: impl Into<String>) -> Table {
        Table::from_node(TableNode::new(self.0.table, name, None), self.clone())
    }

    /// Creates an alias of a table or subquery.
    #[must_use]
    pub fn table_alias(&self, source: impl Into<Expr>, alias: impl Into<String>) -> Table {
        Table::from_node(
            TableNode::new(self.0.table_alias, alias, Some(source.into())),
            self.clone(),
        )
    }

    /// Starts a join tree at `table`.
    #[must_use]
    pub fn join(&self, table: impl Into<Expr>) -> TableJoin {
        TableJoin::root(self.0.table_join, self.clone(), table.into())
    }

    /// Creates an empty select, passed through the select hook.
    #[must_use]
    pub fn select(&self) -> Select {
        let select = Select::with_factory(self.clone(), self.0.select);
        match &self.0.select_hook {
            Some(hook) => hook(select),
            None => select,
        }
    }

    /// Returns the node type given to tables.
    #[must_use]
    pub fn table_type(&self) -> &'static NodeType {
        self.0.table
    }

    /// Returns the node type given to table aliases.
    #[must_use]
    pub fn alias_type(&self) -> &'static NodeType {
        self.0.table_alias
    }

    /// Returns the node type given to joins.
    #[must_use]
    pub fn join_type(&self) -> &'static NodeType {
        self.0.table_join
    }

    /// Returns the node type given to selects.
    #[must_use]
    pub fn select_type(&self) -> &'static NodeType {
        self.0.select
    }

    /// Returns `true` when both handles share the same configuration.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("table", &self.0.table)
            .field("table_alias", &self.0.table_alias)
            .field("table_join", &self.0.table_join)
            .field("select", &self.0.select)
            .field("select_hook", &self.0.select_hook.is_some())
            .finish()
    }
}

/// Builder for a [`Factory`].
///
/// Custom kinds must descend from the corresponding built-in node type so
/// that they render through its renderer unless overridden.
#[must_use]
pub struct FactoryBuilder {
    table: &'static NodeType,
    table_alias: &'static NodeType,
    table_join: &'static NodeType,
    select: &'static NodeType,
    select_hook: Option<SelectHook>,
}

impl FactoryBuilder {
    /// Sets the table kind.
    pub fn table_type(mut self, node_type: &'static NodeType) -> Self {
        self.table = node_type;
        self
    }

    /// Sets the table alias kind.
    pub fn alias_type(mut self, node_type: &'static NodeType) -> Self {
        self.table_alias = node_type;
        self
    }

    /// Sets the join kind.
    pub fn join_type(mut self, node_type: &'static NodeType) -> Self {
        self.table_join = node_type;
        self
    }

    /// Sets the select kind.
    pub fn select_type(mut self, node_type: &'static NodeType) -> Self {
        self.select = node_type;
        self
    }

    /// Sets a hook applied to every select the factory creates.
    ///
    /// The hook must not create selects through the same factory.
    pub fn select_hook(mut self, hook: impl Fn(Select) -> Select + Send + Sync + 'static) -> Self {
        self.select_hook = Some(Arc::new(hook));
        self
    }

    /// Builds the factory.
    pub fn build(self) -> Factory {
        Factory(Arc::new(Inner {
            table: self.table,
            table_alias: self.table_alias,
            table_join: self.table_join,
            select: self.select,
            select_hook: self.select_hook,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    static AUDITED_TABLE: NodeType = NodeType::new("AuditedTable", Some(&types::TABLE));
    static AUDITED_ALIAS: NodeType = NodeType::new("AuditedAlias", Some(&types::TABLE_ALIAS));
    static AUDITED_JOIN: NodeType = NodeType::new("AuditedJoin", Some(&types::TABLE_JOIN));

    fn audited() -> Factory {
        Factory::builder()
            .table_type(&AUDITED_TABLE)
            .alias_type(&AUDITED_ALIAS)
            .join_type(&AUDITED_JOIN)
            .build()
    }

    #[test]
    fn test_standard_is_shared() {
        assert!(Factory::ptr_eq(Factory::standard(), Factory::standard()));
        assert_eq!(Factory::standard().table_type(), &types::TABLE);
    }

    #[test]
    fn test_substituted_kinds_propagate() {
        let factory = audited();
        let author = factory.table("author");
        assert_eq!(author.node().node_type(), &AUDITED_TABLE);
        assert_eq!(author.as_alias("a").node().node_type(), &AUDITED_ALIAS);
        let join = author.inner_join(factory.table("book"));
        assert_eq!(join.node_type(), &AUDITED_JOIN);
        assert!(Factory::ptr_eq(join.factory(), &factory));
        let nested = join.left_join(factory.table("publisher"));
        assert_eq!(nested.node_type(), &AUDITED_JOIN);
    }

    #[test]
    fn test_select_hook_applies() {
        let factory = Factory::builder()
            .select_hook(|select| select.for_update(true))
            .build();
        assert!(factory.select().is_for_update());
        assert!(!Factory::standard().select().is_for_update());
    }
}
