//! SELECT builder.

use std::any::Any;
use std::ops::{Bound, RangeBounds};

use super::delete::Delete;
use super::factory::Factory;
use super::insert::Insert;
use super::options::{ListOptions, Logical};
use super::set::{SetKind, SetOperation};
use super::update::Update;
use crate::ast::{functions, raw, Expr, ExprList, Func, LimitOffset, Node, NodeType, Operand, Ordering, Table};
use crate::compiler::precedence;

/// DISTINCT mode of a select.
#[derive(Debug, Clone, Default)]
pub enum Distinct {
    /// No DISTINCT.
    #[default]
    Off,
    /// `SELECT DISTINCT`.
    All,
    /// `SELECT DISTINCT ON (...)`.
    On(ExprList),
}

/// An immutable SELECT builder.
///
/// Every method returns a new select; the receiver is left unchanged and
/// shares its unchanged parts with the result.
#[derive(Debug, Clone)]
pub struct Select {
    kind: &'static NodeType,
    factory: Factory,
    distinct: Distinct,
    fields: ExprList,
    tables: Option<Expr>,
    where_clause: Option<Expr>,
    group_by: ExprList,
    having: Option<Expr>,
    order_by: ExprList,
    bounds: LimitOffset,
    for_update: bool,
}

impl Select {
    /// Creates a select through the standard factory.
    #[must_use]
    pub fn new() -> Self {
        Factory::standard().select()
    }

    pub(crate) fn with_factory(factory: Factory, kind: &'static NodeType) -> Self {
        Self {
            kind,
            factory,
            distinct: Distinct::Off,
            fields: ExprList::field_list(),
            tables: None,
            where_clause: None,
            group_by: ExprList::new(),
            having: None,
            order_by: ExprList::new(),
            bounds: LimitOffset::default(),
            for_update: false,
        }
    }

    /// Sets the FROM source: a table, an alias or a join tree.
    #[must_use]
    pub fn from(&self, tables: impl Into<Expr>) -> Self {
        Self {
            tables: Some(tables.into()),
            ..self.clone()
        }
    }

    /// Returns the FROM source.
    #[must_use]
    pub const fn get_tables(&self) -> Option<&Expr> {
        self.tables.as_ref()
    }

    /// Returns the factory that created this select.
    #[must_use]
    pub const fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Appends to the select list.
    #[must_use]
    pub fn fields(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.fields_with(items, ListOptions::default())
    }

    /// Appends to, or with `reset` replaces, the select list.
    #[must_use]
    pub fn fields_with(
        &self,
        items: impl IntoIterator<Item = impl Into<Expr>>,
        options: ListOptions,
    ) -> Self {
        Self {
            fields: extend_list(&self.fields, items, options),
            ..self.clone()
        }
    }

    /// Returns the select list; empty renders as `*`.
    #[must_use]
    pub const fn get_fields(&self) -> &ExprList {
        &self.fields
    }

    /// Appends to the GROUP BY list.
    #[must_use]
    pub fn group_by(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.group_by_with(items, ListOptions::default())
    }

    /// Appends to, or with `reset` replaces, the GROUP BY list.
    #[must_use]
    pub fn group_by_with(
        &self,
        items: impl IntoIterator<Item = impl Into<Expr>>,
        options: ListOptions,
    ) -> Self {
        Self {
            group_by: extend_list(&self.group_by, items, options),
            ..self.clone()
        }
    }

    /// Returns the GROUP BY list.
    #[must_use]
    pub const fn get_group_by(&self) -> &ExprList {
        &self.group_by
    }

    /// Appends ascending items to the ORDER BY list.
    ///
    /// Items already wrapped with [`Expr::asc`] or [`Expr::desc`] keep their
    /// direction.
    #[must_use]
    pub fn order_by(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.order_by_with(items, ListOptions::default())
    }

    /// Appends to, or with `reset` replaces, the ORDER BY list; `desc`
    /// makes the new bare items descending.
    #[must_use]
    pub fn order_by_with(
        &self,
        items: impl IntoIterator<Item = impl Into<Expr>>,
        options: ListOptions,
    ) -> Self {
        let items = items.into_iter().map(|item| {
            let item: Expr = item.into();
            if item.downcast_ref::<Ordering>().is_some() {
                item
            } else if options.desc {
                Expr::new(Ordering::desc(item))
            } else {
                Expr::new(Ordering::asc(item))
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

    /// Turns plain DISTINCT on or off.
    #[must_use]
    pub fn distinct(&self, on: bool) -> Self {
        Self {
            distinct: if on { Distinct::All } else { Distinct::Off },
            ..self.clone()
        }
    }

    /// Appends to the DISTINCT ON list.
    #[must_use]
    pub fn distinct_on(&self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.distinct_on_with(items, ListOptions::default())
    }

    /// Appends to, or with `reset` replaces, the DISTINCT ON list.
    ///
    /// An empty list turns DISTINCT off.
    #[must_use]
    pub fn distinct_on_with(
        &self,
        items: impl IntoIterator<Item = impl Into<Expr>>,
        options: ListOptions,
    ) -> Self {
        let current = match &self.distinct {
            Distinct::On(list) => list.clone(),
            Distinct::Off | Distinct::All => ExprList::new(),
        };
        let list = extend_list(&current, items, options);
        Self {
            distinct: if list.is_empty() {
                Distinct::Off
            } else {
                Distinct::On(list)
            },
            ..self.clone()
        }
    }

    /// Returns the DISTINCT mode.
    #[must_use]
    pub const fn get_distinct(&self) -> &Distinct {
        &self.distinct
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

    /// Returns the WHERE condition.
    #[must_use]
    pub const fn get_where(&self) -> Option<&Expr> {
        self.where_clause.as_ref()
    }

    /// ANDs a condition into HAVING.
    #[must_use]
    pub fn having(&self, condition: impl Into<Expr>) -> Self {
        self.having_with(condition, Some(Logical::And))
    }

    /// Combines a condition into HAVING, or replaces it when `logical` is
    /// `None`.
    #[must_use]
    pub fn having_with(&self, condition: impl Into<Expr>, logical: Option<Logical>) -> Self {
        Self {
            having: Some(combine(self.having.as_ref(), condition.into(), logical)),
            ..self.clone()
        }
    }

    /// Returns the HAVING condition.
    #[must_use]
    pub const fn get_having(&self) -> Option<&Expr> {
        self.having.as_ref()
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

    /// Sets OFFSET to the start of `range` and LIMIT to its length.
    ///
    /// An unbounded end leaves LIMIT unset.
    #[must_use]
    pub fn slice(&self, range: impl RangeBounds<u64>) -> Self {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let stop = match range.end_bound() {
            Bound::Included(&e) => Some(e.saturating_add(1)),
            Bound::Excluded(&e) => Some(e),
            Bound::Unbounded => None,
        };
        Self {
            bounds: LimitOffset::new(
                stop.map(|stop| stop.saturating_sub(start)),
                (start > 0).then_some(start),
            ),
            ..self.clone()
        }
    }

    /// Selects the single row at `index`.
    #[must_use]
    pub fn at(&self, index: u64) -> Self {
        Self {
            bounds: LimitOffset::new(Some(1), Some(index)),
            ..self.clone()
        }
    }

    /// Returns LIMIT.
    #[must_use]
    pub const fn get_limit(&self) -> Option<u64> {
        self.bounds.limit()
    }

    /// Returns OFFSET.
    #[must_use]
    pub const fn get_offset(&self) -> Option<u64> {
        self.bounds.offset()
    }

    /// Returns LIMIT and OFFSET as a node.
    #[must_use]
    pub const fn bounds(&self) -> LimitOffset {
        self.bounds
    }

    /// Turns `FOR UPDATE` on or off.
    #[must_use]
    pub fn for_update(&self, on: bool) -> Self {
        Self {
            for_update: on,
            ..self.clone()
        }
    }

    /// Returns `true` if `FOR UPDATE` is emitted.
    #[must_use]
    pub const fn is_for_update(&self) -> bool {
        self.for_update
    }

    /// Returns `true` if the select carries ORDER BY, LIMIT or OFFSET.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        !self.order_by.is_empty() || !self.bounds.is_empty()
    }

    /// Returns a query counting the rows of this one.
    ///
    /// Grouped, distinct or bounded selects are counted through a
    /// subquery; see [`Select::count_wrapped`].
    #[must_use]
    pub fn count(&self) -> Self {
        if !self.group_by.is_empty()
            || !matches!(self.distinct, Distinct::Off)
            || !self.bounds.is_empty()
        {
            return self.count_wrapped();
        }
        Self {
            fields: extend_list(
                &self.fields,
                [Expr::new(functions::count_all()).as_alias("count_value")],
                ListOptions::replace(),
            ),
            order_by: self.order_by.cleared(),
            ..self.clone()
        }
    }

    /// Returns `SELECT COUNT(1) AS count_value FROM (<self>) AS count_list`,
    /// with the inner ORDER BY dropped.
    #[must_use]
    pub fn count_wrapped(&self) -> Self {
        let inner = Self {
            order_by: self.order_by.cleared(),
            ..self.clone()
        };
        self.factory
            .select()
            .from(inner.as_table("count_list"))
            .fields([Expr::new(Func::new("COUNT", [raw("1")])).as_alias("count_value")])
    }

    /// Wraps this select as a named subquery usable as a table.
    #[must_use]
    pub fn as_table(&self, alias: impl Into<String>) -> Table {
        self.factory.table_alias(self.clone(), alias)
    }

    /// `self UNION other`.
    #[must_use]
    pub fn union(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Union, false, self.clone(), other)
    }

    /// `self UNION ALL other`.
    #[must_use]
    pub fn union_all(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Union, true, self.clone(), other)
    }

    /// `self INTERSECT other`.
    #[must_use]
    pub fn intersect(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Intersect, false, self.clone(), other)
    }

    /// `self INTERSECT ALL other`.
    #[must_use]
    pub fn intersect_all(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Intersect, true, self.clone(), other)
    }

    /// `self EXCEPT other`.
    #[must_use]
    pub fn except(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Except, false, self.clone(), other)
    }

    /// `self EXCEPT ALL other`.
    #[must_use]
    pub fn except_all(&self, other: impl Into<Expr>) -> SetOperation {
        SetOperation::new(SetKind::Except, true, self.clone(), other)
    }

    /// Inserts one row given as field/value pairs into the FROM table.
    #[must_use]
    pub fn insert<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Insert
    where
        K: Into<Expr>,
        V: Into<Operand>,
    {
        let (fields, values): (Vec<Expr>, Vec<Expr>) = pairs
            .into_iter()
            .map(|(field, value)| (field.into(), Operand::wrap(value)))
            .unzip();
        Insert::with_table(self.tables.clone())
            .fields(fields)
            .values(values)
    }

    /// Inserts several rows for explicit fields into the FROM table.
    #[must_use]
    pub fn insert_rows<R, V>(
        &self,
        fields: impl IntoIterator<Item = impl Into<Expr>>,
        rows: impl IntoIterator<Item = R>,
    ) -> Insert
    where
        R: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        rows.into_iter()
            .fold(Insert::with_table(self.tables.clone()).fields(fields), |insert, row| {
                insert.values(row)
            })
    }

    /// Inserts the result of `query` into the FROM table.
    #[must_use]
    pub fn insert_select(
        &self,
        fields: impl IntoIterator<Item = impl Into<Expr>>,
        query: impl Into<Expr>,
    ) -> Insert {
        Insert::with_table(self.tables.clone())
            .fields(fields)
            .select(query)
    }

    /// Updates the rows matched by this select with field/value pairs.
    #[must_use]
    pub fn update<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> Update
    where
        K: Into<Expr>,
        V: Into<Operand>,
    {
        pairs.into_iter().fold(self.update_base(), |update, (field, value)| {
            update.set(field, value)
        })
    }

    /// Updates the rows matched by this select, zipping fields with values.
    #[must_use]
    pub fn update_fields<V: Into<Operand>>(
        &self,
        fields: impl IntoIterator<Item = impl Into<Expr>>,
        values: impl IntoIterator<Item = V>,
    ) -> Update {
        fields
            .into_iter()
            .zip(values)
            .fold(self.update_base(), |update, (field, value)| update.set(field, value))
    }

    fn update_base(&self) -> Update {
        Update::from_parts(
            self.tables.clone(),
            self.where_clause.clone(),
            self.order_by.clone(),
            self.bounds,
        )
    }

    /// Deletes the rows matched by this select.
    #[must_use]
    pub fn delete(&self) -> Delete {
        Delete::from_parts(
            self.tables.clone(),
            self.where_clause.clone(),
            self.order_by.clone(),
            self.bounds,
        )
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Select {
    fn node_type(&self) -> &'static NodeType {
        self.kind
    }

    fn operator(&self) -> Option<&str> {
        self.is_limited().then_some(precedence::LIMITED)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::ast::into_expr!(Select);

pub(crate) fn extend_list(
    list: &ExprList,
    items: impl IntoIterator<Item = impl Into<Expr>>,
    options: ListOptions,
) -> ExprList {
    let mut list = if options.reset {
        list.cleared()
    } else {
        list.clone()
    };
    list.extend(items);
    list
}

pub(crate) fn combine(current: Option<&Expr>, condition: Expr, logical: Option<Logical>) -> Expr {
    match (current, logical) {
        (Some(current), Some(Logical::And)) => current.and(condition),
        (Some(current), Some(Logical::Or)) => current.or(condition),
        (None, _) | (_, None) => condition,
    }
}
