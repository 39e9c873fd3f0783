//! Expression node kinds.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::datatype::{self, DataType};
use super::table::TableNode;
use super::types::{self, NodeType};
use super::{into_expr, Expr, Node, Operand};
use crate::builder::value::{SqlValue, ToSqlValue};
use crate::compiler::Context;

/// A value bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Value(SqlValue);

impl Value {
    /// Creates a value node.
    pub fn new(v: impl ToSqlValue) -> Self {
        Self(v.to_sql_value())
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn get(&self) -> &SqlValue {
        &self.0
    }
}

impl Node for Value {
    fn node_type(&self) -> &'static NodeType {
        &types::VALUE
    }

    fn data_type(&self) -> &'static DataType {
        self.0.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates a bound value expression.
pub fn value(v: impl ToSqlValue) -> Expr {
    Expr::new(Value::new(v))
}

/// Trusted SQL text emitted verbatim.
///
/// Never build a `Raw` from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(String);

impl Raw {
    /// Creates a raw fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Node for Raw {
    fn node_type(&self) -> &'static NodeType {
        &types::RAW
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates a raw SQL expression.
pub fn raw(sql: impl Into<String>) -> Expr {
    Expr::new(Raw::new(sql))
}

/// An identifier, quoted by the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the unquoted identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Node for Name {
    fn node_type(&self) -> &'static NodeType {
        &types::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type RenderCache = HashMap<(u64, Context), String>;

/// A column reference, optionally qualified by a table or alias.
///
/// Rendered SQL is memoized per compiler and context.
pub struct Field {
    name: String,
    prefix: Option<Arc<TableNode>>,
    data_type: &'static DataType,
    cache: Mutex<RenderCache>,
}

impl Field {
    /// Creates an unqualified field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            data_type: &datatype::ANY,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn prefixed(
        name: impl Into<String>,
        prefix: Arc<TableNode>,
        data_type: &'static DataType,
    ) -> Self {
        Self {
            prefix: Some(prefix),
            data_type,
            ..Self::new(name)
        }
    }

    /// Sets the declared datatype.
    #[must_use]
    pub fn with_type(mut self, data_type: &'static DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the qualifying table node.
    #[must_use]
    pub const fn prefix(&self) -> Option<&Arc<TableNode>> {
        self.prefix.as_ref()
    }

    /// Returns the memoized rendering for a compiler and context.
    #[must_use]
    pub fn cached(&self, compiler_id: u64, context: Context) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(compiler_id, context))
            .cloned()
    }

    /// Memoizes a rendering.
    pub fn remember(&self, compiler_id: u64, context: Context, sql: String) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((compiler_id, context), sql);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("prefix", &self.prefix.as_ref().map(|t| t.name()))
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

impl Node for Field {
    fn node_type(&self) -> &'static NodeType {
        &types::FIELD
    }

    fn data_type(&self) -> &'static DataType {
        self.data_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates an unqualified field expression.
pub fn field(name: impl Into<String>) -> Expr {
    Expr::new(Field::new(name))
}

/// An aliased expression.
///
/// Renders as `expr AS name` inside a select list and as `name` elsewhere.
#[derive(Debug, Clone)]
pub struct Alias {
    expr: Expr,
    name: String,
}

impl Alias {
    /// Creates an alias.
    pub fn new(expr: impl Into<Expr>, name: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            name: name.into(),
        }
    }

    /// Returns the aliased expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the alias.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Node for Alias {
    fn node_type(&self) -> &'static NodeType {
        &types::ALIAS
    }

    fn data_type(&self) -> &'static DataType {
        self.expr.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A copy-on-write list of expressions joined by a separator.
#[derive(Debug, Clone)]
pub struct ExprList {
    kind: &'static NodeType,
    items: Arc<Vec<Expr>>,
    separator: &'static str,
}

impl ExprList {
    /// Creates an empty comma-separated list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: &types::EXPR_LIST,
            items: Arc::new(Vec::new()),
            separator: ", ",
        }
    }

    /// Creates an empty select-list.
    #[must_use]
    pub fn field_list() -> Self {
        Self::new().with_kind(&types::FIELD_LIST)
    }

    /// Creates a `||` concatenation of the given items.
    pub fn concat(items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        let mut list = Self::new()
            .with_kind(&types::CONCAT)
            .with_separator(" || ");
        list.extend(items);
        list
    }

    /// Creates a comma-separated list of the given items.
    pub fn from_items(items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        let mut list = Self::new();
        list.extend(items);
        list
    }

    pub(crate) fn from_operands(items: Vec<Operand>) -> Self {
        Self::from_items(items.into_iter().map(Operand::into_expr))
    }

    /// Sets the node type tag.
    #[must_use]
    pub fn with_kind(mut self, kind: &'static NodeType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the separator.
    #[must_use]
    pub fn with_separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }

    /// Appends an item, copying the list only if it is shared.
    pub fn push(&mut self, item: impl Into<Expr>) {
        Arc::make_mut(&mut self.items).push(item.into());
    }

    /// Appends several items.
    pub fn extend(&mut self, items: impl IntoIterator<Item = impl Into<Expr>>) {
        let mut items = items.into_iter().map(Into::into).peekable();
        if items.peek().is_some() {
            Arc::make_mut(&mut self.items).extend(items);
        }
    }

    /// Returns an empty list of the same kind and separator.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            ..self.clone()
        }
    }

    /// Returns the items.
    #[must_use]
    pub fn items(&self) -> &[Expr] {
        &self.items
    }

    /// Iterates over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.items.iter()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the separator.
    #[must_use]
    pub const fn separator(&self) -> &'static str {
        self.separator
    }
}

impl Default for ExprList {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Into<Expr>> FromIterator<E> for ExprList {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl Node for ExprList {
    fn node_type(&self) -> &'static NodeType {
        self.kind
    }

    fn data_type(&self) -> &'static DataType {
        if self.kind.is_a(&types::CONCAT) {
            &datatype::TEXT
        } else {
            &datatype::ANY
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Explicit parentheses. The inner expression renders at top-level
/// precedence.
#[derive(Debug, Clone)]
pub struct Parentheses(Expr);

impl Parentheses {
    /// Wraps an expression.
    pub fn new(inner: impl Into<Expr>) -> Self {
        Self(inner.into())
    }

    /// Returns the inner expression.
    #[must_use]
    pub const fn inner(&self) -> &Expr {
        &self.0
    }
}

impl Node for Parentheses {
    fn node_type(&self) -> &'static NodeType {
        &types::PARENTHESES
    }

    fn data_type(&self) -> &'static DataType {
        self.0.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A binary operation `left op right`.
#[derive(Debug, Clone)]
pub struct Binary {
    op: String,
    left: Expr,
    right: Expr,
    data_type: &'static DataType,
}

impl Binary {
    /// Creates a binary operation. Keyword operators are upper-cased.
    pub fn new(
        op: &str,
        left: impl Into<Expr>,
        right: impl Into<Expr>,
        data_type: &'static DataType,
    ) -> Self {
        Self {
            op: op.to_uppercase(),
            left: left.into(),
            right: right.into(),
            data_type,
        }
    }

    /// Returns the operator symbol.
    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    /// Returns the left operand.
    #[must_use]
    pub const fn left(&self) -> &Expr {
        &self.left
    }

    /// Returns the right operand.
    #[must_use]
    pub const fn right(&self) -> &Expr {
        &self.right
    }
}

impl Node for Binary {
    fn node_type(&self) -> &'static NodeType {
        &types::BINARY
    }

    fn operator(&self) -> Option<&str> {
        Some(&self.op)
    }

    fn data_type(&self) -> &'static DataType {
        self.data_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Pattern-matching operator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeKind {
    /// `LIKE`
    Like,
    /// `ILIKE`
    ILike,
    /// `NOT LIKE`
    NotLike,
    /// `NOT ILIKE`
    NotILike,
}

impl LikeKind {
    /// Returns the generic spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::NotLike => "NOT LIKE",
            Self::NotILike => "NOT ILIKE",
        }
    }
}

/// A `LIKE` family comparison, optionally followed by an `ESCAPE` clause.
#[derive(Debug, Clone)]
pub struct Like {
    kind: LikeKind,
    left: Expr,
    right: Expr,
    escape: bool,
}

impl Like {
    /// Creates a comparison without an `ESCAPE` clause.
    pub fn new(kind: LikeKind, left: impl Into<Expr>, pattern: impl Into<Expr>) -> Self {
        Self {
            kind,
            left: left.into(),
            right: pattern.into(),
            escape: false,
        }
    }

    /// Emits `ESCAPE` with the dialect's escape character.
    #[must_use]
    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }

    /// Returns the operator flavour.
    #[must_use]
    pub const fn kind(&self) -> LikeKind {
        self.kind
    }

    /// Returns the left operand.
    #[must_use]
    pub const fn left(&self) -> &Expr {
        &self.left
    }

    /// Returns the pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Expr {
        &self.right
    }

    /// Returns `true` if an `ESCAPE` clause is emitted.
    #[must_use]
    pub const fn has_escape(&self) -> bool {
        self.escape
    }
}

impl Node for Like {
    fn node_type(&self) -> &'static NodeType {
        &types::LIKE
    }

    fn operator(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }

    fn data_type(&self) -> &'static DataType {
        &datatype::BOOLEAN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Escapes LIKE wildcards in its operand.
///
/// Text values are escaped before binding. Other expressions are wrapped
/// in nested `REPLACE` calls.
#[derive(Debug, Clone)]
pub struct EscapeForLike(Expr);

impl EscapeForLike {
    /// Wraps a pattern operand.
    pub fn new(inner: impl Into<Expr>) -> Self {
        Self(inner.into())
    }

    /// Returns the operand.
    #[must_use]
    pub const fn inner(&self) -> &Expr {
        &self.0
    }
}

impl Node for EscapeForLike {
    fn node_type(&self) -> &'static NodeType {
        &types::ESCAPE_FOR_LIKE
    }

    fn data_type(&self) -> &'static DataType {
        &datatype::TEXT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A three-operand operation such as `a BETWEEN b AND c`.
#[derive(Debug, Clone)]
pub struct Ternary {
    op: String,
    separator: String,
    first: Expr,
    second: Expr,
    third: Expr,
}

impl Ternary {
    /// Creates `first op second separator third`.
    pub fn new(
        op: &str,
        separator: &str,
        first: impl Into<Expr>,
        second: impl Into<Expr>,
        third: impl Into<Expr>,
    ) -> Self {
        Self {
            op: op.to_uppercase(),
            separator: separator.to_uppercase(),
            first: first.into(),
            second: second.into(),
            third: third.into(),
        }
    }

    /// Returns the first operator symbol.
    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    /// Returns the second operator symbol.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Returns the three operands.
    #[must_use]
    pub const fn operands(&self) -> (&Expr, &Expr, &Expr) {
        (&self.first, &self.second, &self.third)
    }
}

impl Node for Ternary {
    fn node_type(&self) -> &'static NodeType {
        &types::TERNARY
    }

    fn operator(&self) -> Option<&str> {
        Some(&self.op)
    }

    fn data_type(&self) -> &'static DataType {
        &datatype::BOOLEAN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A prefix operation such as `NOT x`, `-x` or `EXISTS (...)`.
#[derive(Debug, Clone)]
pub struct Prefix {
    op: String,
    expr: Expr,
}

impl Prefix {
    /// Creates a prefix operation.
    pub fn new(op: &str, expr: impl Into<Expr>) -> Self {
        Self {
            op: op.to_uppercase(),
            expr: expr.into(),
        }
    }

    /// Returns the operator symbol.
    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    /// Returns the operand.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Node for Prefix {
    fn node_type(&self) -> &'static NodeType {
        &types::PREFIX
    }

    fn operator(&self) -> Option<&str> {
        Some(&self.op)
    }

    fn data_type(&self) -> &'static DataType {
        if self.op == "-" || self.op == "+" {
            self.expr.data_type()
        } else {
            &datatype::BOOLEAN
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates `EXISTS (subquery)`.
pub fn exists(query: impl Into<Expr>) -> Expr {
    Expr::new(Prefix::new("EXISTS", query))
}

/// Creates `NOT EXISTS (subquery)`.
pub fn not_exists(query: impl Into<Expr>) -> Expr {
    Expr::new(Prefix::new("NOT EXISTS", query))
}

/// A postfix operation `x op`.
#[derive(Debug, Clone)]
pub struct Postfix {
    op: String,
    expr: Expr,
}

impl Postfix {
    /// Creates a postfix operation.
    pub fn new(op: &str, expr: impl Into<Expr>) -> Self {
        Self {
            op: op.to_uppercase(),
            expr: expr.into(),
        }
    }

    /// Returns the operator symbol.
    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    /// Returns the operand.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Node for Postfix {
    fn node_type(&self) -> &'static NodeType {
        &types::POSTFIX
    }

    fn operator(&self) -> Option<&str> {
        Some(&self.op)
    }

    fn data_type(&self) -> &'static DataType {
        self.expr.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Placement of NULLs in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    /// `NULLS FIRST`
    First,
    /// `NULLS LAST`
    Last,
}

/// Sort direction decorator for ORDER BY items.
#[derive(Debug, Clone)]
pub struct Ordering {
    expr: Expr,
    desc: bool,
    nulls: Option<Nulls>,
}

impl Ordering {
    /// Creates an ascending ordering.
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            desc: false,
            nulls: None,
        }
    }

    /// Creates a descending ordering.
    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            desc: true,
            ..Self::asc(expr)
        }
    }

    /// Sets NULL placement.
    #[must_use]
    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Returns the ordered expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns `true` for a descending ordering.
    #[must_use]
    pub const fn is_desc(&self) -> bool {
        self.desc
    }

    /// Returns the NULL placement.
    #[must_use]
    pub const fn nulls_placement(&self) -> Option<Nulls> {
        self.nulls
    }
}

impl Node for Ordering {
    fn node_type(&self) -> &'static NodeType {
        if self.desc {
            &types::DESC
        } else {
            &types::ASC
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A function call.
#[derive(Debug, Clone)]
pub struct Func {
    name: String,
    args: ExprList,
    distinct: bool,
    data_type: &'static DataType,
}

impl Func {
    /// Creates a call to `name` with the given arguments.
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<Operand>>) -> Self {
        Self {
            name: name.into(),
            args: ExprList::from_items(args.into_iter().map(Operand::wrap)),
            distinct: false,
            data_type: &datatype::ANY,
        }
    }

    /// Adds `DISTINCT` before the arguments.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the declared result type.
    #[must_use]
    pub fn returning(mut self, data_type: &'static DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments.
    #[must_use]
    pub const fn args(&self) -> &ExprList {
        &self.args
    }

    /// Returns `true` if `DISTINCT` is emitted.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }
}

impl Node for Func {
    fn node_type(&self) -> &'static NodeType {
        &types::FUNC
    }

    fn data_type(&self) -> &'static DataType {
        self.data_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A window specification `expr OVER (PARTITION BY ... ORDER BY ...)`.
#[derive(Debug, Clone)]
pub struct Over {
    expr: Expr,
    partition_by: ExprList,
    order_by: ExprList,
}

impl Over {
    /// Creates an empty window over `expr`.
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            partition_by: ExprList::new(),
            order_by: ExprList::new(),
        }
    }

    /// Appends PARTITION BY items.
    #[must_use]
    pub fn partition_by(mut self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.partition_by.extend(items);
        self
    }

    /// Appends ORDER BY items.
    #[must_use]
    pub fn order_by(mut self, items: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.order_by.extend(items);
        self
    }

    /// Returns the windowed expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the PARTITION BY items.
    #[must_use]
    pub const fn partitions(&self) -> &ExprList {
        &self.partition_by
    }

    /// Returns the ORDER BY items.
    #[must_use]
    pub const fn orderings(&self) -> &ExprList {
        &self.order_by
    }
}

impl Node for Over {
    fn node_type(&self) -> &'static NodeType {
        &types::OVER
    }

    fn data_type(&self) -> &'static DataType {
        self.expr.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A searched `CASE WHEN ... THEN ... ELSE ... END` expression.
#[derive(Debug, Clone, Default)]
pub struct Case {
    branches: Vec<(Expr, Expr)>,
    default: Option<Expr>,
}

impl Case {
    /// Creates a CASE without branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `WHEN condition THEN result` branch.
    #[must_use]
    pub fn when(mut self, condition: impl Into<Expr>, result: impl Into<Operand>) -> Self {
        self.branches
            .push((condition.into(), Operand::wrap(result)));
        self
    }

    /// Sets the `ELSE` result.
    #[must_use]
    pub fn otherwise(mut self, result: impl Into<Operand>) -> Self {
        self.default = Some(Operand::wrap(result));
        self
    }

    /// Returns the branches.
    #[must_use]
    pub fn branches(&self) -> &[(Expr, Expr)] {
        &self.branches
    }

    /// Returns the `ELSE` result.
    #[must_use]
    pub const fn default_result(&self) -> Option<&Expr> {
        self.default.as_ref()
    }
}

impl Node for Case {
    fn node_type(&self) -> &'static NodeType {
        &types::CASE
    }

    fn data_type(&self) -> &'static DataType {
        self.branches
            .first()
            .map_or(&datatype::ANY, |(_, result)| result.data_type())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `CAST(expr AS type)`.
#[derive(Debug, Clone)]
pub struct Cast {
    expr: Expr,
    target: String,
}

impl Cast {
    /// Creates a cast to the named SQL type.
    pub fn new(expr: impl Into<Expr>, target: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            target: target.into(),
        }
    }

    /// Returns the cast operand.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the target type name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Node for Cast {
    fn node_type(&self) -> &'static NodeType {
        &types::CAST
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The value a conflicting insert proposed for a column.
#[derive(Debug, Clone)]
pub struct Excluded(Expr);

impl Excluded {
    /// References the proposed value of `field`.
    pub fn new(field: impl Into<Expr>) -> Self {
        Self(field.into())
    }

    /// Returns the referenced field.
    #[must_use]
    pub const fn field(&self) -> &Expr {
        &self.0
    }
}

impl Node for Excluded {
    fn node_type(&self) -> &'static NodeType {
        &types::EXCLUDED
    }

    fn data_type(&self) -> &'static DataType {
        self.0.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Row bounds of a query, rendered as a separate node so that dialects can
/// override the syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitOffset {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl LimitOffset {
    /// Creates row bounds.
    #[must_use]
    pub const fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    /// Returns the row limit.
    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Returns the row offset.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Returns `true` if neither bound is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

impl Node for LimitOffset {
    fn node_type(&self) -> &'static NodeType {
        &types::LIMIT_OFFSET
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

into_expr!(
    Value,
    Raw,
    Name,
    Field,
    Alias,
    ExprList,
    Parentheses,
    Binary,
    Like,
    EscapeForLike,
    Ternary,
    Prefix,
    Postfix,
    Ordering,
    Func,
    Over,
    Case,
    Cast,
    Excluded,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_list_is_copy_on_write() {
        let mut a = ExprList::from_items([field("x")]);
        let b = a.clone();
        a.push(field("y"));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_cleared_keeps_kind() {
        let list = ExprList::concat([field("a"), field("b")]);
        let cleared = list.cleared();
        assert!(cleared.is_empty());
        assert_eq!(cleared.node_type(), &types::CONCAT);
        assert_eq!(cleared.separator(), " || ");
    }

    #[test]
    fn test_ordering_node_type() {
        assert_eq!(Ordering::asc(field("a")).node_type(), &types::ASC);
        assert_eq!(Ordering::desc(field("a")).node_type(), &types::DESC);
    }

    #[test]
    fn test_binary_uppercases_keywords() {
        let b = Binary::new("and", field("a"), field("b"), &datatype::BOOLEAN);
        assert_eq!(b.op(), "AND");
        assert_eq!(b.operator(), Some("AND"));
    }

    #[test]
    fn test_field_cache_is_keyed_by_compiler_and_context() {
        let f = Field::new("id");
        f.remember(1, Context::Expr, String::from("\"id\""));
        assert_eq!(f.cached(1, Context::Expr).as_deref(), Some("\"id\""));
        assert!(f.cached(2, Context::Expr).is_none());
        assert!(f.cached(1, Context::FieldName).is_none());
    }
}
