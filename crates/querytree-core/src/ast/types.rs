//! Node type descriptors and the built-in node type hierarchy.
//!
//! Every node reports a `&'static NodeType`. The compiler looks up renderers
//! by walking from that type to the root, so a custom type declared as a
//! child of a built-in one renders like its parent until it gets its own
//! renderer.

use std::fmt;

/// Dispatch tag for expression nodes.
pub struct NodeType {
    name: &'static str,
    parent: Option<&'static NodeType>,
}

impl NodeType {
    /// Creates a node type. Names must be unique within a program.
    #[must_use]
    pub const fn new(name: &'static str, parent: Option<&'static Self>) -> Self {
        Self { name, parent }
    }

    /// Returns the type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent type.
    #[must_use]
    pub const fn parent(&self) -> Option<&'static Self> {
        self.parent
    }

    /// Iterates over this type and its ancestors, most specific first.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static Self> {
        std::iter::successors(Some(self), |ty| ty.parent)
    }

    /// Returns `true` if `self` is `other` or descends from it.
    #[must_use]
    pub fn is_a(&'static self, other: &Self) -> bool {
        self.ancestors().any(|ty| ty == other)
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeType {}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({})", self.name)
    }
}

/// Root of every node type.
pub static EXPR: NodeType = NodeType::new("Expr", None);

/// Literal bound as a parameter.
pub static VALUE: NodeType = NodeType::new("Value", Some(&EXPR));
/// SQL text emitted verbatim.
pub static RAW: NodeType = NodeType::new("Raw", Some(&EXPR));
/// Quoted identifier.
pub static NAME: NodeType = NodeType::new("Name", Some(&EXPR));
/// Column, optionally qualified by its table.
pub static FIELD: NodeType = NodeType::new("Field", Some(&EXPR));
/// `expr AS name`.
pub static ALIAS: NodeType = NodeType::new("Alias", Some(&EXPR));

/// Table source, the parent of every FROM item.
pub static TABLE: NodeType = NodeType::new("Table", Some(&EXPR));
/// Table or subquery under another name.
pub static TABLE_ALIAS: NodeType = NodeType::new("TableAlias", Some(&TABLE));
/// Chain of joined tables.
pub static TABLE_JOIN: NodeType = NodeType::new("TableJoin", Some(&EXPR));

/// Separated list of expressions.
pub static EXPR_LIST: NodeType = NodeType::new("ExprList", Some(&EXPR));
/// Column list of a SELECT; aliases render as `expr AS name` inside it.
pub static FIELD_LIST: NodeType = NodeType::new("FieldList", Some(&EXPR_LIST));
/// String concatenation.
pub static CONCAT: NodeType = NodeType::new("Concat", Some(&EXPR_LIST));
/// Explicit parentheses.
pub static PARENTHESES: NodeType = NodeType::new("Parentheses", Some(&EXPR));

/// Infix operator with two operands.
pub static BINARY: NodeType = NodeType::new("Binary", Some(&EXPR));
/// `LIKE` family, with an optional `ESCAPE`.
pub static LIKE: NodeType = NodeType::new("Like", Some(&BINARY));
/// Operand whose LIKE wildcards are escaped.
pub static ESCAPE_FOR_LIKE: NodeType = NodeType::new("EscapeForLike", Some(&EXPR));
/// `BETWEEN` and `NOT BETWEEN`.
pub static TERNARY: NodeType = NodeType::new("Ternary", Some(&EXPR));
/// Prefix operator such as `NOT` or `EXISTS`.
pub static PREFIX: NodeType = NodeType::new("Prefix", Some(&EXPR));
/// Postfix operator.
pub static POSTFIX: NodeType = NodeType::new("Postfix", Some(&EXPR));
/// ORDER BY item.
pub static ORDERING: NodeType = NodeType::new("Ordering", Some(&POSTFIX));
/// Ascending ordering.
pub static ASC: NodeType = NodeType::new("Asc", Some(&ORDERING));
/// Descending ordering.
pub static DESC: NodeType = NodeType::new("Desc", Some(&ORDERING));

/// Function call.
pub static FUNC: NodeType = NodeType::new("Func", Some(&EXPR));
/// Window function, `func OVER (...)`.
pub static OVER: NodeType = NodeType::new("Over", Some(&EXPR));
/// `CASE WHEN ... END`.
pub static CASE: NodeType = NodeType::new("Case", Some(&EXPR));
/// `CAST(expr AS type)`.
pub static CAST: NodeType = NodeType::new("Cast", Some(&EXPR));
/// Proposed row in a conflict update.
pub static EXCLUDED: NodeType = NodeType::new("Excluded", Some(&EXPR));

/// Parent of every statement node.
pub static QUERY: NodeType = NodeType::new("Query", Some(&EXPR));
/// SELECT statement.
pub static SELECT: NodeType = NodeType::new("Select", Some(&QUERY));
/// Parent of UNION, INTERSECT and EXCEPT.
pub static SET_OPERATION: NodeType = NodeType::new("SetOperation", Some(&QUERY));
/// `UNION`.
pub static UNION: NodeType = NodeType::new("Union", Some(&SET_OPERATION));
/// `INTERSECT`.
pub static INTERSECT: NodeType = NodeType::new("Intersect", Some(&SET_OPERATION));
/// `EXCEPT`.
pub static EXCEPT: NodeType = NodeType::new("Except", Some(&SET_OPERATION));
/// INSERT statement.
pub static INSERT: NodeType = NodeType::new("Insert", Some(&QUERY));
/// UPDATE statement.
pub static UPDATE: NodeType = NodeType::new("Update", Some(&QUERY));
/// DELETE statement.
pub static DELETE: NodeType = NodeType::new("Delete", Some(&QUERY));

/// Conflict clause of an INSERT.
pub static ON_CONFLICT: NodeType = NodeType::new("OnConflict", Some(&EXPR));
/// `LIMIT` and `OFFSET` bounds.
pub static LIMIT_OFFSET: NodeType = NodeType::new("LimitOffset", Some(&EXPR));
