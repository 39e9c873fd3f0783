//! Expression tree: the node trait, the shared `Expr` handle and the
//! built-in node kinds.

pub mod datatype;
mod expression;
pub mod functions;
mod ops;
pub mod operators;
mod table;
pub mod types;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use datatype::DataType;
pub use expression::{
    exists, field, not_exists, raw, value, Alias, Binary, Case, Cast, EscapeForLike,
    Excluded, ExprList, Field, Func, Like, LikeKind, LimitOffset, Name, Nulls, Ordering, Over,
    Parentheses, Postfix, Prefix, Raw, Ternary, Value,
};
pub use operators::OperatorRegistry;
pub use table::{JoinType, Table, TableJoin, TableNode};
pub use types::NodeType;

use crate::builder::value::{SqlValue, ToSqlValue};

/// A node of the expression tree.
///
/// `node_type` is the dispatch tag the compiler uses to find a renderer.
/// `operator` refines precedence lookup for nodes sharing a type, and
/// `data_type` selects operator implementations in the [`OperatorRegistry`].
pub trait Node: Any + fmt::Debug + Send + Sync {
    /// Returns the dispatch tag.
    fn node_type(&self) -> &'static NodeType;

    /// Returns the operator symbol used for precedence lookup.
    fn operator(&self) -> Option<&str> {
        None
    }

    /// Returns the declared SQL datatype.
    fn data_type(&self) -> &'static DataType {
        &datatype::ANY
    }

    /// Returns `self` for downcasting in typed renderers.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an expression node.
///
/// Cloning is cheap and shares the node, so subtrees are reused across
/// queries without copying.
#[derive(Clone)]
pub struct Expr(Arc<dyn Node>);

impl Expr {
    /// Wraps a node.
    pub fn new<N: Node>(node: N) -> Self {
        Self(Arc::new(node))
    }

    /// Wraps an already shared node.
    #[must_use]
    pub fn from_arc(node: Arc<dyn Node>) -> Self {
        Self(node)
    }

    /// Returns the wrapped node.
    #[must_use]
    pub fn node(&self) -> &dyn Node {
        &*self.0
    }

    /// Downcasts the wrapped node.
    #[must_use]
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns `true` when both handles point to the same node.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::as_ptr(&a.0).cast::<()>() == Arc::as_ptr(&b.0).cast::<()>()
    }
}

impl Node for Expr {
    fn node_type(&self) -> &'static NodeType {
        self.0.node_type()
    }

    fn operator(&self) -> Option<&str> {
        self.0.operator()
    }

    fn data_type(&self) -> &'static DataType {
        self.0.data_type()
    }

    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&Self> for Expr {
    fn from(expr: &Self) -> Self {
        expr.clone()
    }
}

/// Implements `From<$node> for Expr` and `From<$node> for Operand`.
macro_rules! into_expr {
    ($($node:ty),* $(,)?) => {
        $(
            impl From<$node> for $crate::ast::Expr {
                fn from(node: $node) -> Self {
                    Self::new(node)
                }
            }

            impl From<$node> for $crate::ast::Operand {
                fn from(node: $node) -> Self {
                    Self::Expr($crate::ast::Expr::new(node))
                }
            }
        )*
    };
}

pub(crate) use into_expr;

/// Right-hand operand of an operator.
///
/// Scalars become bound values, `None` becomes NULL and collections become
/// parenthesized lists.
#[derive(Debug, Clone)]
pub enum Operand {
    /// An expression used as is.
    Expr(Expr),
    /// A value bound as a parameter.
    Value(SqlValue),
    /// A list of operands, rendered as `(a, b, ...)`.
    List(Vec<Operand>),
}

impl Operand {
    /// Converts anything operand-like straight into an expression node.
    pub fn wrap(operand: impl Into<Self>) -> Expr {
        let operand: Self = operand.into();
        operand.into_expr()
    }

    /// Converts the operand into an expression node.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        match self {
            Self::Expr(expr) => expr,
            Self::Value(v) => Expr::new(Value::new(v)),
            Self::List(items) => Expr::new(Parentheses::new(ExprList::from_operands(items))),
        }
    }

    /// Returns the datatype the operand will have once converted.
    #[must_use]
    pub fn data_type(&self) -> &'static DataType {
        match self {
            Self::Expr(expr) => expr.data_type(),
            Self::Value(v) => v.data_type(),
            Self::List(_) => &datatype::ANY,
        }
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for Operand {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<SqlValue> for Operand {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

macro_rules! scalar_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::Value(v.to_sql_value())
                }
            }
        )*
    };
}

scalar_operand!(
    bool,
    i64,
    i32,
    i16,
    i8,
    u32,
    u16,
    u8,
    f64,
    f32,
    String,
    &String,
    &str,
    chrono::NaiveDate,
    chrono::NaiveDateTime
);

impl<T: Into<Self>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Value(SqlValue::Null), Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for Operand {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Self>> From<&[T]> for Operand {
    fn from(items: &[T]) -> Self {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ptr_eq_tracks_identity() {
        let a = field("id");
        let b = a.clone();
        let c = field("id");
        assert!(Expr::ptr_eq(&a, &b));
        assert!(!Expr::ptr_eq(&a, &c));
    }

    #[test]
    fn test_expr_delegates_node_type() {
        let e = value(1);
        assert_eq!(e.node_type(), &types::VALUE);
        assert!(e.downcast_ref::<Value>().is_some());
        assert!(e.data_type().is_a(&datatype::INTEGER));
    }

    #[test]
    fn test_operand_wrapping() {
        assert!(matches!(Operand::from(None::<i32>), Operand::Value(SqlValue::Null)));
        assert!(matches!(Operand::from(vec![1, 2]), Operand::List(ref v) if v.len() == 2));
        assert!(matches!(Operand::from("x"), Operand::Value(SqlValue::Text(_))));
        assert!(matches!(Operand::from(field("a")), Operand::Expr(_)));
    }
}
