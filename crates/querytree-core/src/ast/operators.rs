//! Operator implementations selected by operand datatypes.
//!
//! Building `a || b` or `a + b` asks the registry which node to construct
//! for the operand datatypes. Text concatenation, for instance, becomes a
//! [`ExprList`] of kind `Concat` so that dialects can render it as a
//! function call.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::datatype::{self, DataType};
use super::expression::{Binary, ExprList};
use super::{Expr, Node};

/// Builds the node for `left op right`, given the resolved result type.
pub type Constructor = Arc<dyn Fn(&str, Expr, Expr, &'static DataType) -> Expr + Send + Sync>;

type Key = (String, &'static str, &'static str);

/// Operators whose result is a truth value regardless of operand types.
const BOOLEAN_OPERATORS: &[&str] = &[
    "=", "<>", "!=", "<", "<=", ">", ">=", "AND", "OR", "IS", "IS NOT", "IN", "NOT IN", "LIKE",
    "ILIKE", "NOT LIKE", "NOT ILIKE",
];

struct Inner {
    parent: Option<OperatorRegistry>,
    entries: RwLock<HashMap<Key, (&'static DataType, Constructor)>>,
}

/// Maps `(operator, left type, right type)` to a result type and a node
/// constructor.
///
/// Child registries see registrations made on their parents at any time.
#[derive(Clone)]
pub struct OperatorRegistry(Arc<Inner>);

impl OperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            parent: None,
            entries: RwLock::new(HashMap::new()),
        }))
    }

    /// Creates a registry with the default text concatenation entries.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        let concat: Constructor = Arc::new(|_, left, right, _| {
            Expr::new(ExprList::concat([left, right]))
        });
        for op in ["||", "+"] {
            registry.register(
                op,
                (&datatype::TEXT, &datatype::TEXT),
                &datatype::TEXT,
                Arc::clone(&concat),
            );
        }
        registry
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_defaults)
    }

    /// Creates a registry that falls back to this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(Arc::new(Inner {
            parent: Some(self.clone()),
            entries: RwLock::new(HashMap::new()),
        }))
    }

    /// Registers the implementation of `op` for a pair of operand types.
    pub fn register(
        &self,
        op: &str,
        operands: (&'static DataType, &'static DataType),
        result: &'static DataType,
        constructor: Constructor,
    ) -> &Self {
        debug!(
            op,
            left = operands.0.name(),
            right = operands.1.name(),
            result = result.name(),
            "registering operator"
        );
        self.0
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((op.to_uppercase(), operands.0.name(), operands.1.name()), (result, constructor));
        self
    }

    /// Resolves `op` for the operand types.
    ///
    /// Ancestors of the left type are tried first, each against every
    /// ancestor of the right type, then parent registries. Unregistered
    /// combinations resolve to a plain [`Binary`] node.
    #[must_use]
    pub fn lookup(
        &self,
        op: &str,
        left: &'static DataType,
        right: &'static DataType,
    ) -> (&'static DataType, Constructor) {
        let op = op.to_uppercase();
        for l in left.ancestors() {
            for r in right.ancestors() {
                if let Some(found) = self.find(&(op.clone(), l.name(), r.name())) {
                    return found;
                }
            }
        }
        let result = if BOOLEAN_OPERATORS.contains(&op.as_str()) {
            &datatype::BOOLEAN
        } else {
            left
        };
        (result, binary_constructor())
    }

    /// Builds `left op right` with the resolved constructor.
    #[must_use]
    pub fn build(&self, op: &str, left: Expr, right: Expr) -> Expr {
        let (result, constructor) = self.lookup(op, left.data_type(), right.data_type());
        constructor(op, left, right, result)
    }

    fn find(&self, key: &Key) -> Option<(&'static DataType, Constructor)> {
        let mut registry = Some(self);
        while let Some(current) = registry {
            let entries = current.0.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((result, constructor)) = entries.get(key) {
                return Some((*result, Arc::clone(constructor)));
            }
            registry = current.0.parent.as_ref();
        }
        None
    }
}

fn binary_constructor() -> Constructor {
    static BINARY: OnceLock<Constructor> = OnceLock::new();
    Arc::clone(BINARY.get_or_init(|| {
        Arc::new(|op, left, right, result| Expr::new(Binary::new(op, left, right, result)))
    }))
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.0.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("OperatorRegistry")
            .field("entries", &entries.len())
            .field("has_parent", &self.0.parent.is_some())
            .finish()
    }
}
