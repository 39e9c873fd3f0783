//! Error types for building and compiling expression trees.

use thiserror::Error as ThisError;

/// Errors raised while building or compiling a query.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// No renderer is registered for the node type nor any of its ancestors.
    #[error("no renderer registered for node type '{0}'")]
    UnknownNodeType(String),

    /// A typed renderer was handed a node of another Rust type.
    #[error("renderer for node type '{node_type}' expects a {expected}")]
    RendererMismatch {
        /// Name of the node type being rendered.
        node_type: String,
        /// Rust type the renderer was registered for.
        expected: &'static str,
    },

    /// IN or NOT IN over an empty collection.
    #[error("IN requires at least one value")]
    EmptyCollection,

    /// ON or USING applied to a join step that has no joined table.
    #[error("{0} requires a joined table")]
    MissingJoinTarget(&'static str),

    /// A join step already carries an ON condition.
    #[error("join step already has an ON condition")]
    MultipleOnClause,

    /// Unknown keyword option.
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    /// Operator symbol that cannot be emitted as SQL.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;
