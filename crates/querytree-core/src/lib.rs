//! # querytree-core
//!
//! Composable SQL expression trees compiled by dialect-aware compilers.
//!
//! Queries are immutable trees of nodes shared behind [`Expr`] handles.
//! A [`Compiler`] walks a tree and dispatches each node to the renderer
//! registered for its type, or for the closest ancestor type, adding
//! parentheses where operator precedence requires them. Values never reach
//! the SQL text: they are bound as parameters in placeholder order.
//!
//! ```
//! use querytree_core::builder::Statement;
//! use querytree_core::{Select, SqlValue, Table};
//!
//! let author = Table::new("author");
//! let (sql, params) = Select::new()
//!     .from(&author)
//!     .fields([author.get_field("id"), author.get_field("first_name")])
//!     .where_clause(author.get_field("first_name").eq("John"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"SELECT "author"."id", "author"."first_name" FROM "author" WHERE "author"."first_name" = %s"#
//! );
//! assert_eq!(params, vec![SqlValue::Text("John".into())]);
//! ```
//!
//! ## Dialects
//!
//! Dialects are child compilers: they override what differs and inherit
//! everything else from their parent, including registrations made on the
//! parent later.
//!
//! ```
//! use querytree_core::builder::Statement;
//! use querytree_core::{dialect, Select, Table};
//!
//! let author = Table::new("author");
//! let query = Select::new().where_clause(author.get_field("id").eq(1));
//! let (sql, _) = query.build_with(dialect::postgres()).unwrap();
//! assert_eq!(sql, r#"SELECT * FROM "author" WHERE "author"."id" = $1"#);
//! ```

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod schema;

pub use ast::{field, raw, value, Expr, Node, NodeType, Operand, Table, TableJoin};
pub use builder::{Delete, Factory, Insert, Select, SetOperation, SqlValue, Statement, Update};
pub use compiler::{Compiler, Context, State};
pub use dialect::{Dialect, Placeholder, Settings};
pub use error::{Error, Result};
