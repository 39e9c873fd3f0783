//! # querytree-sqlite
//!
//! SQLite dialect for `querytree-core`.
//!
//! # How SQLite differs from the generic dialect
//!
//! - **Placeholders**: parameters are bound positionally with `?`.
//! - **[UPSERT]**: SQLite spells the ignore form `INSERT OR IGNORE` and
//!   supports `ON CONFLICT (..) DO UPDATE SET ...` (since SQLite 3.24.0).
//!   The proposed row is addressed as `excluded.col`.
//! - **[LIKE]**: `LIKE` is case-insensitive for ASCII characters, and there
//!   is no `ILIKE`. Both `like` and `ilike` are spelled `LIKE`.
//! - **[LIMIT]**: an offset requires a limit clause. A negative limit
//!   means "no upper bound", so an offset alone renders as
//!   `LIMIT -1 OFFSET n`.
//! - **Identifier quoting**: SQLite uses double quotes (`"`) as
//!   the standard quoting style, though it also accepts backticks
//!   and square brackets. See [SQLite keywords].
//!
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//! [LIKE]: https://www.sqlite.org/lang_expr.html#like
//! [LIMIT]: https://www.sqlite.org/lang_select.html#limitoffset
//! [SQLite keywords]: https://www.sqlite.org/lang_keywords.html
//!
//! ## Example
//!
//! ```rust
//! use querytree_core::builder::Statement;
//! use querytree_core::{Insert, SqlValue, Table};
//!
//! let users = Table::new("users");
//! let insert = Insert::new(&users)
//!     .fields([users.get_field("id"), users.get_field("name")])
//!     .values([SqlValue::Int(1), SqlValue::Text(String::from("Alice"))])
//!     .ignore_conflicts();
//!
//! let (sql, params) = insert.build_with(querytree_sqlite::compiler()).unwrap();
//! assert_eq!(sql, r#"INSERT OR IGNORE INTO "users" ("id", "name") VALUES (?, ?)"#);
//! assert_eq!(params.len(), 2);
//! ```

mod dialect;

use std::sync::OnceLock;

use querytree_core::dialect::{generic, Dialect};
use querytree_core::Compiler;

pub use dialect::SqliteDialect;

/// Returns the shared SQLite compiler, a child of the generic compiler.
pub fn compiler() -> &'static Compiler {
    static SQLITE: OnceLock<Compiler> = OnceLock::new();
    SQLITE.get_or_init(|| SqliteDialect::new().compiler_from(generic()))
}
