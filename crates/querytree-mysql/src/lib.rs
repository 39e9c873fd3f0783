//! # querytree-mysql
//!
//! MySQL dialects for `querytree-core`.
//!
//! Both dialects are child compilers: they register only the renderers
//! whose syntax differs and fall back to the generic compiler for the rest.
//!
//! # How MySQL differs from the generic dialect
//!
//! - **Identifier quoting**: MySQL quotes identifiers with backticks and
//!   limits them to 64 characters. See [identifiers].
//! - **[String comparison]**: `LIKE` follows the column collation, which is
//!   usually case-insensitive. `like` is therefore spelled `LIKE BINARY`
//!   and `ilike` is spelled `LIKE`.
//! - **Concatenation**: `||` is a logical OR unless `PIPES_AS_CONCAT` is
//!   set, so concatenation renders as [`CONCAT()`].
//! - **Conflicts**: MySQL has [`INSERT IGNORE`] and
//!   [`ON DUPLICATE KEY UPDATE`] instead of `ON CONFLICT`. The proposed
//!   row is addressed as `VALUES(col)`.
//! - **[LIMIT]**: an offset requires a row count, so an offset alone
//!   renders with the largest unsigned 64-bit limit.
//!
//! [identifiers]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [String comparison]: https://dev.mysql.com/doc/refman/8.0/en/string-comparison-functions.html
//! [`CONCAT()`]: https://dev.mysql.com/doc/refman/8.0/en/string-functions.html#function_concat
//! [`INSERT IGNORE`]: https://dev.mysql.com/doc/refman/8.0/en/insert.html
//! [`ON DUPLICATE KEY UPDATE`]: https://dev.mysql.com/doc/refman/8.0/en/insert-on-duplicate.html
//! [LIMIT]: https://dev.mysql.com/doc/refman/8.0/en/select.html
//!
//! ## Example
//!
//! ```rust
//! use querytree_core::builder::Statement;
//! use querytree_core::{Select, Table};
//!
//! let author = Table::new("author");
//! let query = Select::new()
//!     .fields([author.get_field("id")])
//!     .where_clause(author.get_field("first_name").eq("John"));
//!
//! let (sql, params) = query.build_with(querytree_mysql::compiler()).unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT `author`.`id` FROM `author` WHERE `author`.`first_name` = %s"
//! );
//! assert_eq!(params.len(), 1);
//!
//! let (sql, params) = query.build_with(querytree_mysql::inline_compiler()).unwrap();
//! assert!(sql.ends_with("= 'John'"));
//! assert!(params.is_empty());
//! ```

mod dialect;

use std::sync::OnceLock;

use querytree_core::dialect::{generic, Dialect};
use querytree_core::Compiler;

pub use dialect::{escape_literal, MySqlDialect, MySqlInlineDialect};

/// Returns the shared MySQL compiler, a child of the generic compiler.
pub fn compiler() -> &'static Compiler {
    static MYSQL: OnceLock<Compiler> = OnceLock::new();
    MYSQL.get_or_init(|| MySqlDialect::new().compiler_from(generic()))
}

/// Returns the shared inline MySQL compiler, a child of [`compiler`].
///
/// **Warning**: prefer [`compiler`] and bound parameters wherever the
/// driver supports them.
pub fn inline_compiler() -> &'static Compiler {
    static MYSQL_INLINE: OnceLock<Compiler> = OnceLock::new();
    MYSQL_INLINE.get_or_init(|| MySqlInlineDialect::new().compiler_from(compiler()))
}
