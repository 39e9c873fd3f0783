#![allow(dead_code)]

use querytree_core::{Node, SqlValue, Table};

pub fn author() -> Table {
    Table::new("author")
}

/// Compiles with the shared SQLite compiler.
pub fn sqlite(node: &dyn Node) -> (String, Vec<SqlValue>) {
    querytree_sqlite::compiler()
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile {node:?}: {e}"))
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_owned())
}
