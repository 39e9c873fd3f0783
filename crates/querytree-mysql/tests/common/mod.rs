#![allow(dead_code)]

use querytree_core::{Node, SqlValue, Table};

pub fn author() -> Table {
    Table::new("author")
}

pub fn book() -> Table {
    Table::new("book")
}

/// Compiles with the shared MySQL compiler.
pub fn mysql(node: &dyn Node) -> (String, Vec<SqlValue>) {
    querytree_mysql::compiler()
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile {node:?}: {e}"))
}

/// Compiles with the shared inline MySQL compiler.
pub fn inline(node: &dyn Node) -> String {
    let (sql, params) = querytree_mysql::inline_compiler()
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile {node:?}: {e}"));
    assert!(params.is_empty(), "inline SQL bound parameters: {params:?}");
    sql
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_owned())
}
