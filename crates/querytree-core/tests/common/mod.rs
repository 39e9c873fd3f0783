#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use querytree_core::ast::{types, Name};
use querytree_core::dialect::{self, Settings};
use querytree_core::{Compiler, Node, SqlValue, Table};

pub fn author() -> Table {
    Table::new("author")
}

pub fn book() -> Table {
    Table::new("book")
}

/// Compiles with the shared generic compiler.
pub fn sql(node: &dyn Node) -> (String, Vec<SqlValue>) {
    dialect::generic()
        .compile(node)
        .unwrap_or_else(|e| panic!("Failed to compile {node:?}: {e}"))
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_owned())
}

/// A child of the generic compiler counting how often identifiers are
/// rendered.
pub fn counting_compiler() -> (Compiler, Arc<AtomicUsize>) {
    let compiler = dialect::generic().child("counting", Settings::new());
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    compiler.when::<Name, _>(&types::NAME, move |c, name, state| {
        seen.fetch_add(1, Ordering::SeqCst);
        state.append(c.settings().quote_identifier(name.as_str()));
        Ok(())
    });
    (compiler, count)
}

/// Returns the numbers of the `$n` placeholders in `sql`, in text order.
pub fn numbered_placeholders(sql: &str) -> Vec<usize> {
    sql.split('$')
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}
