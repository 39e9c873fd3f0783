//! MySQL dialect implementations.

use querytree_core::ast::{types, ExprList, Excluded, LimitOffset, Value};
use querytree_core::builder::{ConflictAction, OnConflict, SqlValue};
use querytree_core::compiler::precedence::{CLAUSE, MAX};
use querytree_core::compiler::{render_assignments, render_items, Context, PrecedenceKey, State};
use querytree_core::dialect::{Dialect, Settings};
use querytree_core::{Compiler, Result};
use tracing::debug;

/// Largest row count MySQL accepts, used when only an offset is given.
const UNBOUNDED_LIMIT: u64 = u64::MAX;

const MAX_IDENTIFIER_LENGTH: usize = 64;

const fn mysql_settings() -> Settings {
    Settings::new()
        .with_identifier_quote('`')
        .with_max_identifier_length(MAX_IDENTIFIER_LENGTH)
}

/// MySQL dialect with bound `%s` parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn settings(&self) -> Settings {
        mysql_settings()
    }

    fn install(&self, compiler: &Compiler) {
        // LIKE follows the column collation, usually case-insensitive.
        compiler
            .spell_operator("LIKE", "LIKE BINARY")
            .spell_operator("NOT LIKE", "NOT LIKE BINARY")
            .spell_operator("ILIKE", "LIKE")
            .spell_operator("NOT ILIKE", "NOT LIKE")
            .when(&types::CONCAT, concat)
            .when(&types::EXCLUDED, excluded)
            .when(&types::ON_CONFLICT, on_conflict)
            .when(&types::LIMIT_OFFSET, limit_offset)
            .set_precedence(MAX, [PrecedenceKey::of(&types::CONCAT)]);
    }
}

/// MySQL dialect embedding every literal into the SQL text.
///
/// Meant for tooling that cannot bind parameters, such as logging a
/// statement or feeding it to the `mysql` client. Literals go through
/// [`escape_literal`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlInlineDialect;

impl MySqlInlineDialect {
    /// Creates a new inline MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlInlineDialect {
    fn name(&self) -> &'static str {
        "mysql-inline"
    }

    fn settings(&self) -> Settings {
        mysql_settings()
    }

    fn install(&self, compiler: &Compiler) {
        compiler.when(&types::VALUE, inline_value);
    }
}

/// Escapes `text` as a quoted MySQL string literal.
///
/// Backslashes, quotes, NUL, newlines, carriage returns and Ctrl-Z are
/// backslash-escaped, matching `mysql_real_escape_string`.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped.push('\'');
    escaped
}

fn inline_value(_: &Compiler, node: &Value, state: &mut State) -> Result<()> {
    match node.get() {
        SqlValue::Text(text) => state.append(escape_literal(text)),
        other => state.append(other.to_sql_inline()),
    }
    Ok(())
}

fn concat(c: &Compiler, node: &ExprList, state: &mut State) -> Result<()> {
    let mut scope = state.scope();
    scope.precedence = CLAUSE;
    scope.append("CONCAT(");
    render_items(c, node.items(), ", ", &mut scope)?;
    scope.append(")");
    Ok(())
}

fn excluded(c: &Compiler, node: &Excluded, state: &mut State) -> Result<()> {
    state.append("VALUES(");
    c.render_in(node.field(), state, Context::FieldName)?;
    state.append(")");
    Ok(())
}

fn on_conflict(c: &Compiler, conflict: &OnConflict, state: &mut State) -> Result<()> {
    match (state.context, conflict.action()) {
        (Context::InsertModifier, ConflictAction::Ignore) => {
            if conflict.is_update_suppressed() {
                debug!(compiler = %c.name(), "conflict update suppressed by ignore");
            }
            state.append("IGNORE ");
        }
        (Context::InsertTail, ConflictAction::Update(pairs)) => {
            if !conflict.target().is_empty() {
                debug!(compiler = %c.name(), "conflict target ignored, MySQL uses every unique key");
            }
            state.append(" ON DUPLICATE KEY UPDATE ");
            render_assignments(c, pairs, state)?;
        }
        _ => {}
    }
    Ok(())
}

fn limit_offset(_: &Compiler, bounds: &LimitOffset, state: &mut State) -> Result<()> {
    match (bounds.limit(), bounds.offset()) {
        (Some(limit), Some(offset)) => state.append(format!("LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => state.append(format!("LIMIT {limit}")),
        (None, Some(offset)) => state.append(format!("LIMIT {UNBOUNDED_LIMIT} OFFSET {offset}")),
        (None, None) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.settings().identifier_quote, '`');
        assert_eq!(dialect.settings().max_identifier_length, Some(64));
        assert_eq!(MySqlInlineDialect::new().name(), "mysql-inline");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("John"), "'John'");
        assert_eq!(escape_literal("O'Brien"), "'O\\'Brien'");
        assert_eq!(escape_literal("a\\b"), "'a\\\\b'");
        assert_eq!(escape_literal("line\nbreak\r"), "'line\\nbreak\\r'");
        assert_eq!(escape_literal("nul\0ctrl\x1a"), "'nul\\0ctrl\\Z'");
    }

    #[test]
    fn test_unbounded_limit_value() {
        assert_eq!(UNBOUNDED_LIMIT.to_string(), "18446744073709551615");
    }
}
