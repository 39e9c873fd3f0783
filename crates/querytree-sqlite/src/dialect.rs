//! SQLite dialect implementation.

use querytree_core::ast::{types, LimitOffset};
use querytree_core::builder::{ConflictAction, OnConflict};
use querytree_core::compiler::{render_assignments, render_conflict_target, Context, State};
use querytree_core::dialect::{Dialect, Placeholder, Settings};
use querytree_core::{Compiler, Result};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn settings(&self) -> Settings {
        Settings::new().with_placeholder(Placeholder::Qmark)
    }

    fn install(&self, compiler: &Compiler) {
        // LIKE is already case-insensitive for ASCII.
        compiler
            .spell_operator("ILIKE", "LIKE")
            .spell_operator("NOT ILIKE", "NOT LIKE")
            .when(&types::ON_CONFLICT, on_conflict)
            .when(&types::LIMIT_OFFSET, limit_offset);
    }
}

fn on_conflict(c: &Compiler, conflict: &OnConflict, state: &mut State) -> Result<()> {
    match (state.context, conflict.action()) {
        (Context::InsertModifier, ConflictAction::Ignore) => state.append("OR IGNORE "),
        (Context::InsertTail, ConflictAction::Update(pairs)) => {
            state.append(" ON CONFLICT");
            render_conflict_target(c, conflict, state)?;
            state.append(" DO UPDATE SET ");
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
        // A negative limit means no upper bound.
        (None, Some(offset)) => state.append(format!("LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
    Ok(())
}
