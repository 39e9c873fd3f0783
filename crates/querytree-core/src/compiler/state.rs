//! Mutable rendering state and its scoped save/restore guard.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::ast::{NodeType, TableNode};
use crate::builder::value::SqlValue;
use crate::dialect::Placeholder;

/// Where a node is being rendered, for nodes whose SQL depends on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Context {
    /// Ordinary expression position.
    #[default]
    Expr,
    /// Bare column name, as in an INSERT column list or SET target.
    FieldName,
    /// The qualifier before a column name.
    FieldPrefix,
    /// A FROM or JOIN source.
    Table,
    /// Between `INSERT` and `INTO`.
    InsertModifier,
    /// After the values of an INSERT.
    InsertTail,
}

/// Position in the output, used to splice text rendered later into an
/// earlier place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    tokens: usize,
    params: usize,
}

/// One piece of output. Placeholders are numbered when the state is
/// finished, after any splicing has settled their order.
#[derive(Debug)]
enum Token {
    Text(String),
    Param(Placeholder),
}

/// Accumulated SQL tokens and parameters of one compilation.
#[derive(Debug, Default)]
pub struct State {
    sql: Vec<Token>,
    params: Vec<SqlValue>,
    /// Current rendering context.
    pub context: Context,
    /// Ambient precedence. Nodes binding looser than this are parenthesized.
    pub precedence: u8,
    callers: Vec<&'static NodeType>,
    auto_tables: Vec<Arc<TableNode>>,
    join_tables: Vec<usize>,
    depth: usize,
}

impl State {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends SQL text.
    pub fn append(&mut self, sql: impl Into<String>) {
        self.sql.push(Token::Text(sql.into()));
    }

    /// Binds a parameter and emits its placeholder.
    ///
    /// Numbered placeholders get their position in [`State::finish`], so
    /// they follow the final order of the text.
    pub fn bind(&mut self, value: SqlValue, placeholder: Placeholder) {
        self.params.push(value);
        self.sql.push(Token::Param(placeholder));
    }

    /// Returns the parameters bound so far.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns the current output position.
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark {
            tokens: self.sql.len(),
            params: self.params.len(),
        }
    }

    /// Returns the SQL text emitted since `mark`.
    #[must_use]
    pub fn text_since(&self, mark: Mark) -> String {
        let tokens = &self.sql[mark.tokens.min(self.sql.len())..];
        render_tokens(tokens, mark.params)
    }

    /// Moves everything emitted since `tail` to position `at`, keeping
    /// tokens and parameters aligned.
    pub fn move_since(&mut self, tail: Mark, at: Mark) {
        let moved_tokens = self.sql.len() - tail.tokens;
        let moved_params = self.params.len() - tail.params;
        self.sql[at.tokens..].rotate_right(moved_tokens);
        self.params[at.params..].rotate_right(moved_params);
    }

    /// Returns the node types being rendered, outermost first.
    #[must_use]
    pub fn callers(&self) -> &[&'static NodeType] {
        &self.callers
    }

    /// Returns the type of the node that dispatched the current one.
    #[must_use]
    pub fn parent_type(&self) -> Option<&'static NodeType> {
        self.callers.len().checked_sub(2).map(|i| self.callers[i])
    }

    /// Returns the nesting depth of open scopes.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Records a table referenced through a field prefix.
    pub fn note_auto_table(&mut self, table: &Arc<TableNode>) {
        if !self.auto_tables.iter().any(|t| Arc::ptr_eq(t, table)) {
            self.auto_tables.push(Arc::clone(table));
        }
    }

    /// Records a table rendered as an explicit FROM or JOIN source.
    pub fn note_join_table(&mut self, table: &TableNode) {
        let id = table_id(table);
        if !self.join_tables.contains(&id) {
            self.join_tables.push(id);
        }
    }

    /// Returns tables referenced by fields but not rendered as sources.
    #[must_use]
    pub fn pending_auto_tables(&self) -> Vec<Arc<TableNode>> {
        self.auto_tables
            .iter()
            .filter(|t| !self.join_tables.contains(&table_id(t)))
            .cloned()
            .collect()
    }

    /// Opens a scope that restores context, precedence and callers when
    /// dropped.
    pub fn scope(&mut self) -> Scope<'_> {
        self.depth += 1;
        Scope {
            context: self.context,
            precedence: self.precedence,
            callers: self.callers.len(),
            tables: None,
            state: self,
        }
    }

    pub(crate) fn enter(&mut self, node_type: &'static NodeType) {
        self.callers.push(node_type);
    }

    /// Consumes the state, returning the SQL text and parameters.
    #[must_use]
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (render_tokens(&self.sql, 0), self.params)
    }
}

/// Joins tokens, numbering placeholders after the `preceding` ones.
fn render_tokens(tokens: &[Token], preceding: usize) -> String {
    let mut sql = String::new();
    let mut index = preceding;
    for token in tokens {
        match token {
            Token::Text(text) => sql.push_str(text),
            Token::Param(placeholder) => {
                index += 1;
                sql.push_str(&placeholder.token(index));
            }
        }
    }
    sql
}

fn table_id(table: &TableNode) -> usize {
    std::ptr::from_ref(table) as usize
}

/// RAII guard returned by [`State::scope`].
///
/// Dereferences to the state. Dropping it restores the saved attributes on
/// every exit path, including early returns through `?`.
pub struct Scope<'s> {
    state: &'s mut State,
    context: Context,
    precedence: u8,
    callers: usize,
    tables: Option<(Vec<Arc<TableNode>>, Vec<usize>)>,
}

impl Scope<'_> {
    /// Gives the scope its own auto/join table lists, restoring the outer
    /// ones on drop.
    pub fn isolate_tables(&mut self) {
        if self.tables.is_none() {
            let auto = std::mem::take(&mut self.state.auto_tables);
            let joined = std::mem::take(&mut self.state.join_tables);
            self.tables = Some((auto, joined));
        }
    }
}

impl Deref for Scope<'_> {
    type Target = State;

    fn deref(&self) -> &State {
        self.state
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut State {
        self.state
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.state.context = self.context;
        self.state.precedence = self.precedence;
        self.state.callers.truncate(self.callers);
        if let Some((auto, joined)) = self.tables.take() {
            self.state.auto_tables = auto;
            self.state.join_tables = joined;
        }
        self.state.depth -= 1;
    }
}
