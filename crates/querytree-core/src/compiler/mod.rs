//! Dispatch engine turning expression trees into SQL text and parameters.
//!
//! A [`Compiler`] holds renderers keyed by node type, precedence values and
//! operator spellings. Dialects are child compilers: they override what
//! differs and fall back to their parent for everything else. Lookups walk
//! the parent chain on every render, so registrations made on a parent after
//! a child was created are still visible to the child.

pub mod precedence;
mod render;
mod state;
mod statement;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

pub use render::{install, render_items};
pub use statement::{render_assignments, render_conflict_target};
pub use state::{Context, Mark, Scope, State};

use crate::ast::{Node, NodeType};
use crate::builder::value::SqlValue;
use crate::dialect::Settings;
use crate::error::{Error, Result};

/// Untyped renderer: receives the active compiler, the node and the state.
pub type RenderFn = Arc<dyn Fn(&Compiler, &dyn Node, &mut State) -> Result<()> + Send + Sync>;

/// Key of a precedence entry: a node type, optionally narrowed to one
/// operator symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrecedenceKey {
    node_type: &'static str,
    operator: Option<String>,
}

impl PrecedenceKey {
    /// Key matching every node of `node_type`.
    #[must_use]
    pub const fn of(node_type: &'static NodeType) -> Self {
        Self {
            node_type: node_type.name(),
            operator: None,
        }
    }

    /// Key matching nodes of `node_type` reporting `operator`.
    #[must_use]
    pub fn op(node_type: &'static NodeType, operator: &str) -> Self {
        Self {
            node_type: node_type.name(),
            operator: Some(operator.to_uppercase()),
        }
    }
}

#[derive(Default)]
struct Registry {
    renderers: HashMap<&'static str, RenderFn>,
    precedence: HashMap<PrecedenceKey, u8>,
    spellings: HashMap<String, String>,
}

struct Inner {
    id: u64,
    name: String,
    settings: Settings,
    parent: Option<Compiler>,
    registry: RwLock<Registry>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A SQL compiler for one dialect.
///
/// Cloning is cheap and shares the registry.
#[derive(Clone)]
pub struct Compiler(Arc<Inner>);

impl Compiler {
    /// Creates a compiler with an empty registry.
    ///
    /// Use [`install`] to register the standard renderers, or derive from
    /// an existing compiler with [`Compiler::child`].
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self::with_parent(name.into(), settings, None)
    }

    /// Creates a compiler that falls back to `self` for anything it does
    /// not register itself.
    #[must_use]
    pub fn child(&self, name: impl Into<String>, settings: Settings) -> Self {
        Self::with_parent(name.into(), settings, Some(self.clone()))
    }

    fn with_parent(name: String, settings: Settings, parent: Option<Self>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            id,
            name = %name,
            parent = parent.as_ref().map(Self::name),
            "creating compiler"
        );
        Self(Arc::new(Inner {
            id,
            name,
            settings,
            parent,
            registry: RwLock::new(Registry::default()),
        }))
    }

    /// Returns the process-unique id, used to key render caches.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Returns the compiler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the dialect settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.0.settings
    }

    /// Returns the parent compiler.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.0.parent.as_ref()
    }

    fn lineage(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.0.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.0.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an untyped renderer for `node_type`.
    pub fn register(&self, node_type: &'static NodeType, renderer: RenderFn) -> &Self {
        debug!(compiler = %self.name(), node_type = node_type.name(), "registering renderer");
        self.write().renderers.insert(node_type.name(), renderer);
        self
    }

    /// Registers a renderer for nodes of Rust type `N` tagged `node_type`.
    ///
    /// A node of another Rust type reaching this renderer fails with
    /// [`Error::RendererMismatch`].
    pub fn when<N, F>(&self, node_type: &'static NodeType, renderer: F) -> &Self
    where
        N: Node,
        F: Fn(&Self, &N, &mut State) -> Result<()> + Send + Sync + 'static,
    {
        let wrapped: RenderFn = Arc::new(move |compiler, node, state| {
            let typed = node.as_any().downcast_ref::<N>().ok_or_else(|| {
                Error::RendererMismatch {
                    node_type: node.node_type().name().to_owned(),
                    expected: std::any::type_name::<N>(),
                }
            })?;
            renderer(compiler, typed, state)
        });
        self.register(node_type, wrapped)
    }

    /// Returns the renderer registered for exactly `node_type`, looking
    /// through parent compilers.
    #[must_use]
    pub fn renderer(&self, node_type: &'static NodeType) -> Option<RenderFn> {
        self.lineage()
            .find_map(|c| c.read().renderers.get(node_type.name()).cloned())
    }

    /// Returns the renderer used for `node_type`: the closest match walking
    /// the type's ancestors, each looked up through the compiler chain.
    #[must_use]
    pub fn resolve(&self, node_type: &'static NodeType) -> Option<RenderFn> {
        node_type.ancestors().find_map(|ty| self.renderer(ty))
    }

    /// Sets the precedence of every key.
    pub fn set_precedence(&self, precedence: u8, keys: impl IntoIterator<Item = PrecedenceKey>) -> &Self {
        let mut registry = self.write();
        for key in keys {
            debug!(compiler = %self.name(), ?key, precedence, "registering precedence");
            registry.precedence.insert(key, precedence);
        }
        drop(registry);
        self
    }

    /// Returns the precedence of `node`.
    ///
    /// The node type and then each ancestor is tried, first with the
    /// node's operator and then without it. A custom node type therefore
    /// binds like the built-in type it descends from.
    #[must_use]
    pub fn precedence(&self, node: &dyn Node) -> Option<u8> {
        let operator = node.operator();
        node.node_type().ancestors().find_map(|ty| {
            operator
                .and_then(|op| self.lookup_precedence(&PrecedenceKey::op(ty, op)))
                .or_else(|| self.lookup_precedence(&PrecedenceKey::of(ty)))
        })
    }

    fn lookup_precedence(&self, key: &PrecedenceKey) -> Option<u8> {
        self.lineage()
            .find_map(|c| c.read().precedence.get(key).copied())
    }

    /// Emits `spelling` wherever operator `op` would be emitted.
    pub fn spell_operator(&self, op: &str, spelling: impl Into<String>) -> &Self {
        let spelling = spelling.into();
        debug!(compiler = %self.name(), op, spelling = %spelling, "registering operator spelling");
        self.write().spellings.insert(op.to_uppercase(), spelling);
        self
    }

    /// Returns the SQL text for operator `op`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperator`] when `op` has no registered
    /// spelling and contains characters that cannot appear in a SQL
    /// operator.
    pub fn operator_sql(&self, op: &str) -> Result<String> {
        let key = op.to_uppercase();
        if let Some(spelling) = self
            .lineage()
            .find_map(|c| c.read().spellings.get(&key).cloned())
        {
            return Ok(spelling);
        }
        if is_operator_text(&key) {
            Ok(key)
        } else {
            Err(Error::UnknownOperator(op.to_owned()))
        }
    }

    /// Compiles a node into SQL text and its parameters.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by a renderer.
    pub fn compile(&self, node: &dyn Node) -> Result<(String, Vec<SqlValue>)> {
        let mut state = State::new();
        self.render(node, &mut state)?;
        let (sql, params) = state.finish();
        trace!(
            compiler = %self.name(),
            node_type = node.node_type().name(),
            sql_len = sql.len(),
            params = params.len(),
            "compiled"
        );
        Ok((sql, params))
    }

    /// Renders a node into `state`, parenthesizing it when it binds looser
    /// than the ambient precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNodeType`] when no renderer matches the node
    /// type or any of its ancestors, or the renderer's error.
    pub fn render(&self, node: &dyn Node, state: &mut State) -> Result<()> {
        let node_type = node.node_type();
        let renderer = self
            .resolve(node_type)
            .ok_or_else(|| Error::UnknownNodeType(node_type.name().to_owned()))?;
        let outer = state.precedence;
        let inner = self.precedence(node).unwrap_or(outer);
        let parenthesize = inner < outer;

        let mut scope = state.scope();
        scope.enter(node_type);
        scope.precedence = inner;
        if parenthesize {
            scope.append("(");
        }
        renderer(self, node, &mut scope)?;
        if parenthesize {
            scope.append(")");
        }
        Ok(())
    }

    /// Renders a node in another context.
    ///
    /// # Errors
    ///
    /// See [`Compiler::render`].
    pub fn render_in(&self, node: &dyn Node, state: &mut State, context: Context) -> Result<()> {
        let mut scope = state.scope();
        scope.context = context;
        self.render(node, &mut scope)
    }

    /// Renders a node under another ambient precedence.
    ///
    /// # Errors
    ///
    /// See [`Compiler::render`].
    pub fn render_at(&self, node: &dyn Node, state: &mut State, precedence: u8) -> Result<()> {
        let mut scope = state.scope();
        scope.precedence = precedence;
        self.render(node, &mut scope)
    }
}

/// Characters allowed in symbolic operators, besides letters and spaces of
/// keyword operators.
const OPERATOR_SYMBOLS: &str = "+-*/%<>=!~^&|#@?:";

fn is_operator_text(op: &str) -> bool {
    !op.is_empty()
        && !op.contains("--")
        && !op.contains("/*")
        && op
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '_' || OPERATOR_SYMBOLS.contains(c))
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("settings", &self.0.settings)
            .field("parent", &self.parent().map(Self::name))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{field, raw, types, value, Raw};

    fn base() -> Compiler {
        let compiler = Compiler::new("test", Settings::default());
        install(&compiler);
        compiler
    }

    #[test]
    fn test_unknown_node_type() {
        let compiler = Compiler::new("empty", Settings::default());
        let err = compiler.compile(&field("a")).unwrap_err();
        assert_eq!(err, Error::UnknownNodeType(String::from("Field")));
    }

    #[test]
    fn test_renderer_mismatch() {
        let compiler = base();
        compiler.when::<Raw, _>(&types::VALUE, |_, _, _| Ok(()));
        let err = compiler.compile(&value(1)).unwrap_err();
        assert!(matches!(err, Error::RendererMismatch { ref node_type, .. } if node_type == "Value"));
    }

    #[test]
    fn test_dispatch_falls_back_to_ancestor() {
        static SHOUT: NodeType = NodeType::new("Shout", Some(&types::RAW));

        #[derive(Debug)]
        struct Shout;

        impl Node for Shout {
            fn node_type(&self) -> &'static NodeType {
                &SHOUT
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let compiler = Compiler::new("bare", Settings::default());
        compiler.register(
            &types::RAW,
            Arc::new(|_, node, state| {
                state.append(node.node_type().name());
                Ok(())
            }),
        );
        let (sql, _) = compiler.compile(&Shout).unwrap();
        assert_eq!(sql, "Shout");
    }

    #[test]
    fn test_child_sees_late_parent_registration() {
        let parent = Compiler::new("parent", Settings::default());
        let child = parent.child("child", Settings::default());
        assert!(child.compile(&raw("x")).is_err());
        parent.when::<Raw, _>(&types::RAW, |_, node, state| {
            state.append(node.as_str());
            Ok(())
        });
        assert_eq!(child.compile(&raw("x")).unwrap().0, "x");
    }

    #[test]
    fn test_child_override_does_not_leak_to_parent() {
        let parent = base();
        let child = parent.child("child", Settings::default());
        child.when::<Raw, _>(&types::RAW, |_, _, state| {
            state.append("overridden");
            Ok(())
        });
        assert_eq!(child.compile(&raw("x")).unwrap().0, "overridden");
        assert_eq!(parent.compile(&raw("x")).unwrap().0, "x");
    }

    #[test]
    fn test_operator_sql_validates_symbols() {
        let compiler = base();
        assert_eq!(compiler.operator_sql("is not").unwrap(), "IS NOT");
        assert_eq!(compiler.operator_sql("@>").unwrap(), "@>");
        assert!(matches!(
            compiler.operator_sql("=; DROP"),
            Err(Error::UnknownOperator(_))
        ));
        compiler.spell_operator("!=", "<>");
        assert_eq!(compiler.operator_sql("!=").unwrap(), "<>");
    }

    #[test]
    fn test_state_is_balanced_after_error() {
        let compiler = base();
        let mut state = State::new();
        let bad = field("a").eq(Vec::<i32>::new());
        assert_eq!(
            compiler.render(&bad, &mut state).unwrap_err(),
            Error::EmptyCollection
        );
        assert_eq!(state.depth(), 0);
        assert!(state.callers().is_empty());
        assert_eq!(state.context, Context::Expr);
        assert_eq!(state.precedence, 0);
    }

    #[test]
    fn test_compiler_ids_are_unique() {
        let a = base();
        let b = a.child("b", Settings::default());
        assert_ne!(a.id(), b.id());
        assert_eq!(b.parent().map(Compiler::id), Some(a.id()));
    }
}
