//! Immutable query builders.
//!
//! Builders are ordinary nodes: each method returns a new builder sharing
//! the unchanged parts of the receiver, and any builder can be compiled by
//! any [`Compiler`].

mod delete;
mod factory;
mod insert;
mod options;
mod select;
mod set;
mod update;
pub mod value;

pub use delete::Delete;
pub use factory::{Factory, FactoryBuilder, SelectHook};
pub use insert::{ConflictAction, Insert, InsertSource, OnConflict};
pub use options::{ListOptions, Logical};
pub use select::{Distinct, Select};
pub use set::{SetKind, SetOperation};
pub use update::Update;
pub use value::{SqlValue, ToSqlValue};

use crate::ast::Node;
use crate::compiler::Compiler;
use crate::dialect;
use crate::error::Result;

/// A node that compiles on its own into a statement.
pub trait Statement: Node + Sized {
    /// Compiles with the generic dialect.
    ///
    /// # Errors
    ///
    /// See [`Compiler::compile`].
    fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        self.build_with(dialect::generic())
    }

    /// Compiles with `compiler`.
    ///
    /// # Errors
    ///
    /// See [`Compiler::compile`].
    fn build_with(&self, compiler: &Compiler) -> Result<(String, Vec<SqlValue>)> {
        compiler.compile(self)
    }
}

impl Statement for Select {}
impl Statement for SetOperation {}
impl Statement for Insert {}
impl Statement for Update {}
impl Statement for Delete {}
