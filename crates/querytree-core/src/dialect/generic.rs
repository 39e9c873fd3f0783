//! Generic SQL dialect.

use super::{Dialect, Settings};
use crate::compiler::{self, Compiler};

/// ANSI-flavoured dialect holding the standard renderers.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates a standalone compiler with the standard renderers.
    ///
    /// Each call returns a fresh registry; [`super::generic`] returns the
    /// shared one.
    #[must_use]
    pub fn compiler(&self) -> Compiler {
        let compiler = Compiler::new(self.name(), self.settings());
        self.install(&compiler);
        compiler
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn settings(&self) -> Settings {
        Settings::new()
    }

    fn install(&self, compiler: &Compiler) {
        compiler::install(compiler);
    }
}
