//! PostgreSQL dialect.

use super::{Dialect, Placeholder, Settings};
use crate::compiler::Compiler;

/// PostgreSQL: numbered placeholders and 63-character identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn settings(&self) -> Settings {
        Settings::new()
            .with_placeholder(Placeholder::Numbered)
            .with_max_identifier_length(63)
    }

    fn install(&self, compiler: &Compiler) {
        compiler.spell_operator("!=", "<>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{field, Table};
    use crate::dialect::{generic, postgres};

    #[test]
    fn test_numbered_placeholders() {
        let author = Table::new("author");
        let cond = author.get_field("a").eq(1) & author.get_field("b").eq(2);
        let (sql, params) = postgres().compile(&cond).unwrap();
        assert_eq!(sql, "\"author\".\"a\" = $1 AND \"author\".\"b\" = $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_identifier_truncation() {
        let long = "x".repeat(70);
        let (sql, _) = postgres().compile(&field(long.clone())).unwrap();
        assert_eq!(sql, format!("\"{}\"", "x".repeat(63)));
        let (sql, _) = generic().compile(&field(long.clone())).unwrap();
        assert_eq!(sql, format!("\"{long}\""));
    }

    #[test]
    fn test_not_equal_respelled() {
        let (sql, _) = postgres().compile(&field("a").binary("!=", 1)).unwrap();
        assert_eq!(sql, "\"a\" <> $1");
    }
}
