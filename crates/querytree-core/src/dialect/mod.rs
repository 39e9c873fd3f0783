//! SQL dialect support.
//!
//! A dialect is a [`Compiler`] configured with [`Settings`] and, for
//! dialects other than the generic one, a child of another compiler that
//! overrides only the renderers whose syntax differs.

mod generic;
mod postgres;

use std::borrow::Cow;
use std::sync::OnceLock;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;

use crate::compiler::Compiler;

/// Parameter placeholder style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placeholder {
    /// `%s`
    #[default]
    Format,
    /// `?`
    Qmark,
    /// `$1`, `$2`, ...
    Numbered,
}

impl Placeholder {
    /// Returns the placeholder for the parameter at 1-based `index`.
    #[must_use]
    pub fn token(self, index: usize) -> Cow<'static, str> {
        match self {
            Self::Format => Cow::Borrowed("%s"),
            Self::Qmark => Cow::Borrowed("?"),
            Self::Numbered => Cow::Owned(format!("${index}")),
        }
    }
}

/// Dialect-level configuration of a compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Parameter placeholder style.
    pub placeholder: Placeholder,
    /// Identifier quote character.
    pub identifier_quote: char,
    /// Identifiers longer than this are truncated.
    pub max_identifier_length: Option<usize>,
    /// Escape character of LIKE patterns.
    pub like_escape: char,
}

impl Settings {
    /// Creates the generic settings: `%s` placeholders and `"` quotes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            placeholder: Placeholder::Format,
            identifier_quote: '"',
            max_identifier_length: None,
            like_escape: '!',
        }
    }

    /// Sets the placeholder style.
    #[must_use]
    pub const fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Sets the identifier quote character.
    #[must_use]
    pub const fn with_identifier_quote(mut self, quote: char) -> Self {
        self.identifier_quote = quote;
        self
    }

    /// Sets the maximum identifier length.
    #[must_use]
    pub const fn with_max_identifier_length(mut self, length: usize) -> Self {
        self.max_identifier_length = Some(length);
        self
    }

    /// Sets the LIKE escape character.
    #[must_use]
    pub const fn with_like_escape(mut self, escape: char) -> Self {
        self.like_escape = escape;
        self
    }

    /// Quotes an identifier.
    ///
    /// Embedded quote characters are doubled and `*` is left bare.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        if name == "*" {
            return String::from("*");
        }
        let quote = self.identifier_quote;
        let name: String = match self.max_identifier_length {
            Some(max) => name.chars().take(max).collect(),
            None => name.to_owned(),
        };
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the settings of the dialect's compiler.
    fn settings(&self) -> Settings {
        Settings::new()
    }

    /// Registers the dialect's renderers, precedences and spellings.
    fn install(&self, compiler: &Compiler);

    /// Creates a compiler for this dialect inheriting from `parent`.
    fn compiler_from(&self, parent: &Compiler) -> Compiler {
        let compiler = parent.child(self.name(), self.settings());
        self.install(&compiler);
        compiler
    }
}

/// Returns the shared generic compiler.
pub fn generic() -> &'static Compiler {
    static GENERIC: OnceLock<Compiler> = OnceLock::new();
    GENERIC.get_or_init(|| GenericDialect::new().compiler())
}

/// Returns the shared PostgreSQL compiler, a child of [`generic`].
pub fn postgres() -> &'static Compiler {
    static POSTGRES: OnceLock<Compiler> = OnceLock::new();
    POSTGRES.get_or_init(|| PostgresDialect::new().compiler_from(generic()))
}
