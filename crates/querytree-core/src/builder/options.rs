//! Keyword options of the list-building methods.

use crate::error::{Error, Result};

/// Options of `fields_with`, `group_by_with`, `order_by_with` and
/// `distinct_on_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Replace the current list instead of appending to it.
    pub reset: bool,
    /// Wrap ORDER BY items in a descending decorator.
    pub desc: bool,
}

impl ListOptions {
    /// Options replacing the current list.
    #[must_use]
    pub const fn replace() -> Self {
        Self {
            reset: true,
            desc: false,
        }
    }

    /// Options for descending ORDER BY items.
    #[must_use]
    pub const fn descending() -> Self {
        Self {
            reset: false,
            desc: true,
        }
    }

    /// Builds options from keyword pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOption`] for a key other than `reset`
    /// or `desc`.
    pub fn from_pairs(pairs: &[(&str, bool)]) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in pairs {
            match *key {
                "reset" => options.reset = *value,
                "desc" => options.desc = *value,
                other => return Err(Error::UnsupportedOption(other.to_owned())),
            }
        }
        Ok(options)
    }
}

/// How a new WHERE or HAVING condition combines with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    /// `current AND new`
    And,
    /// `current OR new`
    Or,
}
