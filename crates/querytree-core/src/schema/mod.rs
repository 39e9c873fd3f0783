//! Mapping between Rust types and tables.
//!
//! Implemented by `#[derive(Entity)]` from the `querytree-derive` crate, or
//! by hand.

/// Table metadata of a mapped type.
///
/// ```
/// use querytree_core::schema::Entity;
/// use querytree_core::Table;
///
/// struct Author;
///
/// impl Entity for Author {
///     const TABLE: &'static str = "author";
///     const COLUMNS: &'static [(&'static str, &'static str)] =
///         &[("id", "id"), ("first_name", "first_name")];
/// }
///
/// let author = Table::for_entity::<Author>();
/// assert!(author.get_attribute::<Author>("first_name").is_some());
/// assert!(author.get_attribute::<Author>("missing").is_none());
/// ```
pub trait Entity {
    /// The SQL table name.
    const TABLE: &'static str;

    /// `(attribute, column)` pairs in declaration order.
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Returns the column mapped to `attribute`.
    #[must_use]
    fn column(attribute: &str) -> Option<&'static str> {
        Self::COLUMNS
            .iter()
            .find(|(attr, _)| *attr == attribute)
            .map(|(_, column)| *column)
    }
}
