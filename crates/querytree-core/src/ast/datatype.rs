//! Declared SQL datatypes used to select operator implementations.

use std::fmt;

/// A SQL datatype in a single-inheritance hierarchy rooted at [`ANY`].
///
/// Datatypes are compared by name. Declare custom types as `static` items
/// with a built-in parent.
pub struct DataType {
    name: &'static str,
    parent: Option<&'static DataType>,
}

impl DataType {
    /// Creates a datatype descriptor.
    #[must_use]
    pub const fn new(name: &'static str, parent: Option<&'static Self>) -> Self {
        Self { name, parent }
    }

    /// Returns the datatype name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent datatype.
    #[must_use]
    pub const fn parent(&self) -> Option<&'static Self> {
        self.parent
    }

    /// Iterates over this datatype and its ancestors, most specific first.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static Self> {
        std::iter::successors(Some(self), |ty| ty.parent)
    }

    /// Returns `true` if `self` is `other` or descends from it.
    #[must_use]
    pub fn is_a(&'static self, other: &Self) -> bool {
        self.ancestors().any(|ty| ty == other)
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DataType {}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}

/// Root of the datatype hierarchy.
pub static ANY: DataType = DataType::new("any", None);
/// Character data.
pub static TEXT: DataType = DataType::new("text", Some(&ANY));
/// JSON documents, stored as text.
pub static JSON: DataType = DataType::new("json", Some(&TEXT));
/// Any number.
pub static NUMERIC: DataType = DataType::new("numeric", Some(&ANY));
/// Whole numbers.
pub static INTEGER: DataType = DataType::new("integer", Some(&NUMERIC));
/// Truth values.
pub static BOOLEAN: DataType = DataType::new("boolean", Some(&ANY));
/// Dates and timestamps.
pub static TEMPORAL: DataType = DataType::new("temporal", Some(&ANY));
/// Raw bytes.
pub static BLOB: DataType = DataType::new("blob", Some(&ANY));
