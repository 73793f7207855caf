//! Column descriptors
//!
//! A column descriptor is immutable schema metadata: name, storage class tag,
//! and primary-key flag. The typed handle `Column<T>` carries the Rust value
//! type statically; `ColumnRef` is the type-erased form used for map keying
//! and positional binding.

use super::data_type::DataType;
use super::value::SqlType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The descriptor proper. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
}

/// A typed handle to a column descriptor.
///
/// The type parameter ties the column to its Rust value type, so container
/// reads and writes through the handle preserve the column's static type.
pub struct Column<T: SqlType> {
    def: Arc<ColumnDef>,
    _type: PhantomData<fn() -> T>,
}

impl Column<String> {
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_type(name, DataType::Text)
    }
}

impl Column<i64> {
    pub fn integer(name: impl Into<String>) -> Self {
        Self::with_type(name, DataType::Integer)
    }
}

impl Column<f64> {
    pub fn real(name: impl Into<String>) -> Self {
        Self::with_type(name, DataType::Real)
    }
}

impl Column<Vec<u8>> {
    pub fn blob(name: impl Into<String>) -> Self {
        Self::with_type(name, DataType::Blob)
    }
}

impl<T: SqlType> Column<T> {
    fn with_type(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            def: Arc::new(ColumnDef {
                name: name.into(),
                data_type,
                primary_key: false,
            }),
            _type: PhantomData,
        }
    }

    /// Marks the column as part of the primary key. Builder-style, applied
    /// at schema-definition time before the descriptor is shared.
    pub fn primary_key(self) -> Self {
        let mut def = (*self.def).clone();
        def.primary_key = true;
        Column {
            def: Arc::new(def),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn data_type(&self) -> DataType {
        self.def.data_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.def.primary_key
    }

    /// The type-erased form of this column, sharing the same descriptor.
    pub fn erased(&self) -> ColumnRef {
        ColumnRef(self.def.clone())
    }
}

impl<T: SqlType> Clone for Column<T> {
    fn clone(&self) -> Self {
        Column {
            def: self.def.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: SqlType> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.def.name)
            .field("data_type", &self.def.data_type)
            .field("primary_key", &self.def.primary_key)
            .finish()
    }
}

/// A type-erased column descriptor handle, usable as a map key across row
/// containers. Equality and hashing follow the descriptor contents, which are
/// immutable, so the key is stable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef(Arc<ColumnDef>);

impl ColumnRef {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn data_type(&self) -> DataType {
        self.0.data_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.0.primary_key
    }

    pub fn def(&self) -> &ColumnDef {
        &self.0
    }
}

impl<T: SqlType> From<&Column<T>> for ColumnRef {
    fn from(column: &Column<T>) -> Self {
        column.erased()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_construction() {
        let id = Column::integer("id").primary_key();
        assert_eq!(id.name(), "id");
        assert_eq!(id.data_type(), DataType::Integer);
        assert!(id.is_primary_key());

        let name = Column::text("name");
        assert!(!name.is_primary_key());
        assert_eq!(name.data_type(), DataType::Text);
    }

    #[test]
    fn test_erased_identity() {
        let id = Column::integer("id").primary_key();
        let a = id.erased();
        let b = id.clone().erased();
        assert_eq!(a, b);

        let other = Column::integer("id");
        // Same name, different primary-key flag: distinct descriptors.
        assert_ne!(a, other.erased());
    }
}
