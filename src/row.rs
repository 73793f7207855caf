//! The typed row container
//!
//! `ColumnMap` holds one row's values keyed by column descriptor. Access
//! through a typed `Column<T>` handle preserves the column's static value
//! type: the map stores tagged `Value`s, and the typed accessors perform a
//! checked match against the handle's type.

use crate::error::{Error, Result};
use crate::types::column::{Column, ColumnRef};
use crate::types::value::{SqlType, Value};
use std::collections::HashMap;

/// A row's values keyed by column descriptor.
///
/// A missing key and a present-but-null value are both observable as "null"
/// via [`is_null`](Self::is_null); only [`get_value`](Self::get_value)
/// distinguishes by failing. Equality is structural over the full mapping.
/// Iteration order is implementation-defined and not a contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    values: HashMap<ColumnRef, Value>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no value or an explicit null is stored for the column.
    pub fn is_null<T: SqlType>(&self, column: &Column<T>) -> bool {
        matches!(
            self.values.get(&column.erased()),
            None | Some(Value::Null)
        )
    }

    /// The stored value for the column, or `None` when absent, null, or of a
    /// mismatched tag. Never fails.
    pub fn get<T: SqlType>(&self, column: &Column<T>) -> Option<T> {
        self.values
            .get(&column.erased())
            .and_then(T::from_value)
    }

    /// The stored value for the column; fails when absent or null, naming
    /// the offending column.
    pub fn get_value<T: SqlType>(&self, column: &Column<T>) -> Result<T> {
        self.get(column)
            .ok_or_else(|| Error::MissingOrNullValue(column.name().to_string()))
    }

    /// Stores (or clears, if `None`) the value for the column, overwriting
    /// any prior value.
    pub fn set<T: SqlType>(&mut self, column: &Column<T>, value: Option<T>) {
        let value = value.map(T::into_value).unwrap_or(Value::Null);
        self.values.insert(column.erased(), value);
    }

    /// Visits every stored (column, value) pair.
    pub fn for_each(&self, mut action: impl FnMut(&ColumnRef, &Value)) {
        for (column, value) in &self.values {
            action(column, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The tagged value stored for a column, `Value::Null` when absent.
    /// This is the binding-side view used by the statement adapters.
    pub fn value(&self, column: &ColumnRef) -> Value {
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    /// Stores a tagged value directly. Used by the result materializer,
    /// which reads values with the accessor matching each column's tag.
    pub fn insert_value(&mut self, column: ColumnRef, value: Value) {
        self.values.insert(column, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let id = Column::integer("id");
        let name = Column::text("name");

        let mut row = ColumnMap::new();
        row.set(&id, Some(1));
        row.set(&name, Some("Ann".to_string()));

        assert_eq!(row.get(&id), Some(1));
        assert_eq!(row.get(&name), Some("Ann".to_string()));
        assert!(!row.is_null(&id));
        assert_eq!(row.get_value(&id).unwrap(), 1);
    }

    #[test]
    fn test_missing_and_explicit_null() {
        let name = Column::text("name");
        let score = Column::real("score");

        let mut row = ColumnMap::new();
        row.set(&name, None);

        // Explicit null
        assert!(row.is_null(&name));
        assert_eq!(row.get(&name), None);
        assert_eq!(
            row.get_value(&name),
            Err(Error::MissingOrNullValue("name".into()))
        );

        // Never set
        assert!(row.is_null(&score));
        assert_eq!(row.get(&score), None);
        assert_eq!(
            row.get_value(&score),
            Err(Error::MissingOrNullValue("score".into()))
        );
    }

    #[test]
    fn test_overwrite() {
        let id = Column::integer("id");
        let mut row = ColumnMap::new();
        row.set(&id, Some(1));
        row.set(&id, Some(2));
        assert_eq!(row.get(&id), Some(2));
        assert_eq!(row.len(), 1);

        row.set(&id, None);
        assert!(row.is_null(&id));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_structural_equality() {
        let id = Column::integer("id");
        let name = Column::text("name");

        let mut a = ColumnMap::new();
        a.set(&id, Some(1));
        a.set(&name, Some("Ann".to_string()));

        let mut b = ColumnMap::new();
        b.set(&name, Some("Ann".to_string()));
        b.set(&id, Some(1));

        assert_eq!(a, b);

        b.set(&name, Some("Anna".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_for_each_visits_all() {
        let id = Column::integer("id");
        let name = Column::text("name");
        let mut row = ColumnMap::new();
        row.set(&id, Some(1));
        row.set(&name, None);

        let mut visited = Vec::new();
        row.for_each(|column, value| visited.push((column.name().to_string(), value.clone())));
        visited.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            visited,
            vec![
                ("id".to_string(), Value::Integer(1)),
                ("name".to_string(), Value::Null),
            ]
        );
    }
}
