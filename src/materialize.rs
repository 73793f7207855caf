//! Result materialization
//!
//! Converts a raw result cursor into row containers using the table's column
//! type tags. The cursor is wrapped in an index cache so each column name is
//! resolved to its ordinal once for the whole result set.

use crate::driver::{Cursor, IndexCachedCursor};
use crate::row::ColumnMap;
use crate::types::data_type::DataType;
use crate::types::schema::Table;
use crate::types::value::Value;

/// Drains the cursor into one `ColumnMap` per row, in cursor order.
///
/// Each schema column is read with the accessor matching its declared tag,
/// null-permissive: an absent or null cursor value is stored as `Value::Null`.
pub(crate) fn to_column_maps(cursor: Box<dyn Cursor>, table: &Table) -> Vec<ColumnMap> {
    let mut cursor = IndexCachedCursor::new(cursor);
    let mut result = Vec::new();
    while cursor.move_to_next() {
        let mut row = ColumnMap::new();
        for column in table.columns() {
            let value = match column.data_type() {
                DataType::Text => cursor.get_text(column.name()).map(Value::Text),
                DataType::Integer => cursor.get_integer(column.name()).map(Value::Integer),
                DataType::Real => cursor.get_real(column.name()).map(Value::Real),
                DataType::Blob => cursor.get_blob(column.name()).map(Value::Blob),
            };
            row.insert_value(column.clone(), value.unwrap_or(Value::Null));
        }
        result.push(row);
    }
    result
}
