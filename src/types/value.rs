//! Tagged column values
//!
//! A closed variant enum backs the heterogeneous row container: the container
//! stores `Value`s, and typed access performs a checked match against the
//! column's declared tag rather than an unchecked cast.

use super::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value, tagged by storage class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The storage class of a non-null value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Text(_) => Some(DataType::Text),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Real(_) => Some(DataType::Real),
            Value::Blob(_) => Some(DataType::Blob),
        }
    }

    /// Renders the value as a SQL literal, escaping as needed.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".into(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => format!("{:?}", r),
            Value::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
                format!("X'{}'", hex)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql_literal())
    }
}

/// Rust types that map to a column storage class.
///
/// Conversions are checked: `from_value` returns `None` on a null or on a
/// tag mismatch, never panicking and never coercing.
pub trait SqlType: Sized + Send + 'static {
    const DATA_TYPE: DataType;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

impl SqlType for String {
    const DATA_TYPE: DataType = DataType::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl SqlType for i64 {
    const DATA_TYPE: DataType = DataType::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl SqlType for f64 {
    const DATA_TYPE: DataType = DataType::Real;

    fn into_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl SqlType for Vec<u8> {
    const DATA_TYPE: DataType = DataType::Blob;

    fn into_value(self) -> Value {
        Value::Blob(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(b) => Some(b.clone()),
            _ => None,
        }
    }
}
