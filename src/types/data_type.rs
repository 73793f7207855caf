//! SQLite storage classes used as column type tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared storage class of a column. Every column carries exactly one
/// tag, and the tag drives both result materialization and checked access on
/// the row container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Text,
    Integer,
    Real,
    Blob,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Text => write!(f, "TEXT"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Real => write!(f, "REAL"),
            DataType::Blob => write!(f, "BLOB"),
        }
    }
}
