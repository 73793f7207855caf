//! The data model: type tags, tagged values, column descriptors, and table
//! schemas.

pub mod column;
pub mod data_type;
pub mod schema;
pub mod value;

pub use column::{Column, ColumnDef, ColumnRef};
pub use data_type::DataType;
pub use schema::Table;
pub use value::{SqlType, Value};
