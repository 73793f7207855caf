//! Typed row binding and per-table statement execution over SQLite.
//!
//! This crate lets a caller read and write rows of a relational table through
//! a statically-typed, schema-aware value container instead of raw positional
//! SQL parameters and untyped result cursors:
//!
//! - [`ColumnMap`] holds one row's values keyed by [`Column`] descriptors,
//!   preserving each column's static value type through access.
//! - [`Dao`] orchestrates lazily built prepared-statement adapters per table,
//!   binds container values into correct parameter positions, scopes
//!   transactions, and materializes result rows back into typed containers.
//!
//! One table per engine instance; the primary key is used verbatim for
//! UPDATE/DELETE predicates. Reads treat an empty result set as an error
//! ([`Error::EmptyResultSet`]), not as an empty collection.

pub mod adapter;
pub mod dao;
pub mod driver;
pub mod error;
pub mod query;
pub mod row;
pub mod types;

mod materialize;

pub use dao::Dao;
pub use driver::{Cursor, Database, SqliteDatabase, Statement};
pub use error::{Error, Result};
pub use query::{Direction, Predicate, Select};
pub use row::ColumnMap;
pub use types::{Column, ColumnDef, ColumnRef, DataType, SqlType, Table, Value};
