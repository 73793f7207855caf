//! Storage driver seam
//!
//! The engine talks to storage through these traits: a database that can run
//! queries, compile statements, and scope transactions; a compiled statement
//! with 1-based positional typed binding; and a forward-only result cursor.

pub mod cursor;
pub mod sqlite;

use crate::error::Result;
use crate::types::value::Value;

pub use cursor::{IndexCachedCursor, MaterializedCursor};
pub use sqlite::SqliteDatabase;

/// A storage connection.
///
/// Transaction scope follows the begin / set-successful / end protocol:
/// `end_transaction` commits when the scope was marked successful and rolls
/// back otherwise. Callers must not run two mutating operations concurrently
/// without external serialization.
pub trait Database: Send + Sync {
    /// Executes a read query and returns its result cursor.
    fn query(&self, sql: &str) -> Result<Box<dyn Cursor>>;

    /// Compiles a statement for repeated positional binding and execution.
    fn compile(&self, sql: &str) -> Result<Box<dyn Statement>>;

    fn begin_transaction(&self) -> Result<()>;

    fn set_transaction_successful(&self);

    fn end_transaction(&self) -> Result<()>;

    /// Runs `block` inside a transaction scope, marking it successful only
    /// when the block completes without error. The scope always ends; an
    /// unmarked scope rolls back.
    fn run_in_transaction(&self, block: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        self.begin_transaction()?;
        let result = block();
        if result.is_ok() {
            self.set_transaction_successful();
        }
        let ended = self.end_transaction();
        result.and(ended)
    }
}

/// A compiled statement with 1-based positional parameter binding.
///
/// Not safe for concurrent binding by two operations at once; the adapters
/// serialize access through an acquire/release slot.
pub trait Statement: Send {
    fn bind_null(&mut self, index: usize) -> Result<()>;
    fn bind_text(&mut self, index: usize, value: &str) -> Result<()>;
    fn bind_integer(&mut self, index: usize, value: i64) -> Result<()>;
    fn bind_real(&mut self, index: usize, value: f64) -> Result<()>;
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()>;

    /// Executes an INSERT, returning the new row id.
    fn execute_insert(&mut self) -> Result<i64>;

    /// Executes an UPDATE or DELETE, returning the number of affected rows.
    fn execute_update_delete(&mut self) -> Result<usize>;

    fn clear_bindings(&mut self);
}

/// Binds a tagged value at the given 1-based position, dispatching on its
/// storage class.
pub fn bind_value(stmt: &mut dyn Statement, index: usize, value: &Value) -> Result<()> {
    match value {
        Value::Null => stmt.bind_null(index),
        Value::Text(s) => stmt.bind_text(index, s),
        Value::Integer(i) => stmt.bind_integer(index, *i),
        Value::Real(r) => stmt.bind_real(index, *r),
        Value::Blob(b) => stmt.bind_blob(index, b),
    }
}

/// A forward-only result cursor with ordinal-indexed, null-permissive typed
/// accessors. Starts positioned before the first row.
pub trait Cursor: Send {
    /// Advances to the next row; false once the cursor is exhausted.
    fn move_to_next(&mut self) -> bool;

    /// Resolves a column name to its ordinal, if present.
    fn column_index(&self, name: &str) -> Option<usize>;

    fn get_text(&self, index: usize) -> Option<String>;
    fn get_integer(&self, index: usize) -> Option<i64>;
    fn get_real(&self, index: usize) -> Option<f64>;
    fn get_blob(&self, index: usize) -> Option<Vec<u8>>;
}
