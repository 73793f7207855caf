//! SQLite driver built on rusqlite
//!
//! The connection lives behind a mutex; statements hold the shared connection
//! handle and go through rusqlite's prepared-statement cache on execution, so
//! a compiled statement adapter pays SQL compilation once per connection.

use super::cursor::MaterializedCursor;
use super::{Cursor, Database, Statement};
use crate::error::{Error, Result};
use crate::types::value::Value;
use parking_lot::Mutex;
use rusqlite::params_from_iter;
use rusqlite::types::Value as RusqliteValue;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::sync::Arc;

#[derive(Default)]
struct TxState {
    active: bool,
    successful: bool,
}

/// A SQLite database connection.
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
    tx: Mutex<TxState>,
}

impl SqliteDatabase {
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::wrap(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::wrap(Connection::open_in_memory()?))
    }

    fn wrap(conn: Connection) -> Self {
        SqliteDatabase {
            conn: Arc::new(Mutex::new(conn)),
            tx: Mutex::new(TxState::default()),
        }
    }

    /// Executes raw SQL outside the statement layer. Intended for DDL.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(sql)?;
        Ok(())
    }
}

impl Database for SqliteDatabase {
    fn query(&self, sql: &str) -> Result<Box<dyn Cursor>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let count = columns.len();

        let mut materialized = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(count);
            for i in 0..count {
                values.push(from_value_ref(row.get_ref(i)?));
            }
            materialized.push(values);
        }

        Ok(Box::new(MaterializedCursor::new(columns, materialized)))
    }

    fn compile(&self, sql: &str) -> Result<Box<dyn Statement>> {
        // Validate eagerly so malformed SQL fails at compile time, then let
        // the statement cache hold the compiled form.
        {
            let conn = self.conn.lock();
            conn.prepare_cached(sql)?;
        }
        Ok(Box::new(SqliteStatement {
            conn: self.conn.clone(),
            sql: sql.to_string(),
            params: Vec::new(),
        }))
    }

    fn begin_transaction(&self) -> Result<()> {
        let mut tx = self.tx.lock();
        if tx.active {
            return Err(Error::Storage(
                "nested transactions are not supported".into(),
            ));
        }
        self.execute_batch("BEGIN")?;
        tx.active = true;
        tx.successful = false;
        Ok(())
    }

    fn set_transaction_successful(&self) {
        let mut tx = self.tx.lock();
        if tx.active {
            tx.successful = true;
        }
    }

    fn end_transaction(&self) -> Result<()> {
        let mut tx = self.tx.lock();
        if !tx.active {
            return Err(Error::Storage("no transaction in progress".into()));
        }
        let successful = tx.successful;
        tx.active = false;
        tx.successful = false;
        drop(tx);
        self.execute_batch(if successful { "COMMIT" } else { "ROLLBACK" })
    }
}

/// A positionally bound statement executing through the connection's
/// prepared-statement cache.
struct SqliteStatement {
    conn: Arc<Mutex<Connection>>,
    sql: String,
    params: Vec<RusqliteValue>,
}

impl SqliteStatement {
    fn set(&mut self, index: usize, value: RusqliteValue) -> Result<()> {
        if index == 0 {
            return Err(Error::Storage("bind indices are 1-based".into()));
        }
        if self.params.len() < index {
            self.params.resize(index, RusqliteValue::Null);
        }
        self.params[index - 1] = value;
        Ok(())
    }
}

impl Statement for SqliteStatement {
    fn bind_null(&mut self, index: usize) -> Result<()> {
        self.set(index, RusqliteValue::Null)
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.set(index, RusqliteValue::Text(value.to_string()))
    }

    fn bind_integer(&mut self, index: usize, value: i64) -> Result<()> {
        self.set(index, RusqliteValue::Integer(value))
    }

    fn bind_real(&mut self, index: usize, value: f64) -> Result<()> {
        self.set(index, RusqliteValue::Real(value))
    }

    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.set(index, RusqliteValue::Blob(value.to_vec()))
    }

    fn execute_insert(&mut self) -> Result<i64> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&self.sql)?;
        let rowid = stmt.insert(params_from_iter(self.params.iter().cloned()))?;
        Ok(rowid)
    }

    fn execute_update_delete(&mut self) -> Result<usize> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&self.sql)?;
        let changed = stmt.execute(params_from_iter(self.params.iter().cloned()))?;
        Ok(changed)
    }

    fn clear_bindings(&mut self) {
        self.params.clear();
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}
