//! The per-table execution engine
//!
//! A `Dao` owns one table's schema and its four lazily built statement
//! adapters, and exposes the read/write operations over that table. Every
//! operation is async: the blocking storage work runs on tokio's blocking
//! pool, so the calling context is never blocked and an in-flight transaction
//! always runs to completion even if the caller's future is dropped.
//!
//! Transaction scope: insert and update (single and batch) and `delete_all`
//! each run inside one transaction, marked successful only on full
//! completion, so a failing row rolls back the whole batch. Single-row
//! `delete` executes without an explicit transaction; a single statement is
//! atomic at the driver level.

use crate::adapter::{InsertionAdapter, SharedStatement, UpdateOrDeleteAdapter};
use crate::driver::Database;
use crate::error::{Error, Result};
use crate::materialize;
use crate::query::Select;
use crate::row::ColumnMap;
use crate::types::schema::Table;
use std::sync::{Arc, OnceLock};
use tokio::task;

/// The execution engine for a single table.
#[derive(Clone)]
pub struct Dao {
    inner: Arc<DaoInner>,
}

struct DaoInner {
    database: Arc<dyn Database>,
    table: Arc<Table>,
    insert_adapter: OnceLock<InsertionAdapter>,
    update_adapter: OnceLock<UpdateOrDeleteAdapter>,
    delete_adapter: OnceLock<UpdateOrDeleteAdapter>,
    delete_all_statement: OnceLock<SharedStatement>,
}

impl DaoInner {
    fn insert_adapter(&self) -> &InsertionAdapter {
        self.insert_adapter
            .get_or_init(|| InsertionAdapter::new(self.database.clone(), self.table.clone()))
    }

    fn update_adapter(&self) -> &UpdateOrDeleteAdapter {
        self.update_adapter.get_or_init(|| {
            UpdateOrDeleteAdapter::update(self.database.clone(), self.table.clone())
        })
    }

    fn delete_adapter(&self) -> &UpdateOrDeleteAdapter {
        self.delete_adapter.get_or_init(|| {
            UpdateOrDeleteAdapter::delete(self.database.clone(), self.table.clone())
        })
    }

    fn delete_all_statement(&self) -> &SharedStatement {
        self.delete_all_statement.get_or_init(|| {
            let sql = format!("DELETE FROM {}", self.table.name());
            SharedStatement::new(self.database.clone(), sql)
        })
    }
}

impl Dao {
    pub fn new(database: Arc<dyn Database>, table: Table) -> Self {
        Dao {
            inner: Arc::new(DaoInner {
                database,
                table: Arc::new(table),
                insert_adapter: OnceLock::new(),
                update_adapter: OnceLock::new(),
                delete_adapter: OnceLock::new(),
                delete_all_statement: OnceLock::new(),
            }),
        }
    }

    pub fn table(&self) -> &Table {
        &self.inner.table
    }

    /// Runs a SELECT built by the supplied query builder.
    ///
    /// Fails with [`Error::EmptyResultSet`] when the query yields zero rows.
    pub async fn select(&self, build: impl FnOnce(&mut Select)) -> Result<Vec<ColumnMap>> {
        let mut query = Select::new(&self.inner.table);
        build(&mut query);
        self.run_query(query.to_sql()).await
    }

    /// Selects every row. Same empty-result failure policy as [`select`](Self::select).
    pub async fn select_all(&self) -> Result<Vec<ColumnMap>> {
        let sql = format!("SELECT * FROM {}", self.inner.table.name());
        self.run_query(sql).await
    }

    async fn run_query(&self, sql: String) -> Result<Vec<ColumnMap>> {
        let inner = self.inner.clone();
        dispatch(move || {
            tracing::debug!(sql = %sql, "select");
            let cursor = inner.database.query(&sql)?;
            let result = materialize::to_column_maps(cursor, &inner.table);
            if result.is_empty() {
                return Err(Error::EmptyResultSet(sql));
            }
            Ok(result)
        })
        .await
    }

    /// Inserts one row inside a transaction.
    pub async fn insert(&self, row: ColumnMap) -> Result<()> {
        let inner = self.inner.clone();
        dispatch(move || {
            inner
                .database
                .run_in_transaction(&mut || inner.insert_adapter().insert(&row))
        })
        .await
    }

    /// Inserts a batch of rows inside one transaction. If any row fails,
    /// none of the batch's effects persist.
    pub async fn insert_all(&self, rows: Vec<ColumnMap>) -> Result<()> {
        let inner = self.inner.clone();
        dispatch(move || {
            tracing::debug!(table = inner.table.name(), rows = rows.len(), "insert");
            inner
                .database
                .run_in_transaction(&mut || inner.insert_adapter().insert_all(&rows))
        })
        .await
    }

    /// Updates the row matching `row`'s primary key inside a transaction.
    /// Returns the affected row count.
    pub async fn update(&self, row: ColumnMap) -> Result<usize> {
        let inner = self.inner.clone();
        dispatch(move || {
            let mut affected = 0;
            inner.database.run_in_transaction(&mut || {
                affected = inner.update_adapter().handle(&row)?;
                Ok(())
            })?;
            Ok(affected)
        })
        .await
    }

    /// Updates a batch of rows inside one transaction, with the same
    /// atomicity as [`insert_all`](Self::insert_all). Returns the total
    /// affected count.
    pub async fn update_all(&self, rows: Vec<ColumnMap>) -> Result<usize> {
        let inner = self.inner.clone();
        dispatch(move || {
            tracing::debug!(table = inner.table.name(), rows = rows.len(), "update");
            let mut affected = 0;
            inner.database.run_in_transaction(&mut || {
                affected = inner.update_adapter().handle_all(&rows)?;
                Ok(())
            })?;
            Ok(affected)
        })
        .await
    }

    /// Deletes the row matching `row`'s primary-key values. Runs as a single
    /// statement without an explicit transaction scope. Returns the affected
    /// row count.
    pub async fn delete(&self, row: ColumnMap) -> Result<usize> {
        let inner = self.inner.clone();
        dispatch(move || inner.delete_adapter().handle(&row)).await
    }

    /// Deletes every row in the table inside a transaction. The acquired
    /// statement is released on every exit path, including failure.
    pub async fn delete_all(&self) -> Result<usize> {
        let inner = self.inner.clone();
        dispatch(move || {
            tracing::debug!(table = inner.table.name(), "delete all");
            let shared = inner.delete_all_statement();
            let mut stmt = shared.acquire()?;
            inner.database.begin_transaction()?;
            let executed = stmt.execute_update_delete();
            if executed.is_ok() {
                inner.database.set_transaction_successful();
            }
            let ended = inner.database.end_transaction();
            shared.release(stmt);
            executed.and_then(|affected| ended.map(|_| affected))
        })
        .await
    }
}

/// Dispatches blocking storage work onto tokio's blocking pool.
async fn dispatch<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal(format!("blocking task failed: {}", e)))?
}
