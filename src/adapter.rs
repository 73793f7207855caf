//! Statement adapters
//!
//! An adapter owns one SQL operation's compiled statement and knows how to
//! bind a row container's values into its positional parameters. Adapters are
//! stateless with respect to which row they bind; only the compiled statement
//! is cached across calls, behind an acquire/release slot that serializes use.

use crate::driver::{bind_value, Database, Statement};
use crate::error::Result;
use crate::row::ColumnMap;
use crate::types::schema::Table;
use parking_lot::Mutex;
use std::sync::Arc;

/// A lazily compiled statement shared across calls.
///
/// `acquire` hands out the cached statement to at most one caller at a time;
/// a concurrent caller gets a freshly compiled statement, and `release`
/// retains only one. Callers must release on every exit path.
pub struct SharedStatement {
    database: Arc<dyn Database>,
    sql: String,
    cached: Mutex<Option<Box<dyn Statement>>>,
}

impl SharedStatement {
    pub fn new(database: Arc<dyn Database>, sql: impl Into<String>) -> Self {
        SharedStatement {
            database,
            sql: sql.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn acquire(&self) -> Result<Box<dyn Statement>> {
        if let Some(stmt) = self.cached.lock().take() {
            return Ok(stmt);
        }
        self.database.compile(&self.sql)
    }

    pub fn release(&self, mut stmt: Box<dyn Statement>) {
        stmt.clear_bindings();
        let mut slot = self.cached.lock();
        if slot.is_none() {
            *slot = Some(stmt);
        }
    }
}

/// Binds and executes whole-row INSERTs.
///
/// Binding order is the table's column order, 1-based, one position per
/// column; absent columns bind as SQL NULL.
pub struct InsertionAdapter {
    statement: SharedStatement,
    table: Arc<Table>,
}

impl InsertionAdapter {
    pub fn new(database: Arc<dyn Database>, table: Arc<Table>) -> Self {
        let sql = table.insert_sql().to_string();
        InsertionAdapter {
            statement: SharedStatement::new(database, sql),
            table,
        }
    }

    fn bind(table: &Table, stmt: &mut dyn Statement, row: &ColumnMap) -> Result<()> {
        for (index, column) in table.columns().iter().enumerate() {
            bind_value(stmt, index + 1, &row.value(column))?;
        }
        Ok(())
    }

    pub fn insert(&self, row: &ColumnMap) -> Result<()> {
        let mut stmt = self.statement.acquire()?;
        let result = Self::bind(&self.table, stmt.as_mut(), row)
            .and_then(|_| stmt.execute_insert())
            .map(|_| ());
        self.statement.release(stmt);
        result
    }

    pub fn insert_all(&self, rows: &[ColumnMap]) -> Result<()> {
        let mut stmt = self.statement.acquire()?;
        let mut result = Ok(());
        for row in rows {
            result = Self::bind(&self.table, stmt.as_mut(), row)
                .and_then(|_| stmt.execute_insert())
                .map(|_| ());
            if result.is_err() {
                break;
            }
        }
        self.statement.release(stmt);
        result
    }
}

/// Which whole-row write a [`UpdateOrDeleteAdapter`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Update,
    Delete,
}

/// Binds and executes whole-row UPDATEs or primary-key DELETEs.
///
/// Update binding order: every column in table order (the SET list), then the
/// primary-key columns in their table-order subsequence (the WHERE
/// predicate). Delete binding order: primary-key columns only, in table
/// order. Both match the placeholder order of the table's precomputed SQL.
pub struct UpdateOrDeleteAdapter {
    statement: SharedStatement,
    table: Arc<Table>,
    kind: WriteKind,
}

impl UpdateOrDeleteAdapter {
    pub fn update(database: Arc<dyn Database>, table: Arc<Table>) -> Self {
        let sql = table.update_sql().to_string();
        UpdateOrDeleteAdapter {
            statement: SharedStatement::new(database, sql),
            table,
            kind: WriteKind::Update,
        }
    }

    pub fn delete(database: Arc<dyn Database>, table: Arc<Table>) -> Self {
        let sql = table.delete_sql().to_string();
        UpdateOrDeleteAdapter {
            statement: SharedStatement::new(database, sql),
            table,
            kind: WriteKind::Delete,
        }
    }

    fn bind(&self, stmt: &mut dyn Statement, row: &ColumnMap) -> Result<()> {
        let mut index = 0;
        if self.kind == WriteKind::Update {
            for column in self.table.columns() {
                index += 1;
                bind_value(stmt, index, &row.value(column))?;
            }
        }
        for column in self.table.primary_key_columns() {
            index += 1;
            bind_value(stmt, index, &row.value(column))?;
        }
        Ok(())
    }

    /// Executes the write for one row, returning the affected row count.
    pub fn handle(&self, row: &ColumnMap) -> Result<usize> {
        let mut stmt = self.statement.acquire()?;
        let result = self
            .bind(stmt.as_mut(), row)
            .and_then(|_| stmt.execute_update_delete());
        self.statement.release(stmt);
        result
    }

    /// Executes the write once per row, returning the total affected count.
    pub fn handle_all(&self, rows: &[ColumnMap]) -> Result<usize> {
        let mut stmt = self.statement.acquire()?;
        let mut total = 0;
        let mut result = Ok(());
        for row in rows {
            match self
                .bind(stmt.as_mut(), row)
                .and_then(|_| stmt.execute_update_delete())
            {
                Ok(changed) => total += changed,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.statement.release(stmt);
        result.map(|_| total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SqliteDatabase;
    use crate::types::column::Column;

    fn setup() -> (Arc<dyn Database>, Arc<Table>, Column<i64>, Column<String>) {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        let id = Column::integer("id").primary_key();
        let name = Column::text("name");
        let table = Table::new("users", vec![id.erased(), name.erased()]).unwrap();
        (Arc::new(db), Arc::new(table), id, name)
    }

    fn row(id: &Column<i64>, name: &Column<String>, key: i64, value: &str) -> ColumnMap {
        let mut row = ColumnMap::new();
        row.set(id, Some(key));
        row.set(name, Some(value.to_string()));
        row
    }

    #[test]
    fn test_insert_then_update_then_delete() {
        let (db, table, id, name) = setup();

        let inserts = InsertionAdapter::new(db.clone(), table.clone());
        inserts.insert(&row(&id, &name, 1, "Ann")).unwrap();
        inserts
            .insert_all(&[row(&id, &name, 2, "Bob"), row(&id, &name, 3, "Eve")])
            .unwrap();

        let updates = UpdateOrDeleteAdapter::update(db.clone(), table.clone());
        assert_eq!(updates.handle(&row(&id, &name, 2, "Robert")).unwrap(), 1);

        let deletes = UpdateOrDeleteAdapter::delete(db.clone(), table.clone());
        let mut key_only = ColumnMap::new();
        key_only.set(&id, Some(3));
        assert_eq!(deletes.handle(&key_only).unwrap(), 1);

        let mut cursor = db.query("SELECT name FROM users ORDER BY id").unwrap();
        let mut names = Vec::new();
        while cursor.move_to_next() {
            names.push(cursor.get_text(0).unwrap());
        }
        assert_eq!(names, vec!["Ann".to_string(), "Robert".to_string()]);
    }

    #[test]
    fn test_update_misses_unknown_key() {
        let (db, table, id, name) = setup();
        let updates = UpdateOrDeleteAdapter::update(db, table);
        assert_eq!(updates.handle(&row(&id, &name, 99, "Ghost")).unwrap(), 0);
    }

    #[test]
    fn test_failed_insert_releases_statement() {
        let (db, table, id, name) = setup();
        let inserts = InsertionAdapter::new(db, table);
        inserts.insert(&row(&id, &name, 1, "Ann")).unwrap();

        // Duplicate primary key fails, then the adapter must still work.
        assert!(inserts.insert(&row(&id, &name, 1, "Dup")).is_err());
        inserts.insert(&row(&id, &name, 2, "Bob")).unwrap();
    }
}
