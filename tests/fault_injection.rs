//! Fault-injection tests for transaction scoping and statement release
//!
//! A mock driver records the transaction protocol calls and how many
//! statements were compiled, and can be told to fail statement execution.
//! Statement-release behavior is observable through the compile count: a
//! released statement is reused, so a second operation must not recompile.

use parking_lot::Mutex;
use rowbind::driver::MaterializedCursor;
use rowbind::{
    Column, ColumnMap, Cursor, Dao, Database, Error, Result, Statement, Table,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    compiles: AtomicUsize,
    executes: AtomicUsize,
    begins: AtomicUsize,
    successes: AtomicUsize,
    ends: AtomicUsize,
    /// Execution attempts (1-based) that should fail.
    fail_from_execute: Mutex<Option<usize>>,
}

impl MockState {
    fn fail_from(&self, attempt: usize) {
        *self.fail_from_execute.lock() = Some(attempt);
    }

    fn next_execute(&self) -> Result<()> {
        let attempt = self.executes.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(from) = *self.fail_from_execute.lock() {
            if attempt >= from {
                return Err(Error::Storage("injected execute failure".into()));
            }
        }
        Ok(())
    }
}

struct MockDatabase {
    state: Arc<MockState>,
    in_tx: AtomicBool,
}

impl MockDatabase {
    fn new(state: Arc<MockState>) -> Self {
        MockDatabase {
            state,
            in_tx: AtomicBool::new(false),
        }
    }
}

impl Database for MockDatabase {
    fn query(&self, _sql: &str) -> Result<Box<dyn Cursor>> {
        Ok(Box::new(MaterializedCursor::new(vec![], vec![])))
    }

    fn compile(&self, _sql: &str) -> Result<Box<dyn Statement>> {
        self.state.compiles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStatement {
            state: self.state.clone(),
        }))
    }

    fn begin_transaction(&self) -> Result<()> {
        assert!(
            !self.in_tx.swap(true, Ordering::SeqCst),
            "nested transaction"
        );
        self.state.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_transaction_successful(&self) {
        self.state.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn end_transaction(&self) -> Result<()> {
        assert!(self.in_tx.swap(false, Ordering::SeqCst), "no transaction");
        self.state.ends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockStatement {
    state: Arc<MockState>,
}

impl Statement for MockStatement {
    fn bind_null(&mut self, _index: usize) -> Result<()> {
        Ok(())
    }

    fn bind_text(&mut self, _index: usize, _value: &str) -> Result<()> {
        Ok(())
    }

    fn bind_integer(&mut self, _index: usize, _value: i64) -> Result<()> {
        Ok(())
    }

    fn bind_real(&mut self, _index: usize, _value: f64) -> Result<()> {
        Ok(())
    }

    fn bind_blob(&mut self, _index: usize, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn execute_insert(&mut self) -> Result<i64> {
        self.state.next_execute().map(|_| 1)
    }

    fn execute_update_delete(&mut self) -> Result<usize> {
        self.state.next_execute().map(|_| 1)
    }

    fn clear_bindings(&mut self) {}
}

struct Fixture {
    state: Arc<MockState>,
    id: Column<i64>,
    name: Column<String>,
    dao: Dao,
}

fn fixture() -> Fixture {
    let state = Arc::new(MockState::default());
    let database = Arc::new(MockDatabase::new(state.clone()));
    let id = Column::integer("id").primary_key();
    let name = Column::text("name");
    let table = Table::new("users", vec![id.erased(), name.erased()]).unwrap();
    let dao = Dao::new(database, table);
    Fixture {
        state,
        id,
        name,
        dao,
    }
}

fn row(f: &Fixture, id: i64) -> ColumnMap {
    let mut row = ColumnMap::new();
    row.set(&f.id, Some(id));
    row.set(&f.name, Some(format!("user{}", id)));
    row
}

#[tokio::test]
async fn test_delete_all_releases_statement_on_failure() {
    let f = fixture();
    f.state.fail_from(1);

    let result = f.dao.delete_all().await;
    assert!(matches!(result, Err(Error::Storage(_))));

    // The failed transaction ended without being marked successful.
    assert_eq!(f.state.begins.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.successes.load(Ordering::SeqCst), 0);
    assert_eq!(f.state.ends.load(Ordering::SeqCst), 1);

    // The statement was released back: the retry reuses it.
    f.state.fail_from_execute.lock().take();
    assert_eq!(f.dao.delete_all().await.unwrap(), 1);
    assert_eq!(f.state.compiles.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.successes.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.ends.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_batch_insert_failure_leaves_transaction_unmarked() {
    let f = fixture();
    // First row inserts, second fails mid-batch.
    f.state.fail_from(2);

    let result = f.dao.insert_all(vec![row(&f, 1), row(&f, 2), row(&f, 3)]).await;
    assert!(matches!(result, Err(Error::Storage(_))));

    // Rollback path: begin and end, never marked successful, and the third
    // row was never attempted.
    assert_eq!(f.state.begins.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.successes.load(Ordering::SeqCst), 0);
    assert_eq!(f.state.ends.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.executes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_successful_batch_marks_transaction() {
    let f = fixture();
    f.dao.insert_all(vec![row(&f, 1), row(&f, 2)]).await.unwrap();

    assert_eq!(f.state.begins.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.successes.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.ends.load(Ordering::SeqCst), 1);
    assert_eq!(f.state.executes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_single_delete_opens_no_transaction() {
    let f = fixture();
    assert_eq!(f.dao.delete(row(&f, 1)).await.unwrap(), 1);

    assert_eq!(f.state.begins.load(Ordering::SeqCst), 0);
    assert_eq!(f.state.ends.load(Ordering::SeqCst), 0);
    assert_eq!(f.state.executes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_adapters_compile_once_across_calls() {
    let f = fixture();
    for i in 0..5 {
        f.dao.insert(row(&f, i)).await.unwrap();
        f.dao.update(row(&f, i)).await.unwrap();
    }

    // One insertion statement plus one update statement.
    assert_eq!(f.state.compiles.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_query_reports_executed_sql() {
    let f = fixture();
    match f.dao.select_all().await {
        Err(Error::EmptyResultSet(sql)) => assert_eq!(sql, "SELECT * FROM users"),
        other => panic!("expected EmptyResultSet, got {:?}", other),
    }
}
