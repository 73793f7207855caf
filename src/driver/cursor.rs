//! Cursor implementations
//!
//! `MaterializedCursor` is a driver-agnostic cursor over fully materialized
//! rows. `IndexCachedCursor` decorates any cursor with name-indexed accessors
//! that resolve each column name to its ordinal once and reuse the ordinal
//! for every row.

use super::Cursor;
use crate::types::value::Value;
use std::collections::HashMap;

/// A forward-only cursor over rows materialized at query time.
pub struct MaterializedCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    /// None before the first `move_to_next`.
    position: Option<usize>,
}

impl MaterializedCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        MaterializedCursor {
            columns,
            rows,
            position: None,
        }
    }

    fn current(&self) -> Option<&Vec<Value>> {
        self.position.and_then(|p| self.rows.get(p))
    }

    fn value_at(&self, index: usize) -> Option<&Value> {
        self.current().and_then(|row| row.get(index))
    }
}

impl Cursor for MaterializedCursor {
    fn move_to_next(&mut self) -> bool {
        let next = self.position.map(|p| p + 1).unwrap_or(0);
        self.position = Some(next);
        next < self.rows.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn get_text(&self, index: usize) -> Option<String> {
        match self.value_at(index) {
            Some(Value::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn get_integer(&self, index: usize) -> Option<i64> {
        match self.value_at(index) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    fn get_real(&self, index: usize) -> Option<f64> {
        match self.value_at(index) {
            Some(Value::Real(r)) => Some(*r),
            // SQLite may store an integral REAL column value as an integer.
            Some(Value::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    fn get_blob(&self, index: usize) -> Option<Vec<u8>> {
        match self.value_at(index) {
            Some(Value::Blob(b)) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Decorator caching column-name to ordinal resolution across rows.
///
/// The underlying cursor resolves a name on every access; over many rows that
/// repeated lookup dominates, so each name is resolved exactly once here
/// (misses included).
pub struct IndexCachedCursor {
    inner: Box<dyn Cursor>,
    indices: HashMap<String, Option<usize>>,
}

impl IndexCachedCursor {
    pub fn new(inner: Box<dyn Cursor>) -> Self {
        IndexCachedCursor {
            inner,
            indices: HashMap::new(),
        }
    }

    pub fn move_to_next(&mut self) -> bool {
        self.inner.move_to_next()
    }

    fn index_of(&mut self, name: &str) -> Option<usize> {
        if let Some(cached) = self.indices.get(name) {
            return *cached;
        }
        let index = self.inner.column_index(name);
        self.indices.insert(name.to_string(), index);
        index
    }

    pub fn get_text(&mut self, name: &str) -> Option<String> {
        self.index_of(name).and_then(|i| self.inner.get_text(i))
    }

    pub fn get_integer(&mut self, name: &str) -> Option<i64> {
        self.index_of(name).and_then(|i| self.inner.get_integer(i))
    }

    pub fn get_real(&mut self, name: &str) -> Option<f64> {
        self.index_of(name).and_then(|i| self.inner.get_real(i))
    }

    pub fn get_blob(&mut self, name: &str) -> Option<Vec<u8>> {
        self.index_of(name).and_then(|i| self.inner.get_blob(i))
    }
}
