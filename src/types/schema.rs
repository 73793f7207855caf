//! Table schema
//!
//! A table is the name, the ordered column list, and the three precomputed
//! whole-row SQL statements. Tables can't change after they are created.
//!
//! The column order in `columns` is the authoritative positional-binding
//! order for every statement adapter, and the placeholder order baked into
//! the precomputed SQL matches it exactly:
//! - insert: all columns in table order
//! - update: all columns in table order (SET list), then the primary-key
//!   columns in table order (WHERE predicate)
//! - delete: primary-key columns only, in table order

use super::column::ColumnRef;
use crate::error::{Error, Result};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<ColumnRef>,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl Table {
    /// Creates a table schema, precomputing the whole-row SQL text.
    ///
    /// At least one column must be flagged as primary key: the update and
    /// delete statements use the primary-key columns verbatim as their WHERE
    /// predicate. Composite keys are supported.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnRef>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidSchema("table name cannot be empty".into()));
        }
        if columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "table {} must have at least one column",
                name
            )));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column {} in table {}",
                    column.name(),
                    name
                )));
            }
        }

        if !columns.iter().any(|c| c.is_primary_key()) {
            return Err(Error::InvalidSchema(format!(
                "table {} must have at least one primary key column",
                name
            )));
        }

        let insert_sql = build_insert_sql(&name, &columns);
        let update_sql = build_update_sql(&name, &columns);
        let delete_sql = build_delete_sql(&name, &columns);

        Ok(Table {
            name,
            columns,
            insert_sql,
            update_sql,
            delete_sql,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    /// The primary-key columns in their table-order subsequence.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}

fn build_insert_sql(name: &str, columns: &[ColumnRef]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        name,
        names.join(", "),
        placeholders.join(", ")
    )
}

fn build_update_sql(name: &str, columns: &[ColumnRef]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = ?", c.name()))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {}",
        name,
        assignments.join(", "),
        primary_key_predicate(columns)
    )
}

fn build_delete_sql(name: &str, columns: &[ColumnRef]) -> String {
    format!("DELETE FROM {} WHERE {}", name, primary_key_predicate(columns))
}

fn primary_key_predicate(columns: &[ColumnRef]) -> String {
    let predicates: Vec<String> = columns
        .iter()
        .filter(|c| c.is_primary_key())
        .map(|c| format!("{} = ?", c.name()))
        .collect();
    predicates.join(" AND ")
}
