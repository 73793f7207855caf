//! Select query builder
//!
//! Produces the SELECT text consumed by the execution engine. The builder is
//! deliberately small: a predicate tree over single-table columns, ordering,
//! limit, and offset. Values are rendered as escaped SQL literals.

use crate::types::column::{Column, ColumnRef};
use crate::types::schema::Table;
use crate::types::value::{SqlType, Value};
use std::fmt;

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => write!(f, "ASC"),
            Direction::Descending => write!(f, "DESC"),
        }
    }
}

/// A predicate over a single table's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(ColumnRef, CompareOp, Value),
    Like(ColumnRef, String),
    Between(ColumnRef, Value, Value),
    IsNull(ColumnRef),
    IsNotNull(ColumnRef),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    fn to_sql(&self) -> String {
        match self {
            Predicate::Compare(column, op, value) => {
                format!("{} {} {}", column.name(), op.symbol(), value.to_sql_literal())
            }
            Predicate::Like(column, pattern) => {
                format!(
                    "{} LIKE {}",
                    column.name(),
                    Value::Text(pattern.clone()).to_sql_literal()
                )
            }
            Predicate::Between(column, low, high) => format!(
                "{} BETWEEN {} AND {}",
                column.name(),
                low.to_sql_literal(),
                high.to_sql_literal()
            ),
            Predicate::IsNull(column) => format!("{} IS NULL", column.name()),
            Predicate::IsNotNull(column) => format!("{} IS NOT NULL", column.name()),
            Predicate::And(a, b) => format!("({} AND {})", a.to_sql(), b.to_sql()),
            Predicate::Or(a, b) => format!("({} OR {})", a.to_sql(), b.to_sql()),
            Predicate::Not(p) => format!("NOT ({})", p.to_sql()),
        }
    }
}

impl<T: SqlType> Column<T> {
    pub fn eq(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(&self, value: impl Into<T>) -> Predicate {
        self.compare(CompareOp::Ge, value)
    }

    pub fn between(&self, low: impl Into<T>, high: impl Into<T>) -> Predicate {
        Predicate::Between(
            self.erased(),
            low.into().into_value(),
            high.into().into_value(),
        )
    }

    pub fn is_null(&self) -> Predicate {
        Predicate::IsNull(self.erased())
    }

    pub fn is_not_null(&self) -> Predicate {
        Predicate::IsNotNull(self.erased())
    }

    fn compare(&self, op: CompareOp, value: impl Into<T>) -> Predicate {
        Predicate::Compare(self.erased(), op, value.into().into_value())
    }
}

impl Column<String> {
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like(self.erased(), pattern.into())
    }
}

/// Builder for a single-table SELECT.
#[derive(Debug, Clone)]
pub struct Select {
    from: String,
    predicate: Option<Predicate>,
    order_by: Vec<(ColumnRef, Direction)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub(crate) fn new(table: &Table) -> Self {
        Select {
            from: table.name().to_string(),
            predicate: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Adds a predicate, AND-combined with any existing one.
    pub fn filter(&mut self, predicate: Predicate) -> &mut Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn order_by<T: SqlType>(&mut self, column: &Column<T>, direction: Direction) -> &mut Self {
        self.order_by.push((column.erased(), direction));
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn to_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", self.from);
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.to_sql());
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column.name(), direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }
}
