use async_trait::async_trait;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::types::{Record, RecordId};

/// Static description of one table: its name, writable columns and the
/// unique keys the schema enforces.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    /// Columns a write may set. `id` is generated and never listed.
    pub columns: &'static [&'static str],
    pub unique: &'static [&'static [&'static str]],
}

impl Table {
    /// Keep only writable columns of `record`
    pub fn writable(&self, record: &Record) -> Vec<(&'static str, Value)> {
        self.columns
            .iter()
            .filter_map(|column| record.get(*column).map(|value| (*column, value.clone())))
            .collect()
    }
}

/// Equality filter for listing queries
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Id(RecordId),
    Text(String),
}

impl Lookup {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Lookup::Id(id), Some(v)) => v.as_i64() == Some(*id),
            (Lookup::Text(text), Some(Value::String(s))) => s == text,
            _ => false,
        }
    }
}

/// Single-statement storage primitives. Every call acquires and releases its
/// own connection; nothing here spans more than one statement.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert and return the generated id
    async fn insert(&self, table: &Table, record: &Record) -> Result<RecordId, DatabaseError>;

    async fn fetch(&self, table: &Table, id: RecordId) -> Result<Option<Record>, DatabaseError>;

    /// Overwrite the writable columns present in `record`; false if no row matched
    async fn replace(&self, table: &Table, id: RecordId, record: &Record) -> Result<bool, DatabaseError>;

    /// Hard delete; false if no row matched
    async fn delete(&self, table: &Table, id: RecordId) -> Result<bool, DatabaseError>;

    /// All rows where `column` equals `value`, ordered by id
    async fn find_by(&self, table: &Table, column: &'static str, value: Lookup) -> Result<Vec<Record>, DatabaseError>;

    /// All rows of a table, ordered by id
    async fn list(&self, table: &Table) -> Result<Vec<Record>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
