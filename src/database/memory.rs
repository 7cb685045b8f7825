use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{Record, RecordId};

#[derive(Debug, Default)]
struct MemTable {
    next_id: RecordId,
    rows: BTreeMap<RecordId, Record>,
}

/// In-process store with the same statement semantics as [`PgStore`]:
/// generated ids start at 1, writes only touch writable columns and unique
/// keys are enforced. Used by the test-suite and `serve --in-memory`.
///
/// [`PgStore`]: crate::database::postgres::PgStore
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, MemTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn unique_conflict(table: &Table, rows: &BTreeMap<RecordId, Record>, candidate: &Record, skip: Option<RecordId>) -> Option<String> {
        for key in table.unique {
            let values: Option<Vec<&Value>> = key
                .iter()
                .map(|column| candidate.get(*column).filter(|v| !v.is_null()))
                .collect();
            let Some(values) = values else { continue };

            let clash = rows.iter().any(|(id, row)| {
                Some(*id) != skip
                    && key
                        .iter()
                        .zip(values.iter())
                        .all(|(column, value)| row.get(*column) == Some(*value))
            });
            if clash {
                return Some(format!("{}_{}_key", table.name, key.join("_")));
            }
        }
        None
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: &Table, record: &Record) -> Result<RecordId, DatabaseError> {
        let mut tables = self.tables.write().await;
        let mem = tables.entry(table.name).or_default();

        let mut row: Record = table.writable(record).into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        if let Some(constraint) = Self::unique_conflict(table, &mem.rows, &row, None) {
            return Err(DatabaseError::UniqueViolation(constraint));
        }

        mem.next_id += 1;
        let id = mem.next_id;
        row.insert("id".to_string(), Value::from(id));
        mem.rows.insert(id, row);
        Ok(id)
    }

    async fn fetch(&self, table: &Table, id: RecordId) -> Result<Option<Record>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table.name).and_then(|mem| mem.rows.get(&id)).cloned())
    }

    async fn replace(&self, table: &Table, id: RecordId, record: &Record) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(mem) = tables.get_mut(table.name) else {
            return Ok(false);
        };
        let Some(existing) = mem.rows.get(&id) else {
            return Ok(false);
        };

        let mut updated = existing.clone();
        for (column, value) in table.writable(record) {
            updated.insert(column.to_string(), value);
        }
        if let Some(constraint) = Self::unique_conflict(table, &mem.rows, &updated, Some(id)) {
            return Err(DatabaseError::UniqueViolation(constraint));
        }

        mem.rows.insert(id, updated);
        Ok(true)
    }

    async fn delete(&self, table: &Table, id: RecordId) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table.name)
            .map(|mem| mem.rows.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn find_by(&self, table: &Table, column: &'static str, value: Lookup) -> Result<Vec<Record>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table.name)
            .map(|mem| {
                mem.rows
                    .values()
                    .filter(|row| value.matches(row.get(column)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, table: &Table) -> Result<Vec<Record>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table.name)
            .map(|mem| mem.rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
