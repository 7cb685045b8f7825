use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{Record, RecordId};
use crate::validation::{extract_valid_fields, Schema};

/// Schema-aware accessor over one table. Every write funnels the input
/// through [`extract_valid_fields`] first, so fields outside the schema can
/// never reach storage.
#[derive(Debug, Clone, Copy)]
pub struct Repository {
    pub table: Table,
    pub schema: Schema,
}

impl Repository {
    pub const fn new(table: Table, schema: Schema) -> Self {
        Self { table, schema }
    }

    pub async fn insert(&self, store: &dyn RecordStore, candidate: &Value) -> Result<RecordId, DatabaseError> {
        let record = extract_valid_fields(candidate, &self.schema);
        store.insert(&self.table, &record).await
    }

    pub async fn get_by_id(&self, store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
        store.fetch(&self.table, id).await
    }

    pub async fn replace_by_id(&self, store: &dyn RecordStore, id: RecordId, candidate: &Value) -> Result<bool, DatabaseError> {
        let record = extract_valid_fields(candidate, &self.schema);
        store.replace(&self.table, id, &record).await
    }

    pub async fn delete_by_id(&self, store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
        store.delete(&self.table, id).await
    }

    /// Rows whose `column` references `parent_id`. The parent itself is not
    /// checked, so an empty result does not mean the parent exists.
    pub async fn select_by_parent(&self, store: &dyn RecordStore, column: &'static str, parent_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
        store.find_by(&self.table, column, Lookup::Id(parent_id)).await
    }

    pub async fn select_all(&self, store: &dyn RecordStore) -> Result<Vec<Record>, DatabaseError> {
        store.list(&self.table).await
    }
}
