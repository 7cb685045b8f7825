// Postgres implementation of RecordStore.
//
// Writes bind the whole record as one JSONB parameter and let
// jsonb_populate_record coerce each value to its column type; reads come
// back through row_to_json so every table maps onto a Record the same way.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, Row};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{Record, RecordId};

#[derive(Debug, Clone, Copy, Default)]
pub struct PgStore;

impl PgStore {
    pub fn new() -> Self {
        Self
    }

    fn column_list(columns: &[&str]) -> String {
        columns
            .iter()
            .map(|c| DatabaseManager::quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn payload(columns: &[(&'static str, Value)]) -> Json<Record> {
        Json(columns.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<Record, DatabaseError> {
        let value: Value = row.try_get("row").map_err(DatabaseError::from_sqlx)?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(DatabaseError::QueryError(format!("unexpected row format: {}", other))),
        }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert(&self, table: &Table, record: &Record) -> Result<RecordId, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let name = DatabaseManager::quote_identifier(table.name);
        let columns = table.writable(record);

        let result = if columns.is_empty() {
            let sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING id", name);
            sqlx::query(&sql).fetch_one(pool).await
        } else {
            let names: Vec<&str> = columns.iter().map(|(c, _)| *c).collect();
            let list = Self::column_list(&names);
            let sql = format!(
                "INSERT INTO {name} ({list}) SELECT {list} FROM jsonb_populate_record(NULL::{name}, $1) RETURNING id"
            );
            sqlx::query(&sql).bind(Self::payload(&columns)).fetch_one(pool).await
        };

        let row = result.map_err(DatabaseError::from_sqlx)?;
        row.try_get::<i64, _>("id").map_err(DatabaseError::from_sqlx)
    }

    async fn fetch(&self, table: &Table, id: RecordId) -> Result<Option<Record>, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE id = $1) t",
            DatabaseManager::quote_identifier(table.name)
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn replace(&self, table: &Table, id: RecordId, record: &Record) -> Result<bool, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let name = DatabaseManager::quote_identifier(table.name);
        let columns = table.writable(record);
        if columns.is_empty() {
            // Nothing to write; report whether the row exists
            return Ok(self.fetch(table, id).await?.is_some());
        }

        let names: Vec<&str> = columns.iter().map(|(c, _)| *c).collect();
        let list = Self::column_list(&names);
        let sql = format!(
            "UPDATE {name} SET ({list}) = (SELECT {list} FROM jsonb_populate_record(NULL::{name}, $1)) WHERE id = $2"
        );

        let result = sqlx::query(&sql)
            .bind(Self::payload(&columns))
            .bind(id)
            .execute(pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, table: &Table, id: RecordId) -> Result<bool, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let sql = format!("DELETE FROM {} WHERE id = $1", DatabaseManager::quote_identifier(table.name));

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by(&self, table: &Table, column: &'static str, value: Lookup) -> Result<Vec<Record>, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE {} = $1 ORDER BY id) t",
            DatabaseManager::quote_identifier(table.name),
            DatabaseManager::quote_identifier(column)
        );

        let query = sqlx::query(&sql);
        let query = match value {
            Lookup::Id(id) => query.bind(id),
            Lookup::Text(text) => query.bind(text),
        };

        let rows = query.fetch_all(pool).await.map_err(DatabaseError::from_sqlx)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn list(&self, table: &Table) -> Result<Vec<Record>, DatabaseError> {
        let pool = DatabaseManager::pool()?;
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} ORDER BY id) t",
            DatabaseManager::quote_identifier(table.name)
        );

        let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(DatabaseError::from_sqlx)?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check().await
    }
}
