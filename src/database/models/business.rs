use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{RecordStore, Table};
use crate::types::{Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const BUSINESS_SCHEMA: Schema = Schema {
    entity: "business",
    fields: &[
        FieldSpec::required("owner_id"),
        FieldSpec::required("name"),
        FieldSpec::required("address"),
        FieldSpec::required("city"),
        FieldSpec::required("state"),
        FieldSpec::required("zip"),
        FieldSpec::required("phone"),
        FieldSpec::required("category"),
        FieldSpec::required("subcategory"),
        FieldSpec::optional("website"),
        FieldSpec::optional("email"),
    ],
};

pub const BUSINESSES: Table = Table {
    name: "businesses",
    columns: &[
        "owner_id", "name", "address", "city", "state", "zip", "phone", "category", "subcategory", "website", "email",
    ],
    unique: &[],
};

const REPOSITORY: Repository = Repository::new(BUSINESSES, BUSINESS_SCHEMA);

pub async fn insert_new_business(store: &dyn RecordStore, business: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, business).await
}

pub async fn get_business_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_all_businesses(store: &dyn RecordStore) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_all(store).await
}

pub async fn get_businesses_by_owner_id(store: &dyn RecordStore, owner_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "owner_id", owner_id).await
}

pub async fn replace_business_by_id(store: &dyn RecordStore, id: RecordId, business: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, business).await
}

pub async fn delete_business_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}
