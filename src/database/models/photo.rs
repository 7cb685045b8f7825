use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{RecordStore, Table};
use crate::types::{Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const PHOTO_SCHEMA: Schema = Schema {
    entity: "photo",
    fields: &[
        FieldSpec::required("customer_id"),
        FieldSpec::required("business_id"),
        FieldSpec::optional("caption"),
        FieldSpec::optional("filename"),
    ],
};

pub const PHOTOS: Table = Table {
    name: "photos",
    columns: &["customer_id", "business_id", "caption", "filename"],
    unique: &[],
};

const REPOSITORY: Repository = Repository::new(PHOTOS, PHOTO_SCHEMA);

pub async fn insert_new_photo(store: &dyn RecordStore, photo: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, photo).await
}

pub async fn get_photo_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_photos_by_customer_id(store: &dyn RecordStore, customer_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "customer_id", customer_id).await
}

pub async fn get_photos_by_business_id(store: &dyn RecordStore, business_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "business_id", business_id).await
}

pub async fn replace_photo_by_id(store: &dyn RecordStore, id: RecordId, photo: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, photo).await
}

pub async fn delete_photo_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}
