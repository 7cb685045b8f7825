use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{RecordStore, Table};
use crate::types::{Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const PAYMENT_SCHEMA: Schema = Schema {
    entity: "payment",
    fields: &[
        FieldSpec::required("order_id"),
        FieldSpec::required("customer_id"),
        FieldSpec::required("payment_id"),
        FieldSpec::required("payment_amount"),
    ],
};

pub const PAYMENTS: Table = Table {
    name: "payments",
    columns: &["order_id", "customer_id", "payment_id", "payment_amount"],
    unique: &[],
};

const REPOSITORY: Repository = Repository::new(PAYMENTS, PAYMENT_SCHEMA);

pub async fn insert_new_payment(store: &dyn RecordStore, payment: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, payment).await
}

pub async fn get_payment_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_payments_by_order_id(store: &dyn RecordStore, order_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "order_id", order_id).await
}

pub async fn replace_payment_by_id(store: &dyn RecordStore, id: RecordId, payment: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, payment).await
}

pub async fn delete_payment_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}
