use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{RecordStore, Table};
use crate::types::{Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const ORDER_SCHEMA: Schema = Schema {
    entity: "order",
    fields: &[
        FieldSpec::required("customer_id"),
        FieldSpec::required("product_id"),
        FieldSpec::required("time"),
        FieldSpec::required("items"),
        FieldSpec::required("total_price"),
        FieldSpec::required("shipping_status"),
        FieldSpec::required("payment_status"),
    ],
};

pub const ORDERS: Table = Table {
    name: "orders",
    columns: &["customer_id", "product_id", "time", "items", "total_price", "shipping_status", "payment_status"],
    unique: &[],
};

const REPOSITORY: Repository = Repository::new(ORDERS, ORDER_SCHEMA);

pub async fn insert_new_order(store: &dyn RecordStore, order: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, order).await
}

pub async fn get_order_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_orders_by_customer_id(store: &dyn RecordStore, customer_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "customer_id", customer_id).await
}

pub async fn replace_order_by_id(store: &dyn RecordStore, id: RecordId, order: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, order).await
}

pub async fn delete_order_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}
