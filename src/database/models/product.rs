use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{record_id, Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const PRODUCT_SCHEMA: Schema = Schema {
    entity: "product",
    fields: &[
        FieldSpec::required("customer_id"),
        FieldSpec::required("business_id"),
        FieldSpec::required("name"),
        FieldSpec::required("category"),
        FieldSpec::required("description"),
        FieldSpec::required("price"),
        FieldSpec::optional("photo"),
    ],
};

pub const PRODUCTS: Table = Table {
    name: "products",
    columns: &["customer_id", "business_id", "name", "category", "description", "price", "photo"],
    unique: &[&["customer_id", "business_id"]],
};

const REPOSITORY: Repository = Repository::new(PRODUCTS, PRODUCT_SCHEMA);

pub async fn insert_new_product(store: &dyn RecordStore, product: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, product).await
}

pub async fn get_product_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_products_by_business_id(store: &dyn RecordStore, business_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "business_id", business_id).await
}

pub async fn replace_product_by_id(store: &dyn RecordStore, id: RecordId, product: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, product).await
}

pub async fn delete_product_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}

pub async fn has_customer_listed_product_for_business(
    store: &dyn RecordStore,
    customer_id: RecordId,
    business_id: RecordId,
) -> Result<bool, DatabaseError> {
    let products = store
        .find_by(&PRODUCTS, "business_id", Lookup::Id(business_id))
        .await?;
    Ok(products
        .iter()
        .any(|product| record_id(product, "customer_id") == Some(customer_id)))
}
