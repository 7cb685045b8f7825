use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{record_id, Record, RecordId};
use crate::validation::{FieldSpec, Schema};

pub const REVIEW_SCHEMA: Schema = Schema {
    entity: "review",
    fields: &[
        FieldSpec::required("customer_id"),
        FieldSpec::required("business_id"),
        FieldSpec::required("dollars"),
        FieldSpec::required("stars"),
        FieldSpec::optional("review"),
    ],
};

pub const REVIEWS: Table = Table {
    name: "reviews",
    columns: &["customer_id", "business_id", "dollars", "stars", "review"],
    unique: &[&["customer_id", "business_id"]],
};

const REPOSITORY: Repository = Repository::new(REVIEWS, REVIEW_SCHEMA);

pub async fn insert_new_review(store: &dyn RecordStore, review: &Value) -> Result<RecordId, DatabaseError> {
    REPOSITORY.insert(store, review).await
}

pub async fn get_review_by_id(store: &dyn RecordStore, id: RecordId) -> Result<Option<Record>, DatabaseError> {
    REPOSITORY.get_by_id(store, id).await
}

pub async fn get_reviews_by_customer_id(store: &dyn RecordStore, customer_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "customer_id", customer_id).await
}

pub async fn get_reviews_by_business_id(store: &dyn RecordStore, business_id: RecordId) -> Result<Vec<Record>, DatabaseError> {
    REPOSITORY.select_by_parent(store, "business_id", business_id).await
}

pub async fn replace_review_by_id(store: &dyn RecordStore, id: RecordId, review: &Value) -> Result<bool, DatabaseError> {
    REPOSITORY.replace_by_id(store, id, review).await
}

pub async fn delete_review_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}

/// Check-then-insert guard. Not atomic on its own; the unique key on
/// (customer_id, business_id) catches the race.
pub async fn has_customer_reviewed_business(
    store: &dyn RecordStore,
    customer_id: RecordId,
    business_id: RecordId,
) -> Result<bool, DatabaseError> {
    let reviews = store
        .find_by(&REVIEWS, "customer_id", Lookup::Id(customer_id))
        .await?;
    Ok(reviews
        .iter()
        .any(|review| record_id(review, "business_id") == Some(business_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn duplicate_detection_is_per_pair() {
        let store = MemoryStore::new();
        let body = json!({ "customer_id": 1, "business_id": 2, "dollars": 1, "stars": 5 });
        insert_new_review(&store, &body).await.unwrap();

        assert!(has_customer_reviewed_business(&store, 1, 2).await.unwrap());
        assert!(!has_customer_reviewed_business(&store, 1, 3).await.unwrap());
        assert!(!has_customer_reviewed_business(&store, 2, 2).await.unwrap());
    }

    #[tokio::test]
    async fn unique_key_backs_up_the_check() {
        // Two writers that both passed the check; the second insert must fail.
        let store = MemoryStore::new();
        let body = json!({ "customer_id": 1, "business_id": 2, "dollars": 1, "stars": 5 });
        insert_new_review(&store, &body).await.unwrap();
        let err = insert_new_review(&store, &body).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
        assert_eq!(get_reviews_by_business_id(&store, 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_unknown_parent_is_empty() {
        let store = MemoryStore::new();
        assert!(get_reviews_by_customer_id(&store, 404).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_fields_never_persist() {
        let store = MemoryStore::new();
        let body = json!({ "customer_id": 1, "business_id": 2, "dollars": 1, "stars": 5, "id": 50, "approved": true });
        let id = insert_new_review(&store, &body).await.unwrap();
        let stored = get_review_by_id(&store, id).await.unwrap().unwrap();
        assert_eq!(stored["id"], json!(id));
        assert!(!stored.contains_key("approved"));
    }
}
