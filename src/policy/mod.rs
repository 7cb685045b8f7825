//! Ownership policy.
//!
//! A principal may act on a resource when the email in its token equals the
//! email of the account that owns the resource. The owner is looked up by id
//! on every check; ids are never compared directly, so a token issued before
//! an email change stops matching.

use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::models::account::get_account_email;
use crate::database::store::RecordStore;
use crate::error::ApiError;
use crate::middleware::Principal;
use crate::types::{Record, RecordId};

/// True iff `owner_id` names an account whose email is the principal's
pub async fn is_authorized(
    store: &dyn RecordStore,
    principal: &Principal,
    owner_id: RecordId,
) -> Result<bool, DatabaseError> {
    let owner_email = get_account_email(store, owner_id).await?;
    Ok(owner_email.as_deref() == Some(principal.email.as_str()))
}

/// Like [`is_authorized`] but reads the owner id out of `field` of a JSON
/// body. A missing or non-integer id is never authorized.
pub async fn is_authorized_for(
    store: &dyn RecordStore,
    principal: &Principal,
    body: &Value,
    field: &str,
) -> Result<bool, DatabaseError> {
    match body.get(field).and_then(Value::as_i64) {
        Some(owner_id) => is_authorized(store, principal, owner_id).await,
        None => Ok(false),
    }
}

/// Guard form used by handlers: `Forbidden` unless authorized
pub async fn ensure_authorized(
    store: &dyn RecordStore,
    principal: &Principal,
    owner_id: Option<RecordId>,
) -> Result<(), ApiError> {
    let allowed = match owner_id {
        Some(owner_id) => is_authorized(store, principal, owner_id).await?,
        None => false,
    };
    if allowed {
        Ok(())
    } else {
        tracing::debug!("{} is not the owner of account {:?}", principal.email, owner_id);
        Err(ApiError::not_owner())
    }
}

/// Reject an update whose body changes any of `fields` relative to the
/// stored record. Applies to every caller, the owner included.
pub fn ensure_same_parents(existing: &Record, replacement: &Value, fields: &[&str]) -> Result<(), ApiError> {
    for field in fields {
        if existing.get(*field) != replacement.get(*field) {
            return Err(ApiError::forbidden(format!("Updates may not change {}", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::account::ACCOUNTS;
    use crate::types::Role;
    use serde_json::json;

    async fn account(store: &MemoryStore, role: &str, email: &str) -> RecordId {
        let record = json!({ "role": role, "name": "n", "email": email, "password": "x" });
        store.insert(&ACCOUNTS, record.as_object().unwrap()).await.unwrap()
    }

    fn principal(email: &str) -> Principal {
        Principal {
            email: email.to_string(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn same_email_is_authorized() {
        let store = MemoryStore::new();
        let id = account(&store, "customer", "a@x.com").await;
        assert!(is_authorized(&store, &principal("a@x.com"), id).await.unwrap());
    }

    #[tokio::test]
    async fn authorization_follows_the_owners_current_email() {
        // The owner's email changed to the principal's after the token was issued
        let store = MemoryStore::new();
        let owner = account(&store, "customer", "old@x.com").await;
        let record = json!({ "email": "a@x.com" });
        store.replace(&ACCOUNTS, owner, record.as_object().unwrap()).await.unwrap();
        assert!(is_authorized(&store, &principal("a@x.com"), owner).await.unwrap());
        assert!(!is_authorized(&store, &principal("old@x.com"), owner).await.unwrap());
    }

    #[tokio::test]
    async fn one_email_cannot_hold_accounts_of_both_roles() {
        let store = MemoryStore::new();
        let victim = account(&store, "customer", "a@x.com").await;
        let record = json!({ "role": "user", "name": "n", "email": "a@x.com", "password": "x" });
        assert!(store.insert(&ACCOUNTS, record.as_object().unwrap()).await.is_err());

        let impostor = Principal {
            email: "b@x.com".to_string(),
            role: Role::User,
        };
        assert!(!is_authorized(&store, &impostor, victim).await.unwrap());
    }

    #[tokio::test]
    async fn same_id_with_different_email_is_refused() {
        let store = MemoryStore::new();
        let id = account(&store, "customer", "a@x.com").await;
        assert!(!is_authorized(&store, &principal("b@x.com"), id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_owner_is_refused() {
        let store = MemoryStore::new();
        assert!(!is_authorized(&store, &principal("a@x.com"), 99).await.unwrap());
        assert!(ensure_authorized(&store, &principal("a@x.com"), None).await.is_err());
    }

    #[tokio::test]
    async fn owner_id_read_from_body() {
        let store = MemoryStore::new();
        let id = account(&store, "customer", "a@x.com").await;
        let p = principal("a@x.com");
        assert!(is_authorized_for(&store, &p, &json!({ "customer_id": id }), "customer_id").await.unwrap());
        assert!(!is_authorized_for(&store, &p, &json!({ "customer_id": "1" }), "customer_id").await.unwrap());
        assert!(!is_authorized_for(&store, &p, &json!({}), "customer_id").await.unwrap());
    }

    #[test]
    fn reassignment_is_forbidden() {
        let existing = json!({ "id": 1, "customer_id": 1, "business_id": 2, "stars": 3 });
        let existing = existing.as_object().unwrap();

        let same = json!({ "customer_id": 1, "business_id": 2, "stars": 5 });
        assert!(ensure_same_parents(existing, &same, &["customer_id", "business_id"]).is_ok());

        let moved = json!({ "customer_id": 1, "business_id": 3, "stars": 5 });
        let err = ensure_same_parents(existing, &moved, &["customer_id", "business_id"]).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let missing = json!({ "customer_id": 1, "stars": 5 });
        assert!(ensure_same_parents(existing, &missing, &["customer_id", "business_id"]).is_err());
    }
}
