// Account accessors. Customers and users are one table tagged by role.

use serde_json::Value;
use thiserror::Error;

use crate::auth::{AuthError, PasswordService};
use crate::database::manager::DatabaseError;
use crate::database::repository::Repository;
use crate::database::store::{Lookup, RecordStore, Table};
use crate::types::{Record, RecordId, Role};
use crate::validation::{extract_valid_fields, FieldSpec, Schema};

pub const ACCOUNT_SCHEMA: Schema = Schema {
    entity: "account",
    fields: &[
        FieldSpec::required("name"),
        FieldSpec::required("email"),
        FieldSpec::required("password"),
        FieldSpec::optional("admin"),
    ],
};

pub const ACCOUNTS: Table = Table {
    name: "accounts",
    columns: &["role", "name", "email", "password", "admin"],
    unique: &[&["email"]],
};

const REPOSITORY: Repository = Repository::new(ACCOUNTS, ACCOUNT_SCHEMA);

/// Fields never returned unless explicitly requested
const SENSITIVE_FIELDS: &[&str] = &["password"];

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Password must be a string")]
    InvalidPassword,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Insert a new account, hashing its password first
pub async fn insert_new_account(
    store: &dyn RecordStore,
    passwords: &PasswordService,
    role: Role,
    account: &Value,
) -> Result<RecordId, AccountError> {
    let mut record = extract_valid_fields(account, &ACCOUNT_SCHEMA);
    hash_password_field(passwords, &mut record).await?;

    record.insert("role".to_string(), Value::String(role.as_str().to_string()));
    record.entry("admin").or_insert(Value::Bool(false));

    Ok(store.insert(&ACCOUNTS, &record).await?)
}

/// Replace the account's schema fields. A supplied password is re-hashed;
/// the role is not a schema field and never changes.
pub async fn replace_account_by_id(
    store: &dyn RecordStore,
    passwords: &PasswordService,
    id: RecordId,
    account: &Value,
) -> Result<bool, AccountError> {
    let mut record = extract_valid_fields(account, &ACCOUNT_SCHEMA);
    if record.contains_key("password") {
        hash_password_field(passwords, &mut record).await?;
    }

    Ok(store.replace(&ACCOUNTS, id, &record).await?)
}

pub async fn delete_account_by_id(store: &dyn RecordStore, id: RecordId) -> Result<bool, DatabaseError> {
    REPOSITORY.delete_by_id(store, id).await
}

async fn hash_password_field(passwords: &PasswordService, record: &mut Record) -> Result<(), AccountError> {
    let password = record
        .get("password")
        .and_then(Value::as_str)
        .ok_or(AccountError::InvalidPassword)?
        .to_string();
    let hash = passwords.hash(password).await?;
    record.insert("password".to_string(), Value::String(hash));
    Ok(())
}

/// Fetch an account of any role. Sensitive fields are stripped unless
/// `include_sensitive` is set.
pub async fn get_account_by_id(
    store: &dyn RecordStore,
    id: RecordId,
    include_sensitive: bool,
) -> Result<Option<Record>, DatabaseError> {
    let account = REPOSITORY.get_by_id(store, id).await?;
    Ok(account.map(|record| if include_sensitive { record } else { public_view(record) }))
}

/// Fetch an account only if it carries `role`
pub async fn get_account_by_id_and_role(
    store: &dyn RecordStore,
    id: RecordId,
    role: Role,
) -> Result<Option<Record>, DatabaseError> {
    let account = get_account_by_id(store, id, false).await?;
    Ok(account.filter(|record| has_role(record, role)))
}

/// Login lookup. Returns the full record, password hash included.
pub async fn get_account_by_email(
    store: &dyn RecordStore,
    role: Role,
    email: &str,
) -> Result<Option<Record>, DatabaseError> {
    let matches = store
        .find_by(&ACCOUNTS, "email", Lookup::Text(email.to_string()))
        .await?;
    Ok(matches.into_iter().find(|record| has_role(record, role)))
}

/// Email of the account with `id`, whatever its role
pub async fn get_account_email(store: &dyn RecordStore, id: RecordId) -> Result<Option<String>, DatabaseError> {
    let account = REPOSITORY.get_by_id(store, id).await?;
    Ok(account.and_then(|record| record.get("email").and_then(Value::as_str).map(str::to_string)))
}

/// True iff an account with this role and email exists and the password
/// matches its stored hash
pub async fn validate_account_credentials(
    store: &dyn RecordStore,
    passwords: &PasswordService,
    role: Role,
    email: &str,
    password: &str,
) -> Result<bool, AccountError> {
    let Some(account) = get_account_by_email(store, role, email).await? else {
        return Ok(false);
    };
    let Some(hash) = account.get("password").and_then(Value::as_str) else {
        return Ok(false);
    };
    Ok(passwords.verify(password.to_string(), hash.to_string()).await?)
}

pub fn public_view(mut record: Record) -> Record {
    for field in SENSITIVE_FIELDS {
        record.remove(*field);
    }
    record
}

fn has_role(record: &Record, role: Role) -> bool {
    record.get("role").and_then(Value::as_str) == Some(role.as_str())
}
