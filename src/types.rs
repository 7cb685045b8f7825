/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat entity row as it travels between handlers, accessors and the store.
pub type Record = Map<String, Value>;

/// Generated primary key of every table.
pub type RecordId = i64;

/// Account role. Customers and users share one accounts table and one set of
/// route handlers; the role only scopes login, registration and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::User => "user",
        }
    }

    /// Collection segment used in URLs (`/customers`, `/users`)
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Customer => "customers",
            Role::User => "users",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read an integer id out of a record field, if it holds one.
pub fn record_id(record: &Record, field: &str) -> Option<RecordId> {
    record.get(field).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Customer).unwrap(), json!("customer"));
        assert_eq!(Role::User.collection(), "users");
    }

    #[test]
    fn record_id_requires_integer() {
        let record = json!({ "a": 3, "b": "3", "c": 1.5 });
        let record = record.as_object().unwrap();
        assert_eq!(record_id(record, "a"), Some(3));
        assert_eq!(record_id(record, "b"), None);
        assert_eq!(record_id(record, "c"), None);
        assert_eq!(record_id(record, "missing"), None);
    }
}
