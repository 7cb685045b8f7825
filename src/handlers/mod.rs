// handlers/mod.rs - route handlers, one module per entity group
//
// Every write handler runs the same short-circuiting pipeline:
// authenticate (route layer) -> validate body -> load target -> authorize ->
// check parents/duplicates -> persist. The first failing stage answers.

pub mod accounts;
pub mod businesses;
pub mod orders;
pub mod payments;
pub mod photos;
pub mod products;
pub mod reviews;
pub mod system;

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::types::RecordId;
use crate::validation::{check, Schema};

/// JSON request body. Malformed JSON is a 400 with the usual `{error}` body.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Path ids that do not parse behave like ids with no row
pub fn parse_id(raw: &str) -> Option<RecordId> {
    raw.trim().parse().ok()
}

/// Run the configured schema check over a request body
pub fn validate_body(state: &AppState, body: &Value, schema: &Schema) -> Result<(), ApiError> {
    check(body, schema, state.validation).map_err(|field_errors| ApiError::invalid_body(schema.entity, field_errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_strictly() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
        assert_eq!(parse_id(""), None);
    }
}
