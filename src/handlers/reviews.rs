// handlers/reviews.rs - /reviews

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{review, REVIEW_SCHEMA};
use crate::error::ApiError;
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::record_id;

const PARENTS: &[&str] = &["customer_id", "business_id"];

/// POST /reviews - one review per (customer, business)
pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &REVIEW_SCHEMA)?;
    let store = state.store.as_ref();

    let customer_id = body.get("customer_id").and_then(Value::as_i64);
    ensure_authorized(store, &principal, customer_id).await?;

    let business_id = body.get("business_id").and_then(Value::as_i64);
    if let (Some(customer_id), Some(business_id)) = (customer_id, business_id) {
        if review::has_customer_reviewed_business(store, customer_id, business_id).await? {
            return Err(ApiError::conflict("Customer has already posted a review of this business"));
        }
    }

    let id = review::insert_new_review(store, &body).await.map_err(duplicate_review)?;
    Ok(ApiResponse::created(id, links(id, business_id)))
}

/// GET /reviews/:id - public
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };

    match review::get_review_by_id(state.store.as_ref(), id).await? {
        Some(found) => Ok(ApiResponse::ok(Value::Object(found))),
        None => Ok(ApiResponse::FallThrough),
    }
}

/// PUT /reviews/:id - full replace by the review's author
pub async fn replace(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &REVIEW_SCHEMA)?;
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = review::get_review_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;
    ensure_same_parents(&existing, &body, PARENTS)?;

    if !review::replace_review_by_id(store, id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(links(id, record_id(&existing, "business_id"))))
}

/// DELETE /reviews/:id
pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = review::get_review_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;

    if review::delete_review_by_id(store, id).await? {
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}

fn links(id: i64, business_id: Option<i64>) -> Value {
    match business_id {
        Some(business_id) => json!({
            "review": link("reviews", id),
            "business": link("businesses", business_id),
        }),
        None => json!({ "review": link("reviews", id) }),
    }
}

/// A unique-key hit means a concurrent writer won the race
fn duplicate_review(err: crate::database::DatabaseError) -> ApiError {
    match err {
        crate::database::DatabaseError::UniqueViolation(_) => {
            ApiError::conflict("Customer has already posted a review of this business")
        }
        other => other.into(),
    }
}
