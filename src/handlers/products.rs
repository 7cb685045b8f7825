// handlers/products.rs - /products
//
// A customer lists at most one product per business.

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{product, PRODUCT_SCHEMA};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::record_id;

const PARENTS: &[&str] = &["customer_id", "business_id"];
const DUPLICATE: &str = "Customer has already listed a product for this business";

pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &PRODUCT_SCHEMA)?;
    let store = state.store.as_ref();

    let customer_id = body.get("customer_id").and_then(Value::as_i64);
    ensure_authorized(store, &principal, customer_id).await?;

    let business_id = body.get("business_id").and_then(Value::as_i64);
    if let (Some(customer_id), Some(business_id)) = (customer_id, business_id) {
        if product::has_customer_listed_product_for_business(store, customer_id, business_id).await? {
            return Err(ApiError::conflict(DUPLICATE));
        }
    }

    let id = product::insert_new_product(store, &body).await.map_err(|e| match e {
        DatabaseError::UniqueViolation(_) => ApiError::conflict(DUPLICATE),
        other => other.into(),
    })?;
    Ok(ApiResponse::created(id, links(id, business_id)))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };

    match product::get_product_by_id(state.store.as_ref(), id).await? {
        Some(found) => Ok(ApiResponse::ok(Value::Object(found))),
        None => Ok(ApiResponse::FallThrough),
    }
}

pub async fn replace(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &PRODUCT_SCHEMA)?;
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = product::get_product_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;
    ensure_same_parents(&existing, &body, PARENTS)?;

    if !product::replace_product_by_id(store, id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(links(id, record_id(&existing, "business_id"))))
}

pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = product::get_product_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;

    if product::delete_product_by_id(store, id).await? {
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}

fn links(id: i64, business_id: Option<i64>) -> Value {
    match business_id {
        Some(business_id) => json!({
            "product": link("products", id),
            "business": link("businesses", business_id),
        }),
        None => json!({ "product": link("products", id) }),
    }
}
