// handlers/orders.rs - /orders (all routes authenticated)

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{order, payment, product, ORDER_SCHEMA};
use crate::error::ApiError;
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::{record_id, Record};

const PARENTS: &[&str] = &["customer_id", "product_id"];

pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &ORDER_SCHEMA)?;
    let store = state.store.as_ref();

    ensure_authorized(store, &principal, body.get("customer_id").and_then(Value::as_i64)).await?;

    let product_id = body.get("product_id").and_then(Value::as_i64);
    let product_exists = match product_id {
        Some(product_id) => product::get_product_by_id(store, product_id).await?.is_some(),
        None => false,
    };
    if !product_exists {
        return Err(ApiError::bad_request("Order references a product that does not exist"));
    }

    let id = order::insert_new_order(store, &body).await?;
    Ok(ApiResponse::created(id, json!({ "order": link("orders", id) })))
}

pub async fn get(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    match owned_order(&state, &principal, &raw_id).await? {
        Some((_, found)) => Ok(ApiResponse::ok(Value::Object(found))),
        None => Ok(ApiResponse::FallThrough),
    }
}

pub async fn replace(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &ORDER_SCHEMA)?;

    let Some((id, existing)) = owned_order(&state, &principal, &raw_id).await? else {
        return Ok(ApiResponse::FallThrough);
    };
    ensure_same_parents(&existing, &body, PARENTS)?;

    if !order::replace_order_by_id(state.store.as_ref(), id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(json!({ "order": link("orders", id) })))
}

pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let Some((id, _)) = owned_order(&state, &principal, &raw_id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    if order::delete_order_by_id(state.store.as_ref(), id).await? {
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}

/// GET /orders/:id/payments
pub async fn payments(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let Some((id, _)) = owned_order(&state, &principal, &raw_id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    let payments = payment::get_payments_by_order_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::listing("payments", payments))
}

/// Load the order and check the caller owns it. `None` falls through.
async fn owned_order(
    state: &AppState,
    principal: &Principal,
    raw_id: &str,
) -> Result<Option<(i64, Record)>, ApiError> {
    let store = state.store.as_ref();
    let Some(id) = parse_id(raw_id) else {
        return Ok(None);
    };
    let Some(found) = order::get_order_by_id(store, id).await? else {
        return Ok(None);
    };

    ensure_authorized(store, principal, record_id(&found, "customer_id")).await?;
    Ok(Some((id, found)))
}
