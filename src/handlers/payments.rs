// handlers/payments.rs - /payments (all routes authenticated)

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{order, payment, PAYMENT_SCHEMA};
use crate::error::ApiError;
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::record_id;

const PARENTS: &[&str] = &["order_id", "customer_id"];

/// POST /payments - the order must exist and belong to the paying customer
pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &PAYMENT_SCHEMA)?;
    let store = state.store.as_ref();

    let customer_id = body.get("customer_id").and_then(Value::as_i64);
    ensure_authorized(store, &principal, customer_id).await?;

    let order_id = body.get("order_id").and_then(Value::as_i64);
    let existing_order = match order_id {
        Some(order_id) => order::get_order_by_id(store, order_id).await?,
        None => None,
    };
    let Some(existing_order) = existing_order else {
        return Err(ApiError::bad_request("Payment references an order that does not exist"));
    };
    if record_id(&existing_order, "customer_id") != customer_id {
        return Err(ApiError::forbidden("Payment customer does not match the order's customer"));
    }

    let id = payment::insert_new_payment(store, &body).await?;
    tracing::info!("Recorded payment {} for order {:?}", id, order_id);
    Ok(ApiResponse::created(id, links(id, order_id)))
}

pub async fn get(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(found) = payment::get_payment_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&found, "customer_id")).await?;
    Ok(ApiResponse::ok(Value::Object(found)))
}

pub async fn replace(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &PAYMENT_SCHEMA)?;
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = payment::get_payment_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;
    ensure_same_parents(&existing, &body, PARENTS)?;

    if !payment::replace_payment_by_id(store, id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(links(id, record_id(&existing, "order_id"))))
}

pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = payment::get_payment_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;

    if payment::delete_payment_by_id(store, id).await? {
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}

fn links(id: i64, order_id: Option<i64>) -> Value {
    match order_id {
        Some(order_id) => json!({
            "payment": link("payments", id),
            "order": link("orders", order_id),
        }),
        None => json!({ "payment": link("payments", id) }),
    }
}
