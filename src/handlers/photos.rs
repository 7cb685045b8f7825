// handlers/photos.rs - /photos

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{photo, PHOTO_SCHEMA};
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::record_id;

const PARENTS: &[&str] = &["customer_id", "business_id"];

pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &PHOTO_SCHEMA)?;
    let store = state.store.as_ref();

    ensure_authorized(store, &principal, body.get("customer_id").and_then(Value::as_i64)).await?;

    let id = photo::insert_new_photo(store, &body).await?;
    Ok(ApiResponse::created(id, links(id, body.get("business_id").and_then(Value::as_i64))))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };

    match photo::get_photo_by_id(state.store.as_ref(), id).await? {
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
    validate_body(&state, &body, &PHOTO_SCHEMA)?;
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = photo::get_photo_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;
    ensure_same_parents(&existing, &body, PARENTS)?;

    if !photo::replace_photo_by_id(store, id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(links(id, record_id(&existing, "business_id"))))
}

pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = photo::get_photo_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "customer_id")).await?;

    if photo::delete_photo_by_id(store, id).await? {
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}

fn links(id: i64, business_id: Option<i64>) -> Value {
    match business_id {
        Some(business_id) => json!({
            "photo": link("photos", id),
            "business": link("businesses", business_id),
        }),
        None => json!({ "photo": link("photos", id) }),
    }
}
