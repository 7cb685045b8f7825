// handlers/businesses.rs - /businesses

use axum::extract::{Path, State};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{business, photo, product, review, BUSINESS_SCHEMA};
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::{ensure_authorized, ensure_same_parents};
use crate::types::record_id;

/// POST /businesses - the body's owner must be the caller
pub async fn create(State(state): State<AppState>, principal: Principal, JsonBody(body): JsonBody) -> ApiResult {
    validate_body(&state, &body, &BUSINESS_SCHEMA)?;
    let store = state.store.as_ref();

    ensure_authorized(store, &principal, body.get("owner_id").and_then(Value::as_i64)).await?;

    let id = business::insert_new_business(store, &body).await?;
    tracing::info!("Created business {}", id);
    Ok(ApiResponse::created(id, json!({ "business": link("businesses", id) })))
}

/// GET /businesses - public, full result array
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let businesses = business::get_all_businesses(state.store.as_ref()).await?;
    Ok(ApiResponse::listing("businesses", businesses))
}

/// GET /businesses/:id - public; the business with its reviews, photos and
/// products inlined
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(mut found) = business::get_business_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    let reviews = review::get_reviews_by_business_id(store, id).await?;
    let photos = photo::get_photos_by_business_id(store, id).await?;
    let products = product::get_products_by_business_id(store, id).await?;
    found.insert("reviews".to_string(), json!(reviews));
    found.insert("photos".to_string(), json!(photos));
    found.insert("products".to_string(), json!(products));

    Ok(ApiResponse::ok(Value::Object(found)))
}

/// PUT /businesses/:id - owner only; ownership cannot be handed over
pub async fn replace(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &BUSINESS_SCHEMA)?;
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = business::get_business_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "owner_id")).await?;
    ensure_same_parents(&existing, &body, &["owner_id"])?;

    if !business::replace_business_by_id(store, id, &body).await? {
        return Ok(ApiResponse::FallThrough);
    }
    Ok(ApiResponse::updated(json!({ "business": link("businesses", id) })))
}

/// DELETE /businesses/:id
pub async fn remove(State(state): State<AppState>, principal: Principal, Path(raw_id): Path<String>) -> ApiResult {
    let store = state.store.as_ref();

    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let Some(existing) = business::get_business_by_id(store, id).await? else {
        return Ok(ApiResponse::FallThrough);
    };

    ensure_authorized(store, &principal, record_id(&existing, "owner_id")).await?;

    if business::delete_business_by_id(store, id).await? {
        tracing::info!("Deleted business {}", id);
        Ok(ApiResponse::NoContent)
    } else {
        Ok(ApiResponse::FallThrough)
    }
}
