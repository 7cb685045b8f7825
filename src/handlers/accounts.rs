// handlers/accounts.rs - /customers and /users
//
// Both groups share these handlers; the role comes from the route group's
// `Extension<Role>`.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use super::{parse_id, validate_body, JsonBody};
use crate::app::AppState;
use crate::database::models::{account, business, order, photo, review, ACCOUNT_SCHEMA};
use crate::error::ApiError;
use crate::middleware::{link, ApiResponse, ApiResult, Principal};
use crate::policy::ensure_authorized;
use crate::types::Role;

/// POST /{role}s - registration
pub async fn register(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    validate_body(&state, &body, &ACCOUNT_SCHEMA)?;

    let id = account::insert_new_account(state.store.as_ref(), &state.passwords, role, &body).await?;
    tracing::info!("Registered {} {}", role, id);

    Ok(ApiResponse::created(id, json!({ role.as_str(): link(role.collection(), id) })))
}

/// POST /{role}s/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    JsonBody(body): JsonBody,
) -> ApiResult {
    let (Some(email), Some(password)) = (non_empty_str(&body, "email"), non_empty_str(&body, "password")) else {
        return Err(ApiError::bad_request("Request body needs an email and a password"));
    };

    let valid =
        account::validate_account_credentials(state.store.as_ref(), &state.passwords, role, email, password).await?;
    if !valid {
        tracing::warn!("Failed {} login for {}", role, email);
        return Err(crate::auth::AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue_token(email, role)?;
    Ok(ApiResponse::ok(json!({ "token": token })))
}

/// GET /{role}s/:id - the account itself, without sensitive fields.
/// Ownership is checked first, so ids the caller does not own answer 403
/// whether or not they exist.
pub async fn get(
    State(state): State<AppState>,
    Extension(role): Extension<Role>,
    principal: Principal,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };
    let store = state.store.as_ref();
    ensure_authorized(store, &principal, Some(id)).await?;

    match account::get_account_by_id_and_role(store, id, role).await? {
        Some(found) => Ok(ApiResponse::ok(Value::Object(found))),
        None => Ok(ApiResponse::FallThrough),
    }
}

/// GET /{role}s/:id/businesses
pub async fn businesses(state: State<AppState>, principal: Principal, raw_id: Path<String>) -> ApiResult {
    owned_listing(state, principal, raw_id, Owned::Businesses).await
}

/// GET /{role}s/:id/reviews
pub async fn reviews(state: State<AppState>, principal: Principal, raw_id: Path<String>) -> ApiResult {
    owned_listing(state, principal, raw_id, Owned::Reviews).await
}

/// GET /{role}s/:id/photos
pub async fn photos(state: State<AppState>, principal: Principal, raw_id: Path<String>) -> ApiResult {
    owned_listing(state, principal, raw_id, Owned::Photos).await
}

/// GET /{role}s/:id/orders
pub async fn orders(state: State<AppState>, principal: Principal, raw_id: Path<String>) -> ApiResult {
    owned_listing(state, principal, raw_id, Owned::Orders).await
}

#[derive(Debug, Clone, Copy)]
enum Owned {
    Businesses,
    Reviews,
    Photos,
    Orders,
}

impl Owned {
    fn key(self) -> &'static str {
        match self {
            Owned::Businesses => "businesses",
            Owned::Reviews => "reviews",
            Owned::Photos => "photos",
            Owned::Orders => "orders",
        }
    }
}

/// Principal-scoped listing: the caller must own account `:id`. The listing
/// itself never checks that the account exists.
async fn owned_listing(
    State(state): State<AppState>,
    principal: Principal,
    Path(raw_id): Path<String>,
    owned: Owned,
) -> ApiResult {
    let Some(id) = parse_id(&raw_id) else {
        return Ok(ApiResponse::FallThrough);
    };

    let store = state.store.as_ref();
    ensure_authorized(store, &principal, Some(id)).await?;

    let items = match owned {
        Owned::Businesses => business::get_businesses_by_owner_id(store, id).await?,
        Owned::Reviews => review::get_reviews_by_customer_id(store, id).await?,
        Owned::Photos => photo::get_photos_by_customer_id(store, id).await?,
        Owned::Orders => order::get_orders_by_customer_id(store, id).await?,
    };
    Ok(ApiResponse::listing(owned.key(), items))
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}
