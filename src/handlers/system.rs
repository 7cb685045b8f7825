// handlers/system.rs - service descriptor, health and the terminal fallback

use axum::{
    extract::State,
    http::Uri,
    response::{Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::response::not_found_response;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Marketplace API",
        "version": version,
        "endpoints": {
            "customers": "/customers[/login|/:id[/businesses|/reviews|/photos|/orders]]",
            "users": "/users[/login|/:id[/businesses|/reviews|/photos|/orders]]",
            "businesses": "/businesses[/:id]",
            "reviews": "/reviews[/:id]",
            "photos": "/photos[/:id]",
            "products": "/products[/:id]",
            "orders": "/orders[/:id[/payments]] (protected)",
            "payments": "/payments[/:id] (protected)",
            "health": "/health",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}

/// No route matched
pub async fn fallback(uri: Uri) -> Response {
    not_found_response(&uri)
}
