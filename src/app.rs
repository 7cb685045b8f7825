use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordService, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::RecordStore;
use crate::handlers::{accounts, businesses, orders, payments, photos, products, reviews, system};
use crate::middleware::{render_fall_through, require_authentication};
use crate::types::Role;
use crate::validation::ValidationMode;

/// Everything a handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordService,
    pub validation: ValidationMode,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            tokens: Arc::new(TokenService::from_config(&config.security)),
            passwords: PasswordService::from_config(&config.security)?,
            validation: if config.validation.strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            },
        })
    }
}

/// Full application router
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Entity groups
        .nest("/customers", account_routes(&state, Role::Customer))
        .nest("/users", account_routes(&state, Role::User))
        .merge(business_routes(&state))
        .merge(review_routes(&state))
        .merge(photo_routes(&state))
        .merge(product_routes(&state))
        .merge(order_routes(&state))
        .merge(payment_routes(&state))
        .fallback(system::fallback)
        .with_state(state)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security))
                .layer(from_fn(render_fall_through)),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    }
}

/// Registration, login and principal-scoped listings, shared by both roles
fn account_routes(state: &AppState, role: Role) -> Router<AppState> {
    let auth = from_fn_with_state(state.clone(), require_authentication);

    Router::new()
        .route("/", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/:id", get(accounts::get).route_layer(auth.clone()))
        .route("/:id/businesses", get(accounts::businesses).route_layer(auth.clone()))
        .route("/:id/reviews", get(accounts::reviews).route_layer(auth.clone()))
        .route("/:id/photos", get(accounts::photos).route_layer(auth.clone()))
        .route("/:id/orders", get(accounts::orders).route_layer(auth))
        .layer(Extension(role))
}

fn business_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::{delete, put};
    let auth = from_fn_with_state(state.clone(), require_authentication);

    Router::new()
        .route(
            "/businesses",
            get(businesses::list).merge(post(businesses::create).route_layer(auth.clone())),
        )
        .route(
            "/businesses/:id",
            get(businesses::get).merge(
                put(businesses::replace)
                    .merge(delete(businesses::remove))
                    .route_layer(auth),
            ),
        )
}

fn review_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::{delete, put};
    let auth = from_fn_with_state(state.clone(), require_authentication);

    Router::new()
        .route("/reviews", post(reviews::create).route_layer(auth.clone()))
        .route(
            "/reviews/:id",
            get(reviews::get).merge(
                put(reviews::replace)
                    .merge(delete(reviews::remove))
                    .route_layer(auth),
            ),
        )
}

fn photo_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::{delete, put};
    let auth = from_fn_with_state(state.clone(), require_authentication);

    Router::new()
        .route("/photos", post(photos::create).route_layer(auth.clone()))
        .route(
            "/photos/:id",
            get(photos::get).merge(
                put(photos::replace)
                    .merge(delete(photos::remove))
                    .route_layer(auth),
            ),
        )
}

fn product_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::{delete, put};
    let auth = from_fn_with_state(state.clone(), require_authentication);

    Router::new()
        .route("/products", post(products::create).route_layer(auth.clone()))
        .route(
            "/products/:id",
            get(products::get).merge(
                put(products::replace)
                    .merge(delete(products::remove))
                    .route_layer(auth),
            ),
        )
}

/// Orders are private to their customer: every route is authenticated
fn order_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create))
        .route(
            "/orders/:id",
            get(orders::get).put(orders::replace).delete(orders::remove),
        )
        .route("/orders/:id/payments", get(orders::payments))
        .route_layer(from_fn_with_state(state.clone(), require_authentication))
}

fn payment_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/payments", post(payments::create))
        .route(
            "/payments/:id",
            get(payments::get).put(payments::replace).delete(payments::remove),
        )
        .route_layer(from_fn_with_state(state.clone(), require_authentication))
}
