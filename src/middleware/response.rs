use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

/// Outcome of a handler that did not fail
#[derive(Debug)]
pub enum ApiResponse {
    Json { status: StatusCode, body: Value },
    NoContent,
    /// Nothing matched. Rendered by [`render_fall_through`] exactly like the
    /// router fallback.
    FallThrough,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        ApiResponse::Json {
            status: StatusCode::OK,
            body,
        }
    }

    /// 201 with the new id and links to related resources
    pub fn created(id: i64, links: Value) -> Self {
        ApiResponse::Json {
            status: StatusCode::CREATED,
            body: json!({ "id": id, "links": links }),
        }
    }

    /// 200 after an update
    pub fn updated(links: Value) -> Self {
        Self::ok(json!({ "links": links }))
    }

    /// 200 `{ key: [...] }`
    pub fn listing<T: serde::Serialize>(key: &str, items: Vec<T>) -> Self {
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), json!(items));
        Self::ok(Value::Object(body))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Json { status, body } => (status, Json(body)).into_response(),
            ApiResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
            ApiResponse::FallThrough => {
                let mut response = StatusCode::NOT_FOUND.into_response();
                response.extensions_mut().insert(FellThrough);
                response
            }
        }
    }
}

/// Path of a resource inside `collection`
pub fn link(collection: &str, id: i64) -> String {
    format!("/{}/{}", collection, id)
}

/// Marker left on a response by [`ApiResponse::FallThrough`]
#[derive(Debug, Clone, Copy)]
pub struct FellThrough;

/// Terminal not-found reply shared by the router fallback and fall-through
pub fn not_found_response(uri: &Uri) -> Response {
    let message = format!("Requested resource {} does not exist", uri.path());
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

/// Outermost layer: hands fall-through responses to the terminal handler.
/// A known path hit with an unrouted method ends there too.
pub async fn render_fall_through(request: Request, next: Next) -> Response {
    let uri = request.uri().clone();
    let response = next.run(request).await;
    if fell_through(&response) {
        not_found_response(&uri)
    } else {
        response
    }
}

fn fell_through(response: &Response) -> bool {
    response.extensions().get::<FellThrough>().is_some() || response.status() == StatusCode::METHOD_NOT_ALLOWED
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_links_to_resource() {
        let links = json!({ "review": link("reviews", 7) });
        let ApiResponse::Json { status, body } = ApiResponse::created(7, links) else {
            panic!("expected json");
        };
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "id": 7, "links": { "review": "/reviews/7" } }));
    }

    #[test]
    fn fall_through_is_404() {
        let response = ApiResponse::FallThrough.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<FellThrough>().is_some());
    }

    #[test]
    fn method_not_allowed_is_rendered_as_not_found() {
        let response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        assert!(fell_through(&response));
        assert!(!fell_through(&StatusCode::FORBIDDEN.into_response()));

        let rendered = not_found_response(&Uri::from_static("/reviews/1"));
        assert_eq!(rendered.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn no_content_is_204() {
        assert_eq!(ApiResponse::NoContent.into_response().status(), StatusCode::NO_CONTENT);
    }
}
