//! HTTP API for the controller
//!
//! One logical endpoint; the first path segment is the key.
//!
//! | Method | Path     | Response                               |
//! |--------|----------|----------------------------------------|
//! | GET    | `/`      | JSON object of every entry             |
//! | GET    | `/{key}` | raw value, waits until the key is set  |
//! | POST   | `/{key}` | stores the body, echoes it back        |
//! | other  | any      | 404 `Method not allowed`               |

use crate::common::{key_from_path, request_tracing_middleware};
use crate::controller::store::Store;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Shared controller state for HTTP handlers.
#[derive(Clone)]
pub struct ControllerState {
    pub store: Arc<Store>,
}

impl ControllerState {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

pub fn create_router(state: ControllerState) -> Router {
    Router::new()
        .route("/", any(handle_request))
        .route("/*path", any(handle_request))
        // Values are opaque and unbounded
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn handle_request(
    State(state): State<ControllerState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let key = key_from_path(uri.path());
    let body = String::from_utf8_lossy(&body).into_owned();
    info!(method = %method, key = %key, body = %body, "Request");

    match method {
        Method::GET if key.is_empty() => list_entries(&state).await,
        Method::GET => get_entry(&state, &key).await,
        Method::POST => set_entry(&state, key, body).await,
        _ => method_not_allowed(),
    }
}

/// GET / : every entry, never blocks
async fn list_entries(state: &ControllerState) -> Response {
    let entries = state.store.list().await;
    (StatusCode::OK, Json(entries)).into_response()
}

/// GET /{key} : long-poll until the key is set
async fn get_entry(state: &ControllerState, key: &str) -> Response {
    let value = state.store.wait_for(key).await;
    (StatusCode::OK, value).into_response()
}

/// POST /{key} : unconditional overwrite
async fn set_entry(state: &ControllerState, key: String, value: String) -> Response {
    state.store.set(key, value.clone()).await;
    (StatusCode::OK, value).into_response()
}

// 404 rather than 405: existing clients match on it.
fn method_not_allowed() -> Response {
    (StatusCode::NOT_FOUND, METHOD_NOT_ALLOWED).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::REQUEST_ID_HEADER;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router() -> (Router, Arc<Store>) {
        let store = Arc::new(Store::ephemeral(Duration::from_millis(10)));
        (create_router(ControllerState::new(store.clone())), store)
    }

    async fn call(app: &Router, method: Method, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_post_echoes_body() {
        let (app, store) = router();
        let (status, body) = call(&app, Method::POST, "/a", "\"1\"").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "\"1\"");
        assert_eq!(store.get("a").await.as_deref(), Some("\"1\""));
    }

    #[tokio::test]
    async fn test_get_present_key() {
        let (app, _) = router();
        call(&app, Method::POST, "/a", "hello").await;
        let (status, body) = call(&app, Method::GET, "/a", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_empty_body_is_a_value() {
        let (app, _) = router();
        call(&app, Method::POST, "/flag", "").await;
        let (status, body) = tokio::time::timeout(
            Duration::from_secs(1),
            call(&app, Method::GET, "/flag", ""),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_list_entries() {
        let (app, _) = router();
        let (status, body) = call(&app, Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{}");

        call(&app, Method::POST, "/a", "1").await;
        call(&app, Method::POST, "/b", "{\"x\":2}").await;
        call(&app, Method::POST, "/a", "3").await;

        let (_, body) = call(&app, Method::GET, "/", "").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "a": "3", "b": "{\"x\":2}" }));
    }

    #[tokio::test]
    async fn test_only_first_segment_is_the_key() {
        let (app, store) = router();
        call(&app, Method::POST, "/deploy/extra/parts", "v").await;
        assert_eq!(store.get("deploy").await.as_deref(), Some("v"));

        let (_, body) = call(&app, Method::GET, "/deploy/other", "").await;
        assert_eq!(body, "v");
    }

    #[tokio::test]
    async fn test_percent_encoded_key_is_stored_verbatim() {
        let (app, store) = router();
        call(&app, Method::POST, "/A", "1").await;
        call(&app, Method::POST, "/%41", "2").await;
        call(&app, Method::POST, "/my%20key", "3").await;

        assert_eq!(store.get("A").await.as_deref(), Some("1"));
        assert_eq!(store.get("%41").await.as_deref(), Some("2"));
        assert_eq!(store.get("my%20key").await.as_deref(), Some("3"));
        assert_eq!(store.get("my key").await, None);

        let (_, body) = call(&app, Method::GET, "/", "").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "A": "1", "%41": "2", "my%20key": "3" }));
    }

    #[tokio::test]
    async fn test_large_values_are_accepted() {
        let (app, store) = router();
        let big = "x".repeat(3 * 1024 * 1024);

        let (status, body) = call(&app, Method::POST, "/big", &big).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.len(), big.len());
        assert_eq!(store.get("big").await.map(|v| v.len()), Some(big.len()));

        let (status, body) = call(&app, Method::DELETE, "/big", &big).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, METHOD_NOT_ALLOWED);
        assert_eq!(store.get("big").await.map(|v| v.len()), Some(big.len()));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let (app, store) = router();
        call(&app, Method::POST, "/key1", "v1").await;

        for method in [Method::DELETE, Method::PUT, Method::PATCH] {
            let (status, body) = call(&app, method, "/key1", "changed").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, METHOD_NOT_ALLOWED);
        }
        let (status, _) = call(&app, Method::DELETE, "/", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(store.get("key1").await.as_deref(), Some("v1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_blocking_get_waits_for_post() {
        let (app, _) = router();

        let pending = {
            let app = app.clone();
            tokio::spawn(async move { call(&app, Method::GET, "/b", "").await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!pending.is_finished());

        // Unrelated requests are still served
        let (status, _) = call(&app, Method::GET, "/", "").await;
        assert_eq!(status, StatusCode::OK);

        call(&app, Method::POST, "/b", "x").await;
        let (status, body) = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "x");
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let (app, _) = router();

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let response = app
            .oneshot(
                Request::get("/")
                    .header(REQUEST_ID_HEADER, "pipeline-step-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "pipeline-step-7");
    }
}
