// HTTP transport: one POST endpoint carrying JSON-RPC messages

use crate::dispatcher::Dispatcher;
use crate::protocol::JsonRpcMessage;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Header carrying the session id in both directions
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Router serving the protocol endpoint at `mount_path`
pub fn router(dispatcher: Arc<Dispatcher>, mount_path: &str) -> Router {
    Router::new()
        .route(mount_path, post(handle_message).get(reject_get))
        .with_state(dispatcher)
}

async fn handle_message(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let message: JsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "invalid message format");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid message format"})),
            )
                .into_response();
        }
    };

    let outcome = dispatcher.dispatch(message, session_id).await;

    let mut response = match outcome.response {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };

    if let Some(id) = outcome.session_id {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(SESSION_HEADER), value);
            }
            Err(e) => tracing::warn!(error = %e, "session id is not a valid header value"),
        }
    }

    response
}

async fn reject_get() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "GET method not supported for HTTP transport"})),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{handler_fn, METHOD_INITIALIZE};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let dispatcher = Dispatcher::new();
        dispatcher.register(METHOD_INITIALIZE, handler_fn(|_| async { Ok(json!({})) }));
        dispatcher.register("ping", handler_fn(|_| async { Ok(json!("pong")) }));
        router(Arc::new(dispatcher), "/mcp")
    }

    fn post_json(body: &str, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header("content-type", "application/json");
        if let Some(session) = session {
            builder = builder.header("Mcp-Session-Id", session);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let response = app().oneshot(post_json("{not json", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid message format");
    }

    #[tokio::test]
    async fn test_get_is_rejected() {
        let request = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let response = app()
            .oneshot(post_json(r#"{"jsonrpc":"2.0","method":"ping"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_null_id_gets_response() {
        let response = app()
            .oneshot(post_json(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.get("id"), Some(&Value::Null));
        assert_eq!(body["result"], "pong");
    }

    #[tokio::test]
    async fn test_missing_version_is_handled() {
        let response = app()
            .oneshot(post_json(r#"{"id":3,"method":"ping"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 3);
        assert_eq!(body["result"], "pong");
    }

    #[tokio::test]
    async fn test_handshake_sets_session_header() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session = response
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();

        let response = app
            .oneshot(post_json(r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#, Some(session.as_str())))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("Mcp-Session-Id").unwrap().to_str().unwrap(),
            session
        );
        assert_eq!(json_body(response).await["result"], "pong");
    }

    #[tokio::test]
    async fn test_unknown_session_is_protocol_error() {
        let response = app()
            .oneshot(post_json(r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#, Some("bogus")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("Mcp-Session-Id").is_none());

        let body = json_body(response).await;
        assert_eq!(body["id"], 5);
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["error"]["message"], "Session not found: bogus");
    }
}
