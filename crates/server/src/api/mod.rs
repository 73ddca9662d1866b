use crate::config::McpConfig;
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use routemcp::McpServer;
use routemcp_core::{DescribeSchema, DocProvider, RouteDescriptor, StaticDocs, StaticRoutes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

pub mod handlers;

/// Built-in Swagger documentation for the demo routes
const API_DOCS: &str = include_str!("../../api-docs.json");

/// Routes served by [`create_router`], in the placeholder syntax the bridge reads
const ROUTES: [(&str, &str); 6] = [
    ("GET", "/api/health"),
    ("GET", "/ping"),
    ("GET", "/users"),
    ("POST", "/users"),
    ("GET", "/users/:id"),
    ("DELETE", "/users/:id"),
];

/// Start the API server with the MCP endpoint mounted alongside it
pub async fn serve(addr: &str, config: McpConfig) -> Result<()> {
    let bridge = create_bridge(&config, addr)?;
    let mcp = bridge
        .mount(&config.mount_path)
        .context("Failed to mount MCP endpoint")?;

    let app = create_router(Arc::new(AppState::new()), mcp);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);
    tracing::info!("MCP endpoint at http://{}{}", addr, config.mount_path);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Publish this application's routing table
pub fn route_table() -> StaticRoutes {
    StaticRoutes::new(
        ROUTES
            .iter()
            .map(|(method, path)| RouteDescriptor::new(*method, *path))
            .collect(),
    )
}

/// Configure the MCP bridge for the demo routes
pub fn create_bridge(config: &McpConfig, addr: &str) -> Result<McpServer> {
    let docs: Arc<dyn DocProvider> = match &config.docs_file {
        Some(path) => Arc::new(StaticDocs::from_file(path).context("Failed to load API documentation")?),
        None => Arc::new(StaticDocs::from_json(API_DOCS).context("Built-in API documentation is invalid")?),
    };

    let bridge = McpServer::new(config.server_config(addr), Arc::new(route_table()))?.with_docs(docs)?;
    bridge.register_schema(
        "GET",
        "/users",
        Some(handlers::ListUsersQuery::describe()),
        None,
    );

    Ok(bridge)
}

/// Create the API router, merging in the MCP endpoint router
pub fn create_router(state: Arc<AppState>, mcp: Router) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/ping", get(handlers::ping))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .with_state(state)
        .merge(mcp)
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "routemcp-demo",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error type for API handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::handlers::User;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use chrono::Utc;
    use routemcp_core::fill_placeholders;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn seeded_state() -> Arc<AppState> {
        Arc::new(AppState::with_users([User {
            id: "1".to_string(),
            name: "Ada".to_string(),
            email: None,
            created_at: Utc::now(),
        }]))
    }

    fn app() -> Router {
        let bridge = create_bridge(&McpConfig::default(), "127.0.0.1:8080").unwrap();
        create_router(seeded_state(), bridge.mount("/mcp").unwrap())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    #[tokio::test]
    async fn test_published_routes_are_served() {
        let app = app();
        for (method, path) in ROUTES {
            let uri = fill_placeholders(path, |_| Some("1".to_string()));
            let method: Method = method.parse().unwrap();
            let body = (method == Method::POST).then(|| json!({"name": "Grace"}));

            let (status, _) = send(&app, method.clone(), &uri, body).await;
            assert!(status.is_success(), "{} {} returned {}", method, uri, status);
        }
    }

    #[tokio::test]
    async fn test_user_endpoints() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");

        let (status, body) = send(&app, Method::GET, "/users/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found: 404");

        let (status, body) = send(&app, Method::POST, "/users", Some(json!({"body": {"name": "Lin"}}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Lin");

        let (status, _) = send(&app, Method::POST, "/users", Some(json!({"name": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, Method::GET, "/users?page=1&limit=1", None).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mcp_lists_demo_tools() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/mcp",
            Some(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let tools = body["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["GET_ping", "GET_users", "POST_users", "GET_users_id", "DELETE_users_id"]
        );

        // Registered query type shapes the undocumented listing route
        let list = &tools[1];
        assert_eq!(list["inputSchema"]["properties"]["limit"]["maximum"].to_string(), "100");
        assert_eq!(list["description"], "Execute GET request to /users");

        // Documentation shapes the rest
        let create = &tools[2];
        assert_eq!(create["description"], "Create a user");
        assert_eq!(
            create["inputSchema"]["properties"]["X-Request-Id"]["description"],
            "Header parameter: X-Request-Id"
        );
        assert_eq!(create["inputSchema"]["required"], json!(["body"]));
    }

    #[tokio::test]
    async fn test_handshake_uses_documented_metadata() {
        let app = app();
        let (_, body) = send(
            &app,
            Method::POST,
            "/mcp",
            Some(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})),
        )
        .await;

        assert_eq!(body["result"]["serverInfo"]["name"], "routemcp demo");
        assert_eq!(body["result"]["serverInfo"]["version"], "0.1.0");
    }

    #[tokio::test]
    async fn test_exclude_tags_from_config() {
        let config = McpConfig {
            exclude_tags: vec!["Admin".to_string()],
            ..Default::default()
        };
        let bridge = create_bridge(&config, "127.0.0.1:8080").unwrap();
        let names: Vec<String> = bridge.tools().into_iter().map(|t| t.name).collect();
        assert!(!names.contains(&"DELETE_users_id".to_string()));
        assert!(names.contains(&"GET_users_id".to_string()));
    }
}
