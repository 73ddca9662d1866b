// End-to-end protocol flow: handshake, discovery and invocation against a mock host

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use routemcp::{McpServer, ServerConfig};
use routemcp_core::{RouteDescriptor, StaticDocs, StaticRoutes};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS: &str = r##"{
    "swagger": "2.0",
    "info": {"title": "Demo", "version": "3.1.0"},
    "paths": {
        "/users/{id}": {
            "get": {
                "summary": "Get a user by id",
                "parameters": [
                    {"name": "id", "in": "path", "type": "string", "required": true},
                    {"name": "page", "in": "query", "type": "integer"}
                ]
            }
        },
        "/users": {
            "post": {
                "summary": "Create a user",
                "parameters": [
                    {"name": "body", "in": "body", "required": true,
                     "schema": {"$ref": "#/definitions/NewUser"}}
                ]
            }
        }
    },
    "definitions": {
        "NewUser": {
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string"}}
        }
    }
}"##;

struct Harness {
    app: Router,
    upstream: MockServer,
}

async fn harness() -> Harness {
    let upstream = MockServer::start().await;

    let routes = StaticRoutes::new(vec![
        RouteDescriptor::new("GET", "/ping"),
        RouteDescriptor::new("GET", "/users/:id"),
        RouteDescriptor::new("POST", "/users"),
        RouteDescriptor::new("GET", "/health"),
        RouteDescriptor::new("POST", "/mcp"),
        RouteDescriptor::new("GET", "/mcp"),
    ]);
    let config = ServerConfig {
        base_url: upstream.uri(),
        exclude_operations: vec!["/health".to_string()],
        ..Default::default()
    };

    let server = McpServer::new(config, Arc::new(routes))
        .unwrap()
        .with_docs(Arc::new(StaticDocs::from_json(DOCS).unwrap()))
        .unwrap();
    let app = server.mount("/mcp").unwrap();

    Harness { app, upstream }
}

async fn rpc(app: &Router, body: Value, session: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(session) = session {
        builder = builder.header("Mcp-Session-Id", session);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let session = response
        .headers()
        .get("Mcp-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, session, value)
}

async fn handshake(app: &Router) -> String {
    let (status, session, body) = rpc(
        app,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "clientInfo": {"name": "test", "version": "0"}}
        }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    session.expect("handshake returns a session id")
}

#[tokio::test]
async fn test_handshake() {
    let harness = harness().await;
    let (_, session, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": "init", "method": "initialize"}),
        None,
    )
    .await;

    assert!(session.is_some());
    assert_eq!(body["id"], "init");
    assert_eq!(body["result"]["capabilities"]["tools"], json!({}));
    assert_eq!(body["result"]["serverInfo"]["name"], "Demo");
    assert_eq!(body["result"]["serverInfo"]["version"], "3.1.0");
}

#[tokio::test]
async fn test_tools_list_reflects_filtered_routes() {
    let harness = harness().await;
    let session = handshake(&harness.app).await;

    let (status, _, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        Some(session.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let tools = body["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["GET_ping", "GET_users_id", "POST_users"]);

    let get_user = &tools[1];
    assert_eq!(get_user["description"], "Get a user by id");
    assert_eq!(get_user["inputSchema"]["type"], "object");
    assert_eq!(get_user["inputSchema"]["properties"]["page"]["type"], "integer");
    assert_eq!(get_user["inputSchema"]["required"], json!(["id"]));

    let create = &tools[2];
    assert_eq!(create["inputSchema"]["properties"]["body"]["properties"]["name"]["type"], "string");
    assert_eq!(create["inputSchema"]["required"], json!(["body"]));

    let ping = &tools[0];
    assert_eq!(ping["description"], "Execute GET request to /ping");
    assert_eq!(ping["inputSchema"], json!({"type": "object", "properties": {}}));
}

#[tokio::test]
async fn test_tools_call_returns_text_content() {
    let harness = harness().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(1)
        .mount(&harness.upstream)
        .await;

    let session = handshake(&harness.app).await;
    let (_, _, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "GET_ping"}}),
        Some(session.as_str()),
    )
    .await;

    assert_eq!(body["result"]["content"][0]["type"], "text");
    assert_eq!(body["result"]["content"][0]["text"], "pong");
}

#[tokio::test]
async fn test_tools_call_routes_path_and_query() {
    let harness = harness().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42", "name": "Ada"})))
        .expect(1)
        .mount(&harness.upstream)
        .await;

    let (_, _, body) = rpc(
        &harness.app,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "GET_users_id", "arguments": {"id": 42, "page": 2}}
        }),
        None,
    )
    .await;

    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let parsed: Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed, json!({"id": "42", "name": "Ada"}));
}

#[tokio::test]
async fn test_tools_call_sends_json_body() {
    let harness = harness().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"body": {"name": "Grace"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
        .expect(1)
        .mount(&harness.upstream)
        .await;

    let (_, _, body) = rpc(
        &harness.app,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "POST_users", "arguments": {"body": {"name": "Grace"}}}
        }),
        None,
    )
    .await;

    assert_eq!(body["result"]["content"][0]["text"], r#"{"created":true}"#);
}

#[tokio::test]
async fn test_unknown_tool_is_internal_error() {
    let harness = harness().await;
    let (status, _, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {"name": "GET_health"}}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32603);
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let harness = harness().await;
    let (status, _, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32601);
    assert!(body["error"]["message"].as_str().unwrap().contains("resources/list"));
}

#[tokio::test]
async fn test_initialized_notification_is_accepted() {
    let harness = harness().await;
    let session = handshake(&harness.app).await;

    let (status, _, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        Some(session.as_str()),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_stale_session_rejected() {
    let harness = harness().await;
    let (status, session, body) = rpc(
        &harness.app,
        json!({"jsonrpc": "2.0", "id": 8, "method": "tools/list"}),
        Some("not-a-session"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(session.is_none());
    assert_eq!(body["error"]["code"], -32600);
}
