// Translates a tool call into an outbound HTTP request against the host application

use crate::error::{ConfigurationError, ExecutionError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use routemcp_core::{fill_placeholders, Operation, OperationRegistry, ParamLocation};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of a prepared request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// URL-encoded form fields
    Form(String),
    /// Serialized JSON object
    Json(String),
}

impl RequestBody {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Form(_) => Some(FORM_CONTENT_TYPE),
            Self::Json(_) => Some(JSON_CONTENT_TYPE),
        }
    }
}

/// Fully partitioned request, independent of any HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: String,
    /// Path with placeholders substituted
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// URL-encoded query string without the leading `?`
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish()
    }

    /// Path plus query string, e.g. `/users/42?page=2`
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query())
    }
}

/// Partition call arguments by location and build the request.
///
/// Path placeholders are substituted and consumed; header and query names come
/// from the operation. Form fields are only sent for body methods whose
/// operation declares form data; any other leftover arguments form a JSON
/// object body, sent only for body methods and only when non-empty.
pub fn build_request(
    operation: &Operation,
    arguments: &Map<String, Value>,
) -> Result<PreparedRequest, ExecutionError> {
    let path = fill_placeholders(&operation.path, |name| arguments.get(name).map(stringify));

    let mut query = Vec::new();
    let mut headers = Vec::new();
    let mut form = Vec::new();
    let mut body = Map::new();

    for (name, value) in arguments {
        match operation.location(name) {
            ParamLocation::Path => {}
            ParamLocation::Header => headers.push((name.clone(), stringify(value))),
            ParamLocation::Query => query.push((name.clone(), stringify(value))),
            ParamLocation::FormData => form.push((name.clone(), stringify(value))),
            ParamLocation::Body => {
                body.insert(name.clone(), value.clone());
            }
        }
    }
    query.sort();

    let body = if !operation.is_body_method() {
        if !body.is_empty() || !form.is_empty() {
            debug!(method = %operation.method, "dropping body arguments for bodiless method");
        }
        RequestBody::Empty
    } else if !operation.form_data_params.is_empty() {
        if form.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Form(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&form)
                    .finish(),
            )
        }
    } else if body.is_empty() {
        RequestBody::Empty
    } else {
        RequestBody::Json(serde_json::to_string(&Value::Object(body))?)
    };

    Ok(PreparedRequest {
        method: operation.method.to_uppercase(),
        path,
        query,
        headers,
        body,
    })
}

/// Strings are used verbatim; other values use their compact JSON text
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sends tool calls to the host application over HTTP
#[derive(Debug, Clone)]
pub struct Executor {
    client: Client,
    base_url: String,
}

impl Executor {
    /// An empty base URL falls back to [`DEFAULT_BASE_URL`]
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigurationError> {
        let base_url = base_url.into();
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url
        };

        let client = Client::builder()
            .user_agent(concat!("routemcp/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ConfigurationError::HttpClient)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute the operation registered under `name`.
    ///
    /// Non-success statuses are not errors: the response body is returned
    /// either way, parsed as JSON when possible and as raw text otherwise.
    pub async fn execute(
        &self,
        operations: &OperationRegistry,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Value, ExecutionError> {
        let operation = operations
            .get(name)
            .ok_or_else(|| ExecutionError::UnknownTool(name.to_string()))?;

        let prepared = build_request(operation, arguments)?;
        self.send(&prepared).await
    }

    pub async fn send(&self, prepared: &PreparedRequest) -> Result<Value, ExecutionError> {
        let method = Method::from_bytes(prepared.method.as_bytes())
            .map_err(|_| ExecutionError::InvalidMethod(prepared.method.clone()))?;
        let url = prepared.url(&self.base_url);

        let mut headers = HeaderMap::new();
        for (name, value) in &prepared.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExecutionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ExecutionError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.append(header_name, header_value);
        }
        if let Some(content_type) = prepared.body.content_type() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        let mut request = self.client.request(method, &url).headers(headers);
        match &prepared.body {
            RequestBody::Empty => {}
            RequestBody::Form(body) | RequestBody::Json(body) => request = request.body(body.clone()),
        }

        debug!(method = %prepared.method, url = %url, "executing tool request");
        let response = request.send().await.map_err(ExecutionError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ExecutionError::ReadResponse)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "host application returned an error status");
        }

        Ok(parse_body(&bytes))
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
