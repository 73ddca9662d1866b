// Capability handlers: handshake, tool discovery and tool invocation

use crate::dispatcher::MethodHandler;
use crate::error::{ExecutionError, McpError};
use crate::protocol::{
    CallToolResult, InitializeParams, InitializeResult, ListToolsResult, ServerCapabilities,
    PROTOCOL_VERSION,
};
use crate::server::McpServer;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Answers the handshake with the protocol version, capabilities and server info
pub struct InitializeHandler {
    server: McpServer,
}

impl InitializeHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl MethodHandler for InitializeHandler {
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        tracing::info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            client_protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "client handshake"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: self.server.info(),
        };
        Ok(serde_json::to_value(result).map_err(ExecutionError::Encode)?)
    }
}

/// Acknowledges the post-handshake notification
pub struct InitializedHandler;

#[async_trait]
impl MethodHandler for InitializedHandler {
    async fn handle(&self, _params: Option<Value>) -> Result<Value, McpError> {
        tracing::debug!("client initialized");
        Ok(Value::Null)
    }
}

/// Rebuilds the tool catalog and lists it
pub struct ListToolsHandler {
    server: McpServer,
}

impl ListToolsHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl MethodHandler for ListToolsHandler {
    async fn handle(&self, _params: Option<Value>) -> Result<Value, McpError> {
        let result = ListToolsResult {
            tools: self.server.tools(),
        };
        Ok(serde_json::to_value(result).map_err(ExecutionError::Encode)?)
    }
}

/// Executes a tool and wraps the result as text content
pub struct CallToolHandler {
    server: McpServer,
}

impl CallToolHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl MethodHandler for CallToolHandler {
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError> {
        let (name, arguments) = parse_call_params(params)?;
        tracing::info!(tool = %name, "calling tool");

        let value = self.server.execute(&name, &arguments).await?;
        let result = CallToolResult::from_value(&value);
        Ok(serde_json::to_value(result).map_err(ExecutionError::Encode)?)
    }
}

/// Expect `{name: string, arguments?: object}`
fn parse_call_params(params: Option<Value>) -> Result<(String, Map<String, Value>), McpError> {
    let Some(Value::Object(mut params)) = params else {
        return Err(McpError::invalid_params("params must be an object"));
    };

    let name = match params.remove("name") {
        Some(Value::String(name)) => name,
        Some(_) => return Err(McpError::invalid_params("tool name must be a string")),
        None => return Err(McpError::invalid_params("missing tool name")),
    };

    let arguments = match params.remove("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments,
        Some(_) => return Err(McpError::invalid_params("arguments must be an object")),
    };

    Ok((name, arguments))
}
