//! Error types for the protocol bridge.

use crate::protocol::JsonRpcError;
use routemcp_core::DocsError;

/// Result type for bridge operations.
pub type McpResult<T> = Result<T, McpError>;

/// Errors surfaced by setup, message handling and tool execution.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Setup failed; reported to the embedding application, never to clients.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Malformed or unroutable protocol message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A tool call could not be carried out.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid mount path '{path}': {reason}")]
    InvalidMountPath { path: String, reason: &'static str },

    #[error(transparent)]
    Docs(#[from] DocsError),

    #[error("Failed to serialize sample value: {0}")]
    InvalidSample(#[source] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read response: {0}")]
    ReadResponse(#[source] reqwest::Error),
}

impl McpError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::InvalidParams(message.into()))
    }

    /// JSON-RPC error code reported to clients.
    ///
    /// Unknown methods and sessions have dedicated codes; every other failure
    /// raised while handling a message is reported as an internal error.
    pub fn code(&self) -> i32 {
        match self {
            Self::Protocol(ProtocolError::MethodNotFound(_)) => JsonRpcError::METHOD_NOT_FOUND,
            Self::Protocol(ProtocolError::SessionNotFound(_))
            | Self::Protocol(ProtocolError::InvalidRequest(_)) => JsonRpcError::INVALID_REQUEST,
            _ => JsonRpcError::INTERNAL_ERROR,
        }
    }

    pub fn to_rpc_error(&self) -> JsonRpcError {
        JsonRpcError::custom(self.code(), self.to_string())
    }
}
