// Routes JSON-RPC messages to registered method handlers

use crate::error::{McpError, ProtocolError};
use crate::protocol::{JsonRpcError, JsonRpcMessage};
use crate::session::SessionStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

pub const METHOD_INITIALIZE: &str = "initialize";

/// Handles one protocol method
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError>;
}

/// Adapter turning an async closure into a [`MethodHandler`]
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> MethodHandler for FnHandler<F>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, McpError>> + Send,
{
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError> {
        (self.0)(params).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn MethodHandler>
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// `None` for notifications
    pub response: Option<JsonRpcMessage>,
    /// Session to report back to the client
    pub session_id: Option<String>,
}

/// Method-name keyed handler table plus the session store
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<String, Arc<dyn MethodHandler>>>,
    sessions: SessionStore,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `method`
    pub fn register(&self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) {
        let method = method.into();
        tracing::debug!(method = %method, "registering method handler");
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method, handler);
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(method)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one message.
    ///
    /// The handshake always opens a new session. Any other message presenting
    /// an unknown session is rejected before a handler runs. Notifications are
    /// processed but never answered.
    pub async fn dispatch(&self, message: JsonRpcMessage, session_id: Option<&str>) -> DispatchOutcome {
        let id = message.id.clone();
        let notification = id.is_none();

        let Some(method) = message.method else {
            tracing::warn!("message without a method");
            let response = (!notification).then(|| {
                JsonRpcMessage::error(id, JsonRpcError::invalid_request("Missing method"))
            });
            return DispatchOutcome {
                response,
                session_id: None,
            };
        };

        let session_id = if method == METHOD_INITIALIZE {
            Some(self.sessions.create().id)
        } else {
            match session_id {
                Some(presented) if !self.sessions.contains(presented) => {
                    tracing::warn!(session_id = %presented, method = %method, "unknown session");
                    let err = McpError::from(ProtocolError::SessionNotFound(presented.to_string()));
                    return DispatchOutcome {
                        response: (!notification).then(|| JsonRpcMessage::error(id, err.to_rpc_error())),
                        session_id: None,
                    };
                }
                presented => presented.map(str::to_string),
            }
        };

        let result = self.call(&method, message.params).await;

        let response = if notification {
            if let Err(err) = &result {
                tracing::debug!(method = %method, error = %err, "notification handler failed");
            }
            None
        } else {
            Some(match result {
                Ok(value) => JsonRpcMessage::success(id, value),
                Err(err) => JsonRpcMessage::error(id, err.to_rpc_error()),
            })
        };

        DispatchOutcome {
            response,
            session_id,
        }
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(method)
            .cloned();

        let Some(handler) = handler else {
            tracing::debug!(method = %method, "method not found");
            return Err(ProtocolError::MethodNotFound(method.to_string()).into());
        };

        tracing::debug!(method = %method, "dispatching");
        handler.handle(params).await.inspect_err(|err| {
            tracing::warn!(method = %method, error = %err, "handler failed");
        })
    }
}
