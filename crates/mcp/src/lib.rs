// MCP (Model Context Protocol) bridge for HTTP applications
// Serves a host application's routes to agent clients as callable tools

pub mod dispatcher;
pub mod error;
pub mod execution;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use dispatcher::{handler_fn, DispatchOutcome, Dispatcher, MethodHandler};
pub use error::{ConfigurationError, ExecutionError, McpError, McpResult, ProtocolError};
pub use execution::{build_request, Executor, PreparedRequest, RequestBody};
pub use protocol::{JsonRpcError, JsonRpcMessage};
pub use server::{McpServer, ServerConfig};
pub use session::{Session, SessionStore};
pub use transport::SESSION_HEADER;
