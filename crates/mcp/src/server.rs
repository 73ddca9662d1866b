// McpServer facade: wires route discovery, schema resolution, dispatch and execution

use crate::dispatcher::{Dispatcher, METHOD_INITIALIZE};
use crate::error::{ConfigurationError, McpResult};
use crate::execution::Executor;
use crate::handlers::{
    CallToolHandler, InitializeHandler, InitializedHandler, ListToolsHandler, METHOD_INITIALIZED,
    METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use crate::protocol::ServerInfo;
use crate::transport;
use axum::Router;
use routemcp_core::{
    build_catalog, ApiSpec, Catalog, DescribeSchema, DocProvider, RegisteredSchema, RegisteredType,
    RouteFilter, RouteProvider, SchemaRegistry, TagFilter, Tool, TypeDescriptor,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

/// Name and version reported in the handshake when none is configured or documented
pub const DEFAULT_NAME: &str = env!("CARGO_PKG_NAME");
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Host application base URL for tool execution
    pub base_url: String,
    /// Path patterns to expose; when non-empty, `exclude_operations` is ignored
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    /// Use the documentation provider, if one is attached
    pub enable_docs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            description: String::new(),
            base_url: String::new(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            enable_docs: true,
        }
    }
}

/// Exposes a host application's routes as protocol tools.
///
/// Cheap to clone; clones share registrations, filters and the catalog.
#[derive(Clone)]
pub struct McpServer {
    inner: Arc<Inner>,
}

struct Inner {
    metadata: RwLock<Metadata>,
    routes: Arc<dyn RouteProvider>,
    docs: RwLock<Option<Arc<dyn DocProvider>>>,
    enable_docs: bool,
    schemas: SchemaRegistry,
    filter: RwLock<RouteFilter>,
    tags: TagFilter,
    catalog: RwLock<Arc<Catalog>>,
    executor: Executor,
    mount_path: RwLock<Option<String>>,
}

#[derive(Debug, Clone)]
struct Metadata {
    name: String,
    version: String,
    description: String,
}

impl McpServer {
    pub fn new(config: ServerConfig, routes: Arc<dyn RouteProvider>) -> McpResult<Self> {
        let executor = Executor::new(config.base_url)?;

        Ok(Self {
            inner: Arc::new(Inner {
                metadata: RwLock::new(Metadata {
                    name: config.name,
                    version: config.version,
                    description: config.description,
                }),
                routes,
                docs: RwLock::new(None),
                enable_docs: config.enable_docs,
                schemas: SchemaRegistry::new(),
                filter: RwLock::new(RouteFilter::new(
                    config.include_operations,
                    config.exclude_operations,
                )),
                tags: TagFilter::new(config.include_tags, config.exclude_tags),
                catalog: RwLock::new(Arc::new(Catalog::default())),
                executor,
                mount_path: RwLock::new(None),
            }),
        })
    }

    /// Attach a documentation provider.
    ///
    /// Empty name, description or version are filled from the documentation's
    /// `info` block. A provider that fails here is a configuration error.
    pub fn with_docs(self, docs: Arc<dyn DocProvider>) -> McpResult<Self> {
        if self.inner.enable_docs {
            let spec = docs.get_spec().map_err(ConfigurationError::Docs)?;
            if let Some(info) = &spec.info {
                let mut metadata = self.inner.metadata.write().unwrap_or_else(|e| e.into_inner());
                fill_if_empty(&mut metadata.name, &info.title);
                fill_if_empty(&mut metadata.description, &info.description);
                fill_if_empty(&mut metadata.version, &info.version);
            }
        }

        *self.inner.docs.write().unwrap_or_else(|e| e.into_inner()) = Some(docs);
        Ok(self)
    }

    /// Server name and version announced in the handshake
    pub fn info(&self) -> ServerInfo {
        let metadata = self.inner.metadata.read().unwrap_or_else(|e| e.into_inner());
        ServerInfo {
            name: or_default(&metadata.name, DEFAULT_NAME),
            version: or_default(&metadata.version, DEFAULT_VERSION),
        }
    }

    pub fn description(&self) -> String {
        self.inner
            .metadata
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .description
            .clone()
    }

    pub fn base_url(&self) -> &str {
        self.inner.executor.base_url()
    }

    pub fn mount_path(&self) -> Option<String> {
        self.inner.mount_path.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Register query and body type descriptions for `method path`
    pub fn register_schema(
        &self,
        method: &str,
        path: &str,
        query: Option<TypeDescriptor>,
        body: Option<TypeDescriptor>,
    ) {
        self.inner.schemas.register(
            method,
            path,
            RegisteredSchema {
                query: query.map(RegisteredType::from),
                body: body.map(RegisteredType::from),
            },
        );
    }

    pub fn register_types<Q: DescribeSchema, B: DescribeSchema>(&self, method: &str, path: &str) {
        self.register_schema(method, path, Some(Q::describe()), Some(B::describe()));
    }

    /// Register sample values whose serialized form is introspected.
    /// Non-object samples yield an empty object schema.
    pub fn register_sample_schema<Q: Serialize, B: Serialize>(
        &self,
        method: &str,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> McpResult<()> {
        let registered = RegisteredSchema {
            query: sample(query)?,
            body: sample(body)?,
        };
        self.inner.schemas.register(method, path, registered);
        Ok(())
    }

    pub fn set_include(&self, patterns: Vec<String>) {
        self.inner.filter.write().unwrap_or_else(|e| e.into_inner()).include = patterns;
    }

    pub fn set_exclude(&self, patterns: Vec<String>) {
        self.inner.filter.write().unwrap_or_else(|e| e.into_inner()).exclude = patterns;
    }

    /// Rebuild the catalog from the current routes and return its tools
    pub fn tools(&self) -> Vec<Tool> {
        self.rebuild().tools.clone()
    }

    /// Execute a tool by name against the host application.
    ///
    /// Uses the current catalog; a name it does not know triggers one rebuild.
    pub async fn execute(&self, name: &str, arguments: &Map<String, Value>) -> McpResult<Value> {
        let mut catalog = self.catalog();
        if !catalog.operations.contains(name) {
            catalog = self.rebuild();
        }
        Ok(self
            .inner
            .executor
            .execute(&catalog.operations, name, arguments)
            .await?)
    }

    /// Build the protocol endpoint router for `path`.
    ///
    /// The mount path itself is never exposed as a tool.
    pub fn mount(&self, path: &str) -> McpResult<Router> {
        validate_mount_path(path)?;
        *self.inner.mount_path.write().unwrap_or_else(|e| e.into_inner()) = Some(path.to_string());

        let dispatcher = Dispatcher::new();
        dispatcher.register(METHOD_INITIALIZE, Arc::new(InitializeHandler::new(self.clone())));
        dispatcher.register(METHOD_INITIALIZED, Arc::new(InitializedHandler));
        dispatcher.register(METHOD_TOOLS_LIST, Arc::new(ListToolsHandler::new(self.clone())));
        dispatcher.register(METHOD_TOOLS_CALL, Arc::new(CallToolHandler::new(self.clone())));

        let catalog = self.rebuild();
        tracing::info!(path = %path, tools = catalog.len(), "mounted MCP endpoint");

        Ok(transport::router(Arc::new(dispatcher), path))
    }

    fn catalog(&self) -> Arc<Catalog> {
        self.inner.catalog.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn rebuild(&self) -> Arc<Catalog> {
        let mount_path = self.mount_path();
        let filter = self.inner.filter.read().unwrap_or_else(|e| e.into_inner()).clone();
        let spec = self.spec();

        let routes = filter.apply(self.inner.routes.list_routes(), mount_path.as_deref());
        let routes = self.inner.tags.apply(routes, spec.as_deref());

        let catalog = Arc::new(build_catalog(
            &routes,
            spec.as_deref(),
            &self.inner.schemas.snapshot(),
        ));
        tracing::debug!(tools = catalog.len(), "tool catalog rebuilt");

        *self.inner.catalog.write().unwrap_or_else(|e| e.into_inner()) = catalog.clone();
        catalog
    }

    /// Documentation failures after setup degrade to the other schema tiers
    fn spec(&self) -> Option<Arc<ApiSpec>> {
        if !self.inner.enable_docs {
            return None;
        }
        let docs = self.inner.docs.read().unwrap_or_else(|e| e.into_inner()).clone()?;
        docs.get_spec()
            .inspect_err(|err| tracing::warn!(error = %err, "API documentation unavailable"))
            .ok()
    }
}

/// The endpoint is a single literal route; captures and wildcards are refused
fn validate_mount_path(path: &str) -> McpResult<()> {
    let reason = if !path.starts_with('/') {
        Some("must start with '/'")
    } else if path.contains(['{', '}']) {
        Some("must not contain '{' or '}'")
    } else if path.split('/').any(|segment| segment.starts_with([':', '*'])) {
        Some("segments must not start with ':' or '*'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigurationError::InvalidMountPath {
            path: path.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

fn or_default(value: &str, default: &str) -> String {
    let value = if value.is_empty() { default } else { value };
    value.to_string()
}

fn fill_if_empty(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        *target = value.to_string();
    }
}

fn sample<T: Serialize>(value: Option<&T>) -> McpResult<Option<RegisteredType>> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map(|value| value.map(RegisteredType::Sample))
        .map_err(|e| ConfigurationError::InvalidSample(e).into())
}
