// Core schema resolution and tool building for routemcp
// Turns a host application's route table into protocol tools

pub mod builder;
pub mod describe;
pub mod docs;
pub mod error;
pub mod filter;
pub mod registry;
pub mod resolver;
pub mod route;
pub mod schema;
pub mod tool;

pub use builder::{build_catalog, tool_name, Catalog};
pub use describe::{DescribeSchema, FieldDescriptor, FieldKind, TypeDescriptor};
pub use docs::{ApiSpec, DocProvider, StaticDocs};
pub use error::{DocsError, DocsResult};
pub use filter::{RouteFilter, TagFilter};
pub use registry::{RegisteredSchema, RegisteredType, SchemaRegistry};
pub use resolver::{resolve, SchemaSource};
pub use route::{fill_placeholders, RouteDescriptor, RouteProvider, StaticRoutes};
pub use schema::Schema;
pub use tool::{Operation, OperationRegistry, ParamLocation, Tool};
