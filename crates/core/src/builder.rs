// Builds the tool list and operation registry from filtered routes

use crate::docs::{ApiSpec, ParameterLocation};
use crate::registry::RegisteredSchema;
use crate::resolver::{resolve, SchemaSource};
use crate::route::RouteDescriptor;
use crate::schema::Schema;
use crate::tool::{Operation, OperationRegistry, Tool};
use std::collections::HashMap;

const ROOT_IDENTIFIER: &str = "root";

/// Tools in route order plus the operations backing them
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tools: Vec<Tool>,
    pub operations: OperationRegistry,
}

impl Catalog {
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Stable tool identifier: `{METHOD}_{path}` with placeholder markers removed,
/// separators turned into underscores and outer underscores trimmed.
pub fn tool_name(method: &str, path: &str) -> String {
    let normalized = path.replace(':', "").replace('/', "_");
    let normalized = normalized.trim_matches('_');
    let normalized = if normalized.is_empty() {
        ROOT_IDENTIFIER
    } else {
        normalized
    };
    format!("{}_{}", method.to_uppercase(), normalized)
}

/// Build tools and operations for already filtered routes.
///
/// Identifier collisions keep the first route and drop later ones.
pub fn build_catalog(
    routes: &[RouteDescriptor],
    docs: Option<&ApiSpec>,
    registered: &HashMap<String, RegisteredSchema>,
) -> Catalog {
    let mut catalog = Catalog::default();

    for route in routes {
        if route.method.is_empty() || route.path.is_empty() {
            continue;
        }

        let name = tool_name(&route.method, &route.path);
        if catalog.operations.contains(&name) {
            tracing::warn!(
                tool = %name,
                method = %route.method,
                path = %route.path,
                "tool identifier collision, dropping route"
            );
            continue;
        }

        let source = SchemaSource::select(route, docs, registered.get(&route.schema_key()));
        tracing::debug!(tool = %name, source = source.kind(), "building tool");

        let tool = Tool {
            name: name.clone(),
            description: describe(route, docs),
            input_schema: input_schema(route, &source),
        };
        catalog.operations.insert(name, operation(route, &source));
        catalog.tools.push(tool);
    }

    catalog
}

fn describe(route: &RouteDescriptor, docs: Option<&ApiSpec>) -> String {
    docs.and_then(|spec| spec.route(&route.method, &route.path))
        .and_then(|doc| doc.description())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Execute {} request to {}", route.method, route.path))
}

fn input_schema(route: &RouteDescriptor, source: &SchemaSource<'_>) -> Schema {
    let mut schema = Schema::object();

    for param in route.placeholders() {
        schema.insert_property(
            param.clone(),
            Schema::string().with_description(format!("Path parameter: {}", param)),
        );
        schema.require(param);
    }

    schema.merge(resolve(source));

    if route.is_body_method() && !source.covers_body() && !schema.has_property("body") {
        schema.insert_property("body", Schema::object().with_description("Request body"));
    }

    schema
}

fn operation(route: &RouteDescriptor, source: &SchemaSource<'_>) -> Operation {
    let operation = Operation::new(route.method.clone(), route.path.clone());

    match source {
        SchemaSource::Doc { spec, .. } => match spec.route(&route.method, &route.path) {
            Some(doc) => operation
                .with_headers(doc.parameter_names(ParameterLocation::Header))
                .with_query(doc.parameter_names(ParameterLocation::Query))
                .with_form_data(doc.parameter_names(ParameterLocation::FormData)),
            None => operation,
        },
        SchemaSource::Registered { schema, .. } => match &schema.query {
            Some(query) => operation.with_query(query.to_schema().property_names()),
            None => operation,
        },
        SchemaSource::None => operation,
    }
}
