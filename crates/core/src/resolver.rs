// Three-tier schema resolution: documentation, registration, introspection fallback

use crate::docs::ApiSpec;
use crate::registry::RegisteredSchema;
use crate::route::{is_body_method, RouteDescriptor};
use crate::schema::Schema;

/// Where a route's input schema comes from
#[derive(Debug, Clone, Copy)]
pub enum SchemaSource<'a> {
    /// Documentation-derived; always preferred when the route is documented
    Doc { spec: &'a ApiSpec, route: &'a RouteDescriptor },
    /// Manually registered query/body types
    Registered { schema: &'a RegisteredSchema, route: &'a RouteDescriptor },
    /// Nothing known about the route
    None,
}

impl<'a> SchemaSource<'a> {
    /// Pick the highest-priority source available for `route`
    pub fn select(
        route: &'a RouteDescriptor,
        docs: Option<&'a ApiSpec>,
        registered: Option<&'a RegisteredSchema>,
    ) -> Self {
        if let Some(spec) = docs {
            if spec.route(&route.method, &route.path).is_some() {
                return Self::Doc { spec, route };
            }
        }
        match registered {
            Some(schema) => Self::Registered { schema, route },
            None => Self::None,
        }
    }

    /// Whether this source already describes the request body
    pub fn covers_body(&self) -> bool {
        match self {
            Self::Doc { .. } => true,
            Self::Registered { schema, .. } => schema.body.is_some(),
            Self::None => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Doc { .. } => "documentation",
            Self::Registered { .. } => "registered",
            Self::None => "none",
        }
    }
}

/// Resolve a source into an object schema. Never fails; an unusable source
/// yields an empty object schema.
pub fn resolve(source: &SchemaSource<'_>) -> Schema {
    match source {
        SchemaSource::Doc { spec, route } => spec
            .operation_schema(&route.method, &route.path)
            .unwrap_or_else(Schema::object),
        SchemaSource::Registered { schema, route } => {
            let mut resolved = Schema::object();
            if let Some(query) = &schema.query {
                resolved.merge(query.to_schema());
            }
            if is_body_method(&route.method) {
                if let Some(body) = &schema.body {
                    resolved.merge(body.to_schema());
                }
            }
            resolved
        }
        SchemaSource::None => Schema::object(),
    }
}
