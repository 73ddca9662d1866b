// Manually registered schema sources keyed by `METHOD path`

use crate::describe::TypeDescriptor;
use crate::route::schema_key;
use crate::schema::Schema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// A type supplied for manual registration
#[derive(Debug, Clone, PartialEq)]
pub enum RegisteredType {
    /// Explicit self-description
    Described(TypeDescriptor),
    /// Serialized sample instance, introspected by JSON kind
    Sample(Value),
}

impl RegisteredType {
    pub fn to_schema(&self) -> Schema {
        match self {
            Self::Described(descriptor) => descriptor.to_schema(),
            Self::Sample(value) => Schema::infer(value),
        }
    }
}

impl From<TypeDescriptor> for RegisteredType {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Described(descriptor)
    }
}

/// Optional query and body types registered for one route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisteredSchema {
    pub query: Option<RegisteredType>,
    pub body: Option<RegisteredType>,
}

/// Registered schemas shared between registration calls and catalog builds
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: RwLock<HashMap<String, RegisteredSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the schemas for `method path`
    pub fn register(&self, method: &str, path: &str, schema: RegisteredSchema) {
        let key = schema_key(method, path);
        tracing::debug!(key = %key, "registering schema");
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, schema);
    }

    pub fn get(&self, method: &str, path: &str) -> Option<RegisteredSchema> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&schema_key(method, path))
            .cloned()
    }

    /// Copy of all entries, taken once per catalog build
    pub fn snapshot(&self) -> HashMap<String, RegisteredSchema> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{FieldDescriptor, FieldKind};
    use serde_json::json;

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        let query = TypeDescriptor::new("Query").field(FieldDescriptor::new("page", FieldKind::Integer));

        registry.register(
            "GET",
            "/users",
            RegisteredSchema {
                query: Some(query.into()),
                body: None,
            },
        );
        registry.register("post", "/users", RegisteredSchema::default());

        assert_eq!(registry.len(), 2);
        assert!(registry.get("get", "/users").unwrap().query.is_some());
        assert!(registry.get("POST", "/users").is_some());
        assert!(registry.get("GET", "/orders").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let registry = SchemaRegistry::new();
        registry.register("GET", "/users", RegisteredSchema::default());
        registry.register(
            "GET",
            "/users",
            RegisteredSchema {
                query: Some(RegisteredType::Sample(json!({"q": ""}))),
                body: None,
            },
        );

        assert_eq!(registry.len(), 1);
        let snapshot = registry.snapshot();
        assert!(snapshot["GET /users"].query.is_some());
    }

    #[test]
    fn test_sample_type_introspection() {
        let sample = RegisteredType::Sample(json!({"limit": 10, "name": "x"}));
        let schema = sample.to_schema();
        assert_eq!(schema.property_names(), vec!["limit", "name"]);

        let scalar = RegisteredType::Sample(json!(3));
        assert_eq!(scalar.to_schema(), Schema::object());
    }
}
