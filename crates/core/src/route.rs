// Route descriptors consumed from the host application's routing table

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\w+)").expect("placeholder pattern is valid"));

/// A single `{method, path}` entry of the host routing table.
///
/// Variable segments use the `:name` placeholder syntax, e.g. `/users/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub method: String,
    pub path: String,
}

impl RouteDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> Vec<String> {
        placeholders(&self.path)
    }

    /// Key used to look up manually registered schemas
    pub fn schema_key(&self) -> String {
        schema_key(&self.method, &self.path)
    }

    pub fn is_body_method(&self) -> bool {
        is_body_method(&self.method)
    }
}

/// Source of the host application's routes
pub trait RouteProvider: Send + Sync {
    fn list_routes(&self) -> Vec<RouteDescriptor>;
}

/// Route provider backed by a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    routes: Vec<RouteDescriptor>,
}

impl StaticRoutes {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    pub fn push(&mut self, method: impl Into<String>, path: impl Into<String>) {
        self.routes.push(RouteDescriptor::new(method, path));
    }

    /// Parse a JSON array of `{"method": .., "path": ..}` objects
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl RouteProvider for StaticRoutes {
    fn list_routes(&self) -> Vec<RouteDescriptor> {
        self.routes.clone()
    }
}

/// Extract `:name` placeholders from a route path
pub fn placeholders(path: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// Convert `:name` placeholders to the `{name}` form used by API documentation
pub fn to_doc_path(path: &str) -> String {
    PLACEHOLDER.replace_all(path, "{$1}").into_owned()
}

/// Replace each `:name` placeholder with `lookup(name)`. Placeholders the
/// lookup has no value for are left in place.
pub fn fill_placeholders<F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(path, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn schema_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_uppercase(), path)
}

/// POST, PUT and PATCH carry a request body
pub fn is_body_method(method: &str) -> bool {
    matches!(method.to_uppercase().as_str(), "POST" | "PUT" | "PATCH")
}
