// Parsed API documentation (Swagger 2.0 shape) and documentation-derived schemas

use crate::error::{DocsError, DocsResult};
use crate::route::to_doc_path;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Supplies the parsed API specification. Injected explicitly wherever
/// documentation-derived schemas are needed.
pub trait DocProvider: Send + Sync {
    fn get_spec(&self) -> DocsResult<Arc<ApiSpec>>;
}

/// Documentation provider holding an already parsed specification
#[derive(Debug, Clone)]
pub struct StaticDocs {
    spec: Arc<ApiSpec>,
}

impl StaticDocs {
    pub fn new(spec: ApiSpec) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }

    pub fn from_json(json: &str) -> DocsResult<Self> {
        Ok(Self::new(ApiSpec::from_json(json)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> DocsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DocsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

impl DocProvider for StaticDocs {
    fn get_spec(&self) -> DocsResult<Arc<ApiSpec>> {
        Ok(self.spec.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSpec {
    #[serde(default)]
    pub swagger: String,
    #[serde(default)]
    pub info: Option<ApiInfo>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub definitions: BTreeMap<String, DocSchema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

/// Operations declared under one documented path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<DocOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DocOperation>,
    /// Parameters shared by every operation of the path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<DocParameter>,
}

impl PathItem {
    pub fn operation(&self, method: &str) -> Option<&DocOperation> {
        match method.to_lowercase().as_str() {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "patch" => self.patch.as_ref(),
            "head" => self.head.as_ref(),
            "options" => self.options.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocOperation {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<DocParameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    FormData,
    Body,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default)]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<DocSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<DocSchema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSchema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, DocSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<DocSchema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// `additionalProperties` is either a flag or a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<DocSchema>),
}

/// One documented method on one documented path
#[derive(Debug, Clone, Copy)]
pub struct DocRoute<'a> {
    pub path: &'a PathItem,
    pub operation: &'a DocOperation,
}

impl<'a> DocRoute<'a> {
    /// Operation parameters followed by path-level parameters the operation
    /// does not override
    pub fn parameters(&self) -> impl Iterator<Item = &'a DocParameter> {
        let operation = self.operation;
        let path = self.path;
        operation.parameters.iter().chain(path.parameters.iter().filter(move |shared| {
            !operation
                .parameters
                .iter()
                .any(|p| p.name == shared.name && p.location == shared.location)
        }))
    }

    pub fn parameter_names(&self, location: ParameterLocation) -> Vec<String> {
        self.parameters()
            .filter(|p| p.location == location)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Summary, then description, if either is non-empty
    pub fn description(&self) -> Option<&'a str> {
        let operation = self.operation;
        [operation.summary.as_str(), operation.description.as_str()]
            .into_iter()
            .find(|d| !d.is_empty())
    }
}

impl ApiSpec {
    pub fn from_json(json: &str) -> DocsResult<Self> {
        if json.trim().is_empty() {
            return Err(DocsError::Empty);
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Look up the documented operation for a route given in `:name` syntax
    pub fn route(&self, method: &str, route_path: &str) -> Option<DocRoute<'_>> {
        let path = self.paths.get(&to_doc_path(route_path))?;
        let operation = path.operation(method)?;
        Some(DocRoute { path, operation })
    }

    /// Documentation-derived input schema for a route, if the route is documented.
    ///
    /// Path, query, header and formData parameters become sibling properties.
    /// A body parameter becomes a single nested `body` property, except on GET
    /// where it is skipped entirely.
    pub fn operation_schema(&self, method: &str, route_path: &str) -> Option<Schema> {
        let route = self.route(method, route_path)?;
        let read_only = method.eq_ignore_ascii_case("GET");
        let mut schema = Schema::object();

        for param in route.parameters() {
            match param.location {
                ParameterLocation::Path
                | ParameterLocation::Query
                | ParameterLocation::Header
                | ParameterLocation::FormData => {
                    schema.insert_property(param.name.clone(), self.parameter_schema(param));
                    if param.required {
                        schema.require(param.name.clone());
                    }
                }
                ParameterLocation::Body => {
                    let Some(body) = param.schema.as_ref() else {
                        continue;
                    };
                    if read_only {
                        tracing::debug!(path = route_path, "skipping body parameter on GET operation");
                        continue;
                    }
                    schema.insert_property("body", self.resolve_schema(body));
                    if param.required {
                        schema.require("body");
                    }
                }
                ParameterLocation::Other => {}
            }
        }

        Some(schema)
    }

    fn parameter_schema(&self, param: &DocParameter) -> Schema {
        let param_type = if param.param_type.is_empty() {
            "string"
        } else {
            param.param_type.as_str()
        };

        let mut schema = Schema::primitive(param_type);
        schema.format = param.format.clone();

        if param_type == "array" {
            let items = param
                .items
                .as_ref()
                .map(|items| self.resolve_schema(items))
                .unwrap_or_default();
            schema.items = Some(Box::new(items));
        }

        schema.description = if !param.description.is_empty() {
            Some(param.description.clone())
        } else {
            match param.location {
                ParameterLocation::Header => Some(format!("Header parameter: {}", param.name)),
                ParameterLocation::FormData => Some(format!("Form data parameter: {}", param.name)),
                _ => None,
            }
        };

        schema.normalize()
    }

    /// Convert a documentation schema, resolving `#/definitions/` references.
    /// Unresolvable or cyclic references degrade to a bare object schema.
    pub fn resolve_schema(&self, schema: &DocSchema) -> Schema {
        let mut visiting = Vec::new();
        self.convert(schema, &mut visiting)
    }

    fn convert<'a>(&'a self, schema: &'a DocSchema, visiting: &mut Vec<&'a str>) -> Schema {
        if let Some(reference) = schema.reference.as_deref() {
            let target = reference
                .strip_prefix(DEFINITIONS_PREFIX)
                .and_then(|name| self.definitions.get_key_value(name));

            return match target {
                Some((name, definition)) if !visiting.contains(&name.as_str()) => {
                    visiting.push(name);
                    let resolved = self.convert(definition, visiting);
                    visiting.pop();
                    resolved
                }
                Some(_) => {
                    tracing::debug!(reference, "cyclic reference, degrading to object");
                    Schema::object()
                }
                None => {
                    tracing::debug!(reference, "unresolvable reference, degrading to object");
                    Schema::object()
                }
            };
        }

        let mut result = Schema {
            schema_type: schema.schema_type.clone(),
            description: schema.description.clone(),
            format: schema.format.clone(),
            minimum: schema.minimum.clone(),
            maximum: schema.maximum.clone(),
            required: schema.required.clone(),
            ..Default::default()
        };

        if let Some(properties) = &schema.properties {
            result.properties = Some(
                properties
                    .iter()
                    .map(|(name, prop)| (name.clone(), self.convert(prop, visiting)))
                    .collect(),
            );
        }

        if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties {
            result.additional_properties = Some(Box::new(self.convert(values, visiting)));
        }

        if let Some(items) = &schema.items {
            result.items = Some(Box::new(self.convert(items, visiting)));
        }

        result.normalize()
    }
}
