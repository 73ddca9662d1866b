// Normalized input schemas exposed to protocol clients

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Normalized structural description of accepted input.
///
/// Object schemas always carry a `properties` mapping (possibly empty) and
/// array schemas always carry `items`. The constructors below keep that
/// invariant; [`Schema::normalize`] restores it for schemas built by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    /// `{type: "object", properties: {}}`
    pub fn object() -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(BTreeMap::new()),
            ..Default::default()
        }
    }

    pub fn primitive(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::primitive("string")
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Object keyed by arbitrary strings, every value matching `values`
    pub fn map(values: Schema) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::object()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_object(&self) -> bool {
        self.schema_type.as_deref() == Some("object")
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn property_names(&self) -> Vec<String> {
        self.properties
            .as_ref()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn insert_property(&mut self, name: impl Into<String>, schema: Schema) {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema);
    }

    /// Add `name` to `required`, keeping first-seen order and no duplicates
    pub fn require(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Merge another object schema's properties and required names into this one.
    /// Properties from `other` win on key collision.
    pub fn merge(&mut self, other: Schema) {
        if let Some(props) = other.properties {
            let target = self.properties.get_or_insert_with(BTreeMap::new);
            target.extend(props);
        }
        for name in other.required {
            self.require(name);
        }
    }

    /// Restore the object/array invariants recursively
    pub fn normalize(mut self) -> Self {
        match self.schema_type.as_deref() {
            Some("object") if self.properties.is_none() => {
                self.properties = Some(BTreeMap::new());
            }
            Some("array") if self.items.is_none() => {
                self.items = Some(Box::default());
            }
            _ => {}
        }
        if let Some(props) = self.properties.take() {
            self.properties = Some(
                props
                    .into_iter()
                    .map(|(name, schema)| (name, schema.normalize()))
                    .collect(),
            );
        }
        self.items = self.items.map(|items| Box::new(items.normalize()));
        self.additional_properties = self
            .additional_properties
            .map(|values| Box::new(values.normalize()));
        self
    }

    /// Apply `description=`, `minimum=` and `maximum=` annotation tokens.
    /// Numeric bounds that fail to parse are dropped.
    pub fn apply_annotations<S: AsRef<str>>(&mut self, annotations: &[S]) {
        for token in annotation_tokens(annotations) {
            if let Some(description) = token.strip_prefix("description=") {
                self.description = Some(description.to_string());
            } else if let Some(minimum) = token.strip_prefix("minimum=") {
                if let Some(minimum) = parse_bound(minimum) {
                    self.minimum = Some(minimum);
                }
            } else if let Some(maximum) = token.strip_prefix("maximum=") {
                if let Some(maximum) = parse_bound(maximum) {
                    self.maximum = Some(maximum);
                }
            }
        }
    }

    /// Introspect a sample value.
    ///
    /// Object values yield one property per key; anything else yields an empty
    /// object schema.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let mut schema = Self::object();
                for (name, field) in map {
                    schema.insert_property(name.clone(), infer_field(field));
                }
                schema
            }
            other => {
                tracing::debug!(kind = value_kind(other), "cannot introspect non-object sample");
                Self::object()
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

fn infer_field(value: &Value) -> Schema {
    match value {
        Value::Bool(_) => Schema::primitive("boolean"),
        Value::Number(n) if n.is_f64() => Schema::primitive("number"),
        Value::Number(_) => Schema::primitive("integer"),
        Value::Array(items) => Schema::array(items.first().map(infer_field).unwrap_or_else(Schema::string)),
        Value::Object(_) => Schema::infer(value),
        Value::String(_) | Value::Null => Schema::string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integer bounds stay integers on the wire; non-finite values are dropped
fn parse_bound(raw: &str) -> Option<Number> {
    raw.parse::<i64>()
        .map(Number::from)
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
}

/// Split annotations on commas into trimmed, non-empty tokens
pub fn annotation_tokens<S: AsRef<str>>(annotations: &[S]) -> impl Iterator<Item = &str> {
    annotations
        .iter()
        .flat_map(|a| a.as_ref().split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// True if any annotation carries the literal `required` token
pub fn has_required_token<S: AsRef<str>>(annotations: &[S]) -> bool {
    annotation_tokens(annotations).any(|t| t == "required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_serializes_with_properties() {
        let value = serde_json::to_value(Schema::object()).unwrap();
        assert_eq!(value, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_require_is_an_ordered_set() {
        let mut schema = Schema::object();
        schema.require("id");
        schema.require("name");
        schema.require("id");
        assert_eq!(schema.required, vec!["id", "name"]);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = Schema::object();
        base.insert_property("id", Schema::string().with_description("Path parameter: id"));
        base.require("id");

        let mut other = Schema::object();
        other.insert_property("id", Schema::primitive("integer"));
        other.insert_property("page", Schema::primitive("integer"));
        other.require("page");
        other.require("id");

        base.merge(other);
        assert_eq!(base.property("id").unwrap().schema_type.as_deref(), Some("integer"));
        assert!(base.has_property("page"));
        assert_eq!(base.required, vec!["id", "page"]);
    }

    #[test]
    fn test_apply_annotations() {
        let mut schema = Schema::primitive("integer");
        schema.apply_annotations(&["required,minimum=1", "maximum=100", "description=Page number"]);

        assert_eq!(schema.minimum, Some(Number::from(1)));
        assert_eq!(schema.maximum, Some(Number::from(100)));
        assert_eq!(schema.description.as_deref(), Some("Page number"));

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["minimum"].to_string(), "1");
        assert_eq!(value["maximum"].to_string(), "100");
    }

    #[test]
    fn test_fractional_bounds() {
        let mut schema = Schema::primitive("number");
        schema.apply_annotations(&["minimum=0.5,maximum=inf"]);
        assert_eq!(schema.minimum, Number::from_f64(0.5));
        assert!(schema.maximum.is_none());
    }

    #[test]
    fn test_malformed_bounds_are_dropped() {
        let mut schema = Schema::primitive("integer");
        schema.apply_annotations(&["minimum=abc,maximum=", "minimum=2x"]);
        assert!(schema.minimum.is_none());
        assert!(schema.maximum.is_none());
    }

    #[test]
    fn test_required_token() {
        assert!(has_required_token(&["page", "required"]));
        assert!(has_required_token(&["minimum=1, required"]));
        assert!(!has_required_token(&["description=not required here"]));
        assert!(!has_required_token::<&str>(&[]));
    }

    #[test]
    fn test_infer_from_sample() {
        let schema = Schema::infer(&json!({
            "name": "",
            "age": 0,
            "score": 0.5,
            "active": false,
            "tags": ["a"],
            "address": {"city": ""}
        }));

        assert!(schema.is_object());
        assert_eq!(schema.property("name").unwrap().schema_type.as_deref(), Some("string"));
        assert_eq!(schema.property("age").unwrap().schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.property("score").unwrap().schema_type.as_deref(), Some("number"));
        assert_eq!(schema.property("active").unwrap().schema_type.as_deref(), Some("boolean"));

        let tags = schema.property("tags").unwrap();
        assert_eq!(tags.schema_type.as_deref(), Some("array"));
        assert_eq!(tags.items.as_ref().unwrap().schema_type.as_deref(), Some("string"));

        let address = schema.property("address").unwrap();
        assert!(address.is_object());
        assert!(address.has_property("city"));
    }

    #[test]
    fn test_infer_non_object_defaults_to_empty_object() {
        for sample in [json!(null), json!(42), json!("text"), json!([1, 2])] {
            assert_eq!(Schema::infer(&sample), Schema::object());
        }
    }

    #[test]
    fn test_normalize_fills_invariants() {
        let schema = Schema::primitive("object").normalize();
        assert_eq!(schema.properties, Some(BTreeMap::new()));

        let mut nested = Schema::primitive("object");
        nested.insert_property("list", Schema::primitive("array"));
        let nested = nested.normalize();
        assert!(nested.property("list").unwrap().items.is_some());
    }
}
