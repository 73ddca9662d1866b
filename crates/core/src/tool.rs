// Tool definitions and the operation metadata that backs them

use crate::route::{is_body_method, placeholders};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Discoverable, schema-described callable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Schema,
}

/// Where an argument ends up in the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Header,
    Query,
    FormData,
    Body,
}

/// Execution metadata backing a tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub header_params: BTreeSet<String>,
    #[serde(default)]
    pub query_params: BTreeSet<String>,
    #[serde(default)]
    pub form_data_params: BTreeSet<String>,
}

impl Operation {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_params.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_query<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_params.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_form_data<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_data_params.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn placeholders(&self) -> Vec<String> {
        placeholders(&self.path)
    }

    pub fn is_body_method(&self) -> bool {
        is_body_method(&self.method)
    }

    /// Classify an argument name. Path placeholders come first, then header,
    /// query and form data; everything else is body content.
    pub fn location(&self, name: &str) -> ParamLocation {
        if self.placeholders().iter().any(|p| p == name) {
            ParamLocation::Path
        } else if self.header_params.contains(name) {
            ParamLocation::Header
        } else if self.query_params.contains(name) {
            ParamLocation::Query
        } else if self.form_data_params.contains(name) {
            ParamLocation::FormData
        } else {
            ParamLocation::Body
        }
    }
}

/// Operations keyed by tool name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationRegistry {
    operations: HashMap<String, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, operation: Operation) {
        self.operations.insert(name.into(), operation);
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }
}
