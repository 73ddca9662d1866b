// Self-describing types for manual schema registration

use crate::schema::{has_required_token, Schema};

/// Implemented by request types that can describe their own shape.
///
/// ```
/// use routemcp_core::describe::{DescribeSchema, FieldDescriptor, FieldKind, TypeDescriptor};
///
/// struct UserQuery;
///
/// impl DescribeSchema for UserQuery {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::new("UserQuery")
///             .field(FieldDescriptor::new("page", FieldKind::Integer).annotate("required,minimum=1"))
///             .field(FieldDescriptor::new("limit", FieldKind::Integer).annotate("maximum=100"))
///     }
/// }
///
/// let schema = UserQuery::describe().to_schema();
/// assert!(schema.is_required("page"));
/// ```
pub trait DescribeSchema {
    fn describe() -> TypeDescriptor;
}

/// Shape of a composite type: a name and its fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: String,
    /// Serialization alias, used as the property name when present
    pub alias: Option<String>,
    pub kind: FieldKind,
    /// Declarative annotations, e.g. `"required,minimum=1"`
    pub annotations: Vec<String>,
    /// Field is never serialized and never exposed
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Integer,
    Number,
    Boolean,
    String,
    Sequence(Box<FieldKind>),
    Mapping(Box<FieldKind>),
    Composite(TypeDescriptor),
    Optional(Box<FieldKind>),
    /// Anything without a better mapping; exposed as a string
    Opaque,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn of<T: DescribeSchema>() -> Self {
        T::describe()
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Object schema with one property per exposed field
    pub fn to_schema(&self) -> Schema {
        let mut schema = Schema::object();

        for field in self.fields.iter().filter(|f| !f.skip) {
            let name = field.property_name().to_string();
            let mut property = field.kind.to_schema();
            property.apply_annotations(&field.annotations);

            if has_required_token(&field.annotations) {
                schema.require(name.clone());
            }
            schema.insert_property(name, property);
        }

        schema
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
            annotations: Vec::new(),
            skip: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn annotate(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn property_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.name)
    }
}

impl FieldKind {
    pub fn sequence(items: FieldKind) -> Self {
        Self::Sequence(Box::new(items))
    }

    pub fn mapping(values: FieldKind) -> Self {
        Self::Mapping(Box::new(values))
    }

    pub fn optional(inner: FieldKind) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn composite<T: DescribeSchema>() -> Self {
        Self::Composite(T::describe())
    }

    pub fn to_schema(&self) -> Schema {
        match self {
            Self::Integer => Schema::primitive("integer"),
            Self::Number => Schema::primitive("number"),
            Self::Boolean => Schema::primitive("boolean"),
            Self::String | Self::Opaque => Schema::string(),
            Self::Sequence(items) => Schema::array(items.to_schema()),
            Self::Mapping(values) => Schema::map(values.to_schema()),
            Self::Composite(descriptor) => descriptor.to_schema(),
            Self::Optional(inner) => inner.to_schema(),
        }
    }
}
