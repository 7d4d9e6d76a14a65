//! Field descriptors: what a node asks the user for, when each input is
//! shown, and how its value lands in the request body.
//!
//! Visibility predicates and body mappings are plain data evaluated by
//! [`visibility`] and [`mapping`]; there is no expression language.

pub mod mapping;
pub mod visibility;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::HttpMethod;

pub use mapping::{BodyMapping, Routing};
pub use visibility::{validate_schema, Condition, DisplayOptions, FieldRef};

/// Input widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Boolean,
    Options,
    Json,
    DateTime,
    Collection,
}

/// One selectable value of an `options` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionValue {
    pub name: &'static str,
    pub value: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    /// Human label of the action this option performs (operation selectors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    /// HTTP route selected by this option (operation selectors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestRoute>,
}

/// Method and path an operation option routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestRoute {
    pub method: HttpMethod,
    pub url: &'static str,
}

impl OptionValue {
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            description: None,
            action: None,
            request: None,
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn action(mut self, action: &'static str) -> Self {
        self.action = Some(action);
        self
    }

    pub fn request(mut self, method: HttpMethod, url: &'static str) -> Self {
        self.request = Some(RequestRoute { method, url });
        self
    }
}

/// Metadata for one user-configurable input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub default: Value,
    pub required: bool,
    /// Masked input (credential secrets).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    /// Value must be literal; host expressions are not allowed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_data_expression: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    /// Choices for `Options` fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,
    /// Children of a `Collection` field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
    #[serde(skip_serializing_if = "DisplayOptions::is_empty")]
    pub display: DisplayOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<Routing>,
}

impl FieldDescriptor {
    fn new(name: &'static str, display_name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self {
            name,
            display_name,
            kind,
            default,
            required: false,
            password: false,
            no_data_expression: false,
            placeholder: None,
            description: None,
            options: Vec::new(),
            fields: Vec::new(),
            display: DisplayOptions::default(),
            routing: None,
        }
    }

    pub fn string(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldKind::String, Value::String(String::new()))
    }

    pub fn boolean(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldKind::Boolean, Value::Bool(false))
    }

    pub fn date_time(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldKind::DateTime, Value::String(String::new()))
    }

    pub fn json(name: &'static str, display_name: &'static str, default: &'static str) -> Self {
        Self::new(name, display_name, FieldKind::Json, Value::String(default.to_string()))
    }

    pub fn options(
        name: &'static str,
        display_name: &'static str,
        default: &'static str,
        options: Vec<OptionValue>,
    ) -> Self {
        let mut field = Self::new(name, display_name, FieldKind::Options, Value::String(default.to_string()));
        field.options = options;
        field
    }

    pub fn collection(name: &'static str, display_name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        let mut field = Self::new(name, display_name, FieldKind::Collection, Value::Object(Map::new()));
        field.fields = fields;
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn password(mut self) -> Self {
        self.password = true;
        self
    }

    pub fn no_data_expression(mut self) -> Self {
        self.no_data_expression = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn show_when(mut self, field: FieldRef, values: &[&'static str]) -> Self {
        self.display.show.push(Condition::new(field, values));
        self
    }

    /// Show only when every condition in `display` also holds.
    pub fn show_with(mut self, display: &DisplayOptions) -> Self {
        self.display.show.extend(display.show.iter().cloned());
        self
    }

    pub fn route(mut self, property: &'static str, mapping: BodyMapping) -> Self {
        self.routing = Some(Routing { property, mapping });
        self
    }

    pub fn is_collection(&self) -> bool {
        self.kind == FieldKind::Collection
    }

    /// Whether `value` is one of the declared choices of an `Options` field.
    pub fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// The resolved parameters of one node invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    values: Map<String, Value>,
}

impl ParameterBag {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// The supplied value, or the field's default when absent.
    pub fn value_or_default<'a>(&'a self, field: &'a FieldDescriptor) -> &'a Value {
        self.get(field.name).unwrap_or(&field.default)
    }

    /// Entries of a collection parameter; `None` when absent.
    pub fn collection(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_object)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }
}

impl TryFrom<Value> for ParameterBag {
    type Error = crate::NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(crate::NodeError::invalid(
                "parameters",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }
}
