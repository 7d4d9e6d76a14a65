//! Node descriptions: the manifest a host reads to render a node and route
//! its requests.

use serde::Serialize;

use crate::http::HttpMethod;
use crate::schema::{DisplayOptions, FieldDescriptor, FieldRef, OptionValue};

/// A credential the node needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRef {
    pub name: &'static str,
    pub required: bool,
}

/// Defaults applied to every request the host routes for this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefaults {
    #[serde(rename = "baseURL")]
    pub base_url: String,
    pub headers: Vec<(&'static str, &'static str)>,
}

/// One `(resource, operation)` pair and the fields it owns.
#[derive(Debug, Clone)]
pub struct OperationEntry {
    pub resource: &'static str,
    pub operation: &'static str,
    pub name: &'static str,
    pub action: &'static str,
    pub description: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDefaults {
    pub name: &'static str,
}

/// Top-level manifest for one node type.
///
/// `properties` is the flattened, ordered field list: the resource selector,
/// then per resource its operation selector followed by each operation's
/// fields, gated on the selected resource and operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub group: Vec<&'static str>,
    pub version: u32,
    /// Rendered by [`NodeDescription::subtitle`].
    pub subtitle: &'static str,
    pub defaults: NodeDefaults,
    pub usable_as_tool: bool,
    pub inputs: Vec<&'static str>,
    pub outputs: Vec<&'static str>,
    pub credentials: Vec<CredentialRef>,
    pub request_defaults: RequestDefaults,
    pub properties: Vec<FieldDescriptor>,
    #[serde(skip)]
    pub(crate) operations: Vec<OperationEntry>,
}

pub const RESOURCE_FIELD: &str = "resource";
pub const OPERATION_FIELD: &str = "operation";

impl NodeDescription {
    pub fn new(name: &'static str, display_name: &'static str, base_url: impl Into<String>) -> Self {
        Self {
            name,
            display_name,
            description: "",
            group: Vec::new(),
            version: 1,
            subtitle: "{operation}: {resource}",
            defaults: NodeDefaults { name: display_name },
            usable_as_tool: false,
            inputs: vec!["main"],
            outputs: vec!["main"],
            credentials: Vec::new(),
            request_defaults: RequestDefaults {
                base_url: base_url.into(),
                headers: Vec::new(),
            },
            properties: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn group(mut self, group: &'static str) -> Self {
        self.group.push(group);
        self
    }

    pub fn usable_as_tool(mut self) -> Self {
        self.usable_as_tool = true;
        self
    }

    pub fn credential(mut self, name: &'static str, required: bool) -> Self {
        self.credentials.push(CredentialRef { name, required });
        self
    }

    pub fn default_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.request_defaults.headers.push((name, value));
        self
    }

    /// Add the resource selector. Must come before any [`resource`](Self::resource).
    pub fn resource_selector(mut self, options: Vec<OptionValue>, default: &'static str) -> Self {
        self.properties.push(
            FieldDescriptor::options(RESOURCE_FIELD, "Resource", default, options).no_data_expression(),
        );
        self
    }

    /// Add a resource: its operation selector, then the fields of each entry.
    pub fn resource(mut self, resource: &'static str, entries: Vec<OperationEntry>) -> Self {
        let only_resource = DisplayOptions::new().when(FieldRef::Sibling(RESOURCE_FIELD), &[resource]);

        let default_operation = entries.first().map(|e| e.operation).unwrap_or_default();
        let choices = entries
            .iter()
            .map(|e| {
                OptionValue::new(e.name, e.operation)
                    .action(e.action)
                    .describe(e.description)
                    .request(e.method, e.path)
            })
            .collect();
        self.properties.push(
            FieldDescriptor::options(OPERATION_FIELD, "Operation", default_operation, choices)
                .no_data_expression()
                .show_with(&only_resource),
        );

        for entry in entries {
            let gate = only_resource
                .clone()
                .when(FieldRef::Sibling(OPERATION_FIELD), &[entry.operation]);
            self.properties
                .extend(entry.fields.iter().cloned().map(|f| f.show_with(&gate)));
            self.operations.push(entry);
        }
        self
    }

    pub fn operations(&self) -> &[OperationEntry] {
        &self.operations
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.properties.iter().find(|f| f.name == name)
    }

    /// `"<operation>: <resource>"` for the given selector values.
    pub fn subtitle(&self, resource: &str, operation: &str) -> String {
        self.subtitle
            .replace("{operation}", operation)
            .replace("{resource}", resource)
    }
}
