//! Operation routing: pick the `(resource, operation)` entry for a parameter
//! bag and fold its visible fields into a request body.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::description::{NodeDescription, OperationEntry, OPERATION_FIELD, RESOURCE_FIELD};
use crate::http::HttpMethod;
use crate::schema::mapping::is_blank;
use crate::schema::visibility::Scope;
use crate::schema::{FieldDescriptor, FieldKind, ParameterBag};
use crate::NodeError;

/// A request ready to hand to the transport helper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedRequest {
    pub resource: &'static str,
    pub operation: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub body: Map<String, Value>,
}

impl NodeDescription {
    /// Resolve the operation entry, filling in selector defaults.
    ///
    /// The returned bag always carries explicit `resource` and `operation`
    /// values so later visibility checks never depend on which of several
    /// same-named selectors supplies a default.
    pub fn resolve_operation(&self, params: ParameterBag) -> Result<(&OperationEntry, ParameterBag), NodeError> {
        let mut params = params;

        let resource = selector_value(&params, self.field(RESOURCE_FIELD), RESOURCE_FIELD)?;
        if let Some(field) = self.field(RESOURCE_FIELD) {
            if !field.allows(&resource) {
                return Err(NodeError::invalid(
                    RESOURCE_FIELD,
                    format!("'{resource}' is not one of {}", choices(field)),
                ));
            }
        }

        let default_operation = self
            .operations
            .iter()
            .find(|e| e.resource == resource)
            .map(|e| e.operation)
            .unwrap_or_default();
        let operation = match params.get(OPERATION_FIELD) {
            None => default_operation.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(NodeError::invalid(OPERATION_FIELD, format!("expected a string, got {other}")))
            }
        };

        let entry = self
            .operations
            .iter()
            .find(|e| e.resource == resource && e.operation == operation)
            .ok_or_else(|| NodeError::UnknownOperation {
                resource: resource.clone(),
                operation: operation.clone(),
            })?;

        params.insert(RESOURCE_FIELD, Value::String(resource));
        params.insert(OPERATION_FIELD, Value::String(operation));
        Ok((entry, params))
    }

    /// Fields visible for the current values, in declaration order.
    ///
    /// Collection children follow their collection and are listed whether or
    /// not they have been added.
    pub fn visible_fields(&self, params: ParameterBag) -> Result<Vec<&FieldDescriptor>, NodeError> {
        let (_, params) = self.resolve_operation(params)?;
        let root = Scope::new(&self.properties, Some(params.as_map()));

        let mut visible = Vec::new();
        for field in &self.properties {
            if !field.display.is_satisfied(&root, &root) {
                continue;
            }
            visible.push(field);
            if field.is_collection() {
                let local = Scope::new(&field.fields, params.collection(field.name));
                visible.extend(field.fields.iter().filter(|c| c.display.is_satisfied(&root, &local)));
            }
        }
        Ok(visible)
    }

    /// Validate the parameters and build the request body.
    ///
    /// Required fields that are blank, values outside an `options` list, and
    /// malformed values are rejected here, before anything is sent.
    pub fn build_request(&self, params: ParameterBag) -> Result<RoutedRequest, NodeError> {
        let (entry, params) = self.resolve_operation(params)?;
        let root = Scope::new(&self.properties, Some(params.as_map()));

        let mut body = Map::new();
        for field in &self.properties {
            if !field.display.is_satisfied(&root, &root) {
                continue;
            }
            if field.is_collection() {
                fold_collection(field, &params, &root, &mut body)?;
            } else {
                let raw = params.value_or_default(field);
                check_value(field, raw)?;
                insert_mapped(field, raw, &mut body)?;
            }
        }

        Ok(RoutedRequest {
            resource: entry.resource,
            operation: entry.operation,
            method: entry.method,
            path: entry.path,
            body,
        })
    }
}

fn selector_value(params: &ParameterBag, field: Option<&FieldDescriptor>, name: &str) -> Result<String, NodeError> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(NodeError::invalid(name, format!("expected a string, got {other}"))),
        None => Ok(field
            .and_then(|f| f.default.as_str())
            .unwrap_or_default()
            .to_string()),
    }
}

fn choices(field: &FieldDescriptor) -> String {
    let values: Vec<&str> = field.options.iter().map(|o| o.value).collect();
    format!("[{}]", values.join(", "))
}

fn check_value(field: &FieldDescriptor, raw: &Value) -> Result<(), NodeError> {
    if field.required && is_blank(field.kind, raw) {
        return Err(NodeError::invalid(field.name, "a value is required"));
    }
    if field.kind == FieldKind::Options {
        let value = raw
            .as_str()
            .ok_or_else(|| NodeError::invalid(field.name, format!("expected a string, got {raw}")))?;
        if !field.allows(value) {
            return Err(NodeError::invalid(
                field.name,
                format!("'{value}' is not one of {}", choices(field)),
            ));
        }
    }
    Ok(())
}

fn insert_mapped(field: &FieldDescriptor, raw: &Value, body: &mut Map<String, Value>) -> Result<(), NodeError> {
    let Some(routing) = field.routing else {
        return Ok(());
    };
    if let Some(value) = routing.mapping.apply(field.name, raw)? {
        body.insert(routing.property.to_string(), value);
    }
    Ok(())
}

/// Fold an `options`-style collection into the body.
///
/// An absent or empty collection contributes nothing. Otherwise every
/// visible entry is mapped; visible booleans that were not added are sent
/// with their default, other missing entries are left out.
fn fold_collection(
    field: &FieldDescriptor,
    params: &ParameterBag,
    root: &Scope<'_>,
    body: &mut Map<String, Value>,
) -> Result<(), NodeError> {
    let entries = match params.get(field.name) {
        None => return Ok(()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(NodeError::invalid(field.name, format!("expected an object, got {other}")))
        }
    };
    if entries.is_empty() {
        return Ok(());
    }

    if let Some(unknown) = entries.keys().find(|k| !field.fields.iter().any(|c| c.name == k.as_str())) {
        return Err(NodeError::invalid(
            format!("{}.{unknown}", field.name),
            "unknown option",
        ));
    }

    let local = Scope::new(&field.fields, Some(entries));
    for child in &field.fields {
        let supplied = entries.get(child.name).filter(|v| !v.is_null());
        if !child.display.is_satisfied(root, &local) {
            if supplied.is_some() {
                debug!(option = child.name, "dropping option hidden by current settings");
            }
            continue;
        }
        let raw = match supplied {
            Some(value) => value,
            None if child.kind == FieldKind::Boolean => &child.default,
            None => continue,
        };
        check_value(child, raw)?;
        insert_mapped(child, raw, body)?;
    }
    Ok(())
}
