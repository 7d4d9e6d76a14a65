//! Display conditions and the schema ordering check.
//!
//! A field is visible when every condition in its `show` list holds. A
//! condition holds when the referenced field's current value (or its default)
//! is one of the allowed values.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::FieldDescriptor;
use crate::error::SchemaError;

/// Reference from a display condition to another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    /// A field in the same scope (top level, or the same collection).
    Sibling(&'static str),
    /// A top-level parameter referenced from inside a collection.
    Root(&'static str),
}

impl FieldRef {
    pub fn name(&self) -> &'static str {
        match self {
            FieldRef::Sibling(name) | FieldRef::Root(name) => name,
        }
    }

    /// Path form used in serialized descriptions: `name` or `/name`.
    pub fn path(&self) -> String {
        match self {
            FieldRef::Sibling(name) => (*name).to_string(),
            FieldRef::Root(name) => format!("/{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldRef,
    pub values: Vec<&'static str>,
}

impl Condition {
    pub fn new(field: FieldRef, values: &[&'static str]) -> Self {
        Self {
            field,
            values: values.to_vec(),
        }
    }

    fn matches(&self, value: Option<&Value>) -> bool {
        match value {
            Some(Value::String(s)) => self.values.iter().any(|v| v == s),
            Some(Value::Bool(b)) => self.values.iter().any(|v| *v == if *b { "true" } else { "false" }),
            Some(Value::Number(n)) => {
                let rendered = n.to_string();
                self.values.iter().any(|v| *v == rendered)
            }
            _ => false,
        }
    }
}

/// The `show` predicate of a field. Empty means always visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayOptions {
    pub show: Vec<Condition>,
}

impl DisplayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, field: FieldRef, values: &[&'static str]) -> Self {
        self.show.push(Condition::new(field, values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.show.is_empty()
    }

    pub fn is_satisfied(&self, root: &Scope<'_>, local: &Scope<'_>) -> bool {
        self.show.iter().all(|cond| {
            let value = match cond.field {
                FieldRef::Sibling(name) => local.resolve(name),
                FieldRef::Root(name) => root.resolve(name),
            };
            cond.matches(value)
        })
    }
}

impl Serialize for DisplayOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut show = serializer.serialize_map(Some(1))?;
        let conditions: Map<String, Value> = self
            .show
            .iter()
            .map(|c| (c.field.path(), Value::from(c.values.clone())))
            .collect();
        show.serialize_entry("show", &conditions)?;
        show.end()
    }
}

/// Values of one field scope, falling back to the scope's declared defaults.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    fields: &'a [FieldDescriptor],
    values: Option<&'a Map<String, Value>>,
}

impl<'a> Scope<'a> {
    pub fn new(fields: &'a [FieldDescriptor], values: Option<&'a Map<String, Value>>) -> Self {
        Self { fields, values }
    }

    pub fn resolve(&self, name: &str) -> Option<&'a Value> {
        self.values
            .and_then(|v| v.get(name))
            .filter(|v| !v.is_null())
            .or_else(|| self.fields.iter().find(|f| f.name == name).map(|f| &f.default))
    }
}

/// Check that every display condition references a field defined earlier.
///
/// Sibling references are resolved against earlier fields of the same scope,
/// root references against earlier top-level fields.
pub fn validate_schema(properties: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut seen_root: HashSet<&str> = HashSet::new();

    for (idx, field) in properties.iter().enumerate() {
        for cond in &field.display.show {
            check_reference(field.name, cond.field.name(), &seen_root, &properties[idx..])?;
        }

        if field.is_collection() {
            let mut seen_local: HashSet<&str> = HashSet::new();
            for (child_idx, child) in field.fields.iter().enumerate() {
                for cond in &child.display.show {
                    match cond.field {
                        FieldRef::Sibling(name) => {
                            check_reference(child.name, name, &seen_local, &field.fields[child_idx..])?
                        }
                        FieldRef::Root(name) => check_reference(child.name, name, &seen_root, &properties[idx..])?,
                    }
                }
                seen_local.insert(child.name);
            }
        }

        seen_root.insert(field.name);
    }
    Ok(())
}

fn check_reference(
    field: &'static str,
    target: &'static str,
    seen: &HashSet<&str>,
    rest: &[FieldDescriptor],
) -> Result<(), SchemaError> {
    if seen.contains(target) {
        return Ok(());
    }
    if rest.iter().any(|f| f.name == target) {
        Err(SchemaError::ForwardReference {
            field: field.to_string(),
            references: target.to_string(),
        })
    } else {
        Err(SchemaError::UnknownReference {
            field: field.to_string(),
            references: target.to_string(),
        })
    }
}
