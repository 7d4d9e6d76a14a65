//! Body mappings: pure functions from a field's raw value to the fragment it
//! contributes to the request body, or nothing at all.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::FieldKind;
use crate::NodeError;

/// Where a field's value goes in the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Routing {
    /// Body key.
    pub property: &'static str,
    pub mapping: BodyMapping,
}

/// How a raw value is projected into the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyMapping {
    /// A string sent verbatim.
    Text,
    /// A boolean sent verbatim, `false` included.
    Flag,
    /// `"a.com, b.com"` becomes `["a.com", "b.com"]`; empty input is omitted.
    CommaList,
    /// A date-time truncated to `YYYY-MM-DD`; empty input is omitted.
    DateOnly,
    /// JSON text (or an object) sent as a JSON object.
    JsonObject,
}

impl BodyMapping {
    /// Apply the mapping. `Ok(None)` means the key is left out of the body.
    pub fn apply(&self, field: &str, raw: &Value) -> Result<Option<Value>, NodeError> {
        match self {
            BodyMapping::Text => match raw {
                Value::String(s) => Ok(Some(Value::String(s.clone()))),
                other => Err(NodeError::invalid(field, format!("expected a string, got {other}"))),
            },
            BodyMapping::Flag => as_flag(field, raw).map(|b| Some(Value::Bool(b))),
            BodyMapping::CommaList => comma_list(field, raw),
            BodyMapping::DateOnly => date_only(field, raw),
            BodyMapping::JsonObject => json_object(field, raw).map(Some),
        }
    }
}

fn as_flag(field: &str, raw: &Value) -> Result<bool, NodeError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(NodeError::invalid(field, format!("expected a boolean, got {other}"))),
    }
}

fn comma_list(field: &str, raw: &Value) -> Result<Option<Value>, NodeError> {
    let items: Vec<Value> = match raw {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| Value::String(d.to_string()))
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .map(|e| match e {
                Value::String(s) => Ok(s.trim().to_string()),
                other => Err(NodeError::invalid(field, format!("expected a list of strings, got {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|d| !d.is_empty())
            .map(Value::String)
            .collect(),
        other => {
            return Err(NodeError::invalid(
                field,
                format!("expected a comma-separated string, got {other}"),
            ))
        }
    };

    Ok((!items.is_empty()).then_some(Value::Array(items)))
}

fn date_only(field: &str, raw: &Value) -> Result<Option<Value>, NodeError> {
    let s = match raw {
        Value::String(s) => s.trim(),
        other => return Err(NodeError::invalid(field, format!("expected a date string, got {other}"))),
    };
    if s.is_empty() {
        return Ok(None);
    }

    let date = NaiveDate::parse_from_str(s.split('T').next().unwrap_or(s), "%Y-%m-%d")
        .map_err(|e| NodeError::invalid(field, format!("'{s}' is not an ISO 8601 date: {e}")))?;
    Ok(Some(Value::String(date.format("%Y-%m-%d").to_string())))
}

fn json_object(field: &str, raw: &Value) -> Result<Value, NodeError> {
    let parsed = match raw {
        Value::String(s) => serde_json::from_str::<Value>(s)
            .map_err(|e| NodeError::invalid(field, format!("not valid JSON: {e}")))?,
        other => other.clone(),
    };
    match parsed {
        Value::Object(_) => Ok(parsed),
        other => Err(NodeError::invalid(field, format!("expected a JSON object, got {other}"))),
    }
}

/// Whether `value` counts as "not filled in" for a field of `kind`.
///
/// Used for the required check: an empty string, an empty JSON object (or
/// its text form), and `null` are all blank.
pub fn is_blank(kind: FieldKind, value: &Value) -> bool {
    match (kind, value) {
        (_, Value::Null) => true,
        (FieldKind::Json, Value::String(s)) => {
            let s = s.trim();
            s.is_empty() || matches!(serde_json::from_str::<Value>(s), Ok(Value::Object(m)) if m.is_empty())
        }
        (FieldKind::Json, Value::Object(m)) => m.is_empty(),
        (_, Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}
