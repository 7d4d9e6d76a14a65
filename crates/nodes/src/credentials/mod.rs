//! Credential types: the secret fields a node needs and the rule for turning
//! them into request headers.
//!
//! The host stores the data; a [`CredentialType`] only describes it.

pub mod linkup_api;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::http::HttpRequestOptions;
use crate::schema::FieldDescriptor;
use crate::HttpError;

pub use linkup_api::LinkupApi;

/// Secret values for one credential, keyed by property name.
#[derive(Clone, Default, PartialEq)]
pub struct CredentialData {
    values: Map<String, Value>,
}

impl CredentialData {
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }
}

impl fmt::Debug for CredentialData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.values.keys() {
            map.entry(key, &"***");
        }
        map.finish()
    }
}

/// `header = prefix + credential[property]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderRule {
    pub header: &'static str,
    pub prefix: &'static str,
    pub property: &'static str,
}

/// A named credential type.
pub trait CredentialType: Send + Sync {
    /// Identifier nodes use to request authentication (`linkupApi`).
    fn name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn documentation_url(&self) -> Option<&'static str> {
        None
    }

    /// Fields the host asks the user to fill in.
    fn properties(&self) -> Vec<FieldDescriptor>;

    /// Headers injected into every request made with this credential.
    fn header_rules(&self) -> Vec<HeaderRule>;

    /// Liveness check; any 2xx response means the credential works.
    fn test_request(&self) -> HttpRequestOptions;

    /// Evaluate [`header_rules`](Self::header_rules) against stored data.
    fn authenticate(&self, data: &CredentialData) -> Result<Vec<(String, String)>, HttpError> {
        self.header_rules()
            .into_iter()
            .map(|rule| {
                let secret = data.get_str(rule.property).filter(|s| !s.is_empty()).ok_or_else(|| {
                    HttpError::InvalidCredentials {
                        credential: self.name().to_string(),
                        message: format!("'{}' is empty", rule.property),
                    }
                })?;
                Ok((rule.header.to_string(), format!("{}{}", rule.prefix, secret)))
            })
            .collect()
    }

    /// Serializable summary for `describe` output. Never includes secrets.
    fn describe(&self) -> Value {
        json!({
            "name": self.name(),
            "displayName": self.display_name(),
            "documentationUrl": self.documentation_url(),
            "properties": self.properties(),
            "authenticate": { "type": "generic", "headers": self.header_rules() },
            "test": self.test_request(),
        })
    }
}

/// Stored credential data, keyed by credential type name.
pub type CredentialStore = HashMap<String, CredentialData>;
