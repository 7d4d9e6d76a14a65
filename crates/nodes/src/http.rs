//! Request description handed to the host's HTTP helper.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP verbs a node may ask the host to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A single outbound call.
///
/// With `json` set the body is serialized as JSON and the response body is
/// parsed back into a [`Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequestOptions {
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Query-string parameters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub qs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Extra headers; authentication headers are added by the host.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub json: bool,
}

impl HttpRequestOptions {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            qs: Map::new(),
            body: None,
            headers: Vec::new(),
            json: true,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, qs: Map<String, Value>) -> Self {
        self.qs = qs;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Query parameters flattened to string pairs; `null` entries are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.qs
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()
    }
}
