//! Reqwest-backed host helper.
//!
//! Owns the credential store and applies each credential type's header rules
//! before sending. One attempt per request; errors are mapped to
//! [`HttpError`] and returned without retrying.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::credentials::{CredentialData, CredentialStore, CredentialType};
use crate::http::HttpRequestOptions;
use crate::traits::HttpHelpers;
use crate::{HttpError, NodeError};

/// Tuning knobs for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("linkup-nodes/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct ReqwestHelpers {
    http: Client,
    user_agent: String,
    credential_types: HashMap<&'static str, Arc<dyn CredentialType>>,
    store: CredentialStore,
}

impl ReqwestHelpers {
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| HttpError::Transport {
            url: String::new(),
            message: format!("build http client: {e}"),
        })?;

        Ok(Self {
            http,
            user_agent: config.user_agent,
            credential_types: HashMap::new(),
            store: CredentialStore::new(),
        })
    }

    /// Make a credential type available to nodes.
    pub fn register(mut self, credential_type: Arc<dyn CredentialType>) -> Self {
        self.credential_types.insert(credential_type.name(), credential_type);
        self
    }

    /// Store data for a registered credential type.
    pub fn with_credentials(mut self, credential_type: impl Into<String>, data: CredentialData) -> Self {
        self.store.insert(credential_type.into(), data);
        self
    }

    fn lookup(&self, credential_type: &str) -> Result<(&dyn CredentialType, &CredentialData), HttpError> {
        let ty = self
            .credential_types
            .get(credential_type)
            .ok_or_else(|| HttpError::UnknownCredentialType(credential_type.to_string()))?;
        let data = self
            .store
            .get(credential_type)
            .ok_or_else(|| HttpError::MissingCredentials(credential_type.to_string()))?;
        Ok((ty.as_ref(), data))
    }

    /// Run the credential type's liveness check with the stored data.
    ///
    /// Any 2xx means the credential works. A non-2xx answer is returned as
    /// [`NodeError::CredentialInvalid`] wrapping the unmodified HTTP error.
    pub async fn test_credential(&self, credential_type: &str) -> Result<(), NodeError> {
        let (ty, data) = self.lookup(credential_type)?;
        let request = ty.test_request();

        match self.send(ty, data, request).await {
            Ok(_) => {
                info!(credential = credential_type, "credential accepted");
                Ok(())
            }
            Err(source @ HttpError::Status { .. }) => {
                warn!(credential = credential_type, error = %source, "credential rejected");
                Err(NodeError::CredentialInvalid {
                    credential: credential_type.to_string(),
                    source,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn send(
        &self,
        credential_type: &dyn CredentialType,
        data: &CredentialData,
        options: HttpRequestOptions,
    ) -> Result<Value, HttpError> {
        let auth = credential_type.authenticate(data)?;
        let url = options.url.clone();

        let mut req = self
            .http
            .request(options.method.into(), url.as_str())
            .header(USER_AGENT, &self.user_agent);
        let has_accept = options.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("accept"));
        if options.json && !has_accept {
            req = req.header(ACCEPT, "application/json");
        }
        if !options.qs.is_empty() {
            req = req.query(&options.query_pairs());
        }
        for (name, value) in options.headers.iter().chain(auth.iter()) {
            req = req.header(header_name(name)?, header_value(name, value)?);
        }
        if let Some(body) = &options.body {
            req = if options.json {
                req.json(body)
            } else {
                req.body(body.to_string())
            };
        }

        debug!(method = %options.method, %url, "sending request");
        let resp = req.send().await.map_err(|e| HttpError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| HttpError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(HttpError::Status {
                method: options.method.to_string(),
                url,
                status: status.as_u16(),
                body: parse_body(&text),
            });
        }

        Ok(if options.json {
            parse_body(&text)
        } else {
            Value::String(text)
        })
    }
}

#[async_trait]
impl HttpHelpers for ReqwestHelpers {
    async fn request_with_authentication(
        &self,
        credential_type: &str,
        options: HttpRequestOptions,
    ) -> Result<Value, HttpError> {
        let (ty, data) = self.lookup(credential_type)?;
        self.send(ty, data, options).await
    }
}

/// JSON when possible, the raw text otherwise, `null` for an empty body.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn header_name(name: &str) -> Result<HeaderName, HttpError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, HttpError> {
    let mut value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    if name.eq_ignore_ascii_case("authorization") {
        value.set_sensitive(true);
    }
    Ok(value)
}
