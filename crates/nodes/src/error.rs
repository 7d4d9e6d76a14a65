//! Node-level error types.

use serde_json::Value;
use thiserror::Error;

/// Errors produced by the host HTTP helper.
///
/// Every failure of the single outbound call ends up here and is passed
/// through to the caller unchanged; nothing is retried locally.
#[derive(Debug, Error, Clone)]
pub enum HttpError {
    /// The remote answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        /// Response body, parsed as JSON when possible, otherwise a string.
        body: Value,
    },

    /// Connection, TLS, or other network-level failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// A 2xx response whose body could not be read.
    #[error("could not read response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The request names a credential type the helper does not know.
    #[error("credential type '{0}' is not registered")]
    UnknownCredentialType(String),

    /// The credential type is known but no data is stored for it.
    #[error("no credentials configured for '{0}'")]
    MissingCredentials(String),

    /// The stored credential data cannot produce authentication headers.
    #[error("credentials for '{credential}' are unusable: {message}")]
    InvalidCredentials { credential: String, message: String },

    /// An authentication rule produced a header that cannot be sent.
    #[error("invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
}

impl HttpError {
    /// HTTP status code, if the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by a node's `execute` method.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// A parameter is missing or malformed; raised before any request is sent.
    #[error("invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },

    /// The `(resource, operation)` pair has no route.
    #[error("unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },

    /// The credential liveness check was rejected by the remote API.
    #[error("credential '{credential}' is invalid: {source}")]
    CredentialInvalid {
        credential: String,
        #[source]
        source: HttpError,
    },

    /// The outbound request failed.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl NodeError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        NodeError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Problems found while checking a node description.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A display condition references a field that is only defined later.
    #[error("field '{field}' is gated on '{references}', which is defined after it")]
    ForwardReference { field: String, references: String },

    /// A display condition references a field that does not exist in scope.
    #[error("field '{field}' is gated on unknown field '{references}'")]
    UnknownReference { field: String, references: String },
}
