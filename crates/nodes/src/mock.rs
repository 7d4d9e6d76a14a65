//! `MockHttp` — a test double for `HttpHelpers`.
//!
//! Useful in unit and integration tests where no network should be touched.
//! It records every request it receives and answers with a
//! programmer-specified result.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::http::HttpRequestOptions;
use crate::traits::HttpHelpers;
use crate::HttpError;

/// Behaviour injected into `MockHttp` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Fail as if the remote answered with this status and body.
    FailStatus(u16, Value),
    /// Fail as if the connection broke.
    FailTransport(String),
}

/// One request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub credential_type: String,
    pub options: HttpRequestOptions,
}

pub struct MockHttp {
    pub behaviour: MockBehaviour,
    /// All requests seen by this helper (in call order).
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockHttp {
    fn with(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always succeeds with the given value.
    pub fn returning(value: Value) -> Self {
        Self::with(MockBehaviour::ReturnValue(value))
    }

    /// Create a mock that always fails with the given HTTP status.
    pub fn failing_status(status: u16, body: Value) -> Self {
        Self::with(MockBehaviour::FailStatus(status, body))
    }

    /// Create a mock that always fails at the transport level.
    pub fn failing_transport(msg: impl Into<String>) -> Self {
        Self::with(MockBehaviour::FailTransport(msg.into()))
    }

    /// Number of requests this helper has received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The most recent request, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpHelpers for MockHttp {
    async fn request_with_authentication(
        &self,
        credential_type: &str,
        options: HttpRequestOptions,
    ) -> Result<Value, HttpError> {
        let url = options.url.clone();
        let method = options.method.to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            credential_type: credential_type.to_string(),
            options,
        });

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::FailStatus(status, body) => Err(HttpError::Status {
                method,
                url,
                status: *status,
                body: body.clone(),
            }),
            MockBehaviour::FailTransport(msg) => Err(HttpError::Transport {
                url,
                message: msg.clone(),
            }),
        }
    }
}
