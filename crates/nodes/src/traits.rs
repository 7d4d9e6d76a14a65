//! The contracts between a node and the host that runs it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::http::HttpRequestOptions;
use crate::{HttpError, NodeError};

/// The host's authenticated HTTP capability.
///
/// Implementations own the transport and the credential store: they look up
/// the named credential type, attach whatever headers its authentication
/// rule produces, send the request once, and return the parsed body.
#[async_trait]
pub trait HttpHelpers: Send + Sync {
    async fn request_with_authentication(
        &self,
        credential_type: &str,
        options: HttpRequestOptions,
    ) -> Result<Value, HttpError>;
}

/// Shared context passed to every node during execution.
///
/// Defined here (in the nodes crate) so both hosts and individual node
/// implementations can import it without a circular dependency.
#[derive(Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: uuid::Uuid,
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Position of the current item within the execution's input.
    pub item_index: usize,
    /// Host helpers used for outbound calls.
    pub helpers: Arc<dyn HttpHelpers>,
}

impl ExecutionContext {
    /// Context for a one-off run outside a persisted workflow.
    pub fn standalone(helpers: Arc<dyn HttpHelpers>) -> Self {
        Self {
            workflow_id: uuid::Uuid::new_v4(),
            execution_id: uuid::Uuid::new_v4(),
            item_index: 0,
            helpers,
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("workflow_id", &self.workflow_id)
            .field("execution_id", &self.execution_id)
            .field("item_index", &self.item_index)
            .finish_non_exhaustive()
    }
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node for one item.
    ///
    /// `input` is the node's parameter bag with host expressions already
    /// resolved for the current item. The returned JSON becomes the item's
    /// output.
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError>;
}
