//! The Linkup node: web search and page fetch against api.linkup.so.

pub mod fetch;
pub mod search;
pub mod transport;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::credentials::linkup_api::LINKUP_CREDENTIAL;
use crate::description::NodeDescription;
use crate::schema::{OptionValue, ParameterBag};
use crate::traits::{ExecutableNode, ExecutionContext};
use crate::NodeError;

pub use transport::linkup_api_request;

pub const LINKUP_BASE_URL: &str = "https://api.linkup.so/v1";

/// Registry key of the node.
pub const LINKUP_NODE: &str = "linkup";

/// Build the node manifest with requests rooted at `base_url`.
pub fn linkup_description(base_url: impl Into<String>) -> NodeDescription {
    NodeDescription::new(LINKUP_NODE, "Linkup", base_url)
        .describe("Consume Linkup API for web search and content fetching")
        .group("input")
        .usable_as_tool()
        .credential(LINKUP_CREDENTIAL, true)
        .default_header("Accept", "application/json")
        .default_header("Content-Type", "application/json")
        .resource_selector(
            vec![OptionValue::new("Search", "search"), OptionValue::new("Fetch", "fetch")],
            "search",
        )
        .resource("search", vec![search::search_operation()])
        .resource("fetch", vec![fetch::fetch_operation()])
}

/// Executes one Linkup operation per item.
#[derive(Debug, Clone)]
pub struct LinkupNode {
    description: NodeDescription,
}

impl LinkupNode {
    pub fn new() -> Self {
        Self::with_base_url(LINKUP_BASE_URL)
    }

    /// Send requests to a different API root (self-hosted proxy, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            description: linkup_description(base_url),
        }
    }

    pub fn description(&self) -> &NodeDescription {
        &self.description
    }
}

impl Default for LinkupNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutableNode for LinkupNode {
    #[instrument(skip_all, fields(execution_id = %ctx.execution_id, item = ctx.item_index))]
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let params = ParameterBag::try_from(input)?;
        let request = self.description.build_request(params)?;

        info!(
            "{} -> {} {}",
            self.description.subtitle(request.resource, request.operation),
            request.method,
            request.path
        );

        let response = linkup_api_request(
            ctx.helpers.as_ref(),
            &self.description.request_defaults,
            request.method,
            request.path,
            Some(Value::Object(request.body)),
            Map::new(),
        )
        .await?;
        Ok(response)
    }
}
