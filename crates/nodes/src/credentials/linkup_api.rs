//! `linkupApi` — bearer API key for api.linkup.so.

use crate::credentials::{CredentialType, HeaderRule};
use crate::http::{HttpMethod, HttpRequestOptions};
use crate::linkup::LINKUP_BASE_URL;
use crate::schema::FieldDescriptor;

pub const LINKUP_CREDENTIAL: &str = "linkupApi";

#[derive(Debug, Clone)]
pub struct LinkupApi {
    base_url: String,
}

impl LinkupApi {
    /// Point the liveness check at a different API root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for LinkupApi {
    fn default() -> Self {
        Self::with_base_url(LINKUP_BASE_URL)
    }
}

impl CredentialType for LinkupApi {
    fn name(&self) -> &'static str {
        LINKUP_CREDENTIAL
    }

    fn display_name(&self) -> &'static str {
        "Linkup API"
    }

    fn documentation_url(&self) -> Option<&'static str> {
        Some("https://docs.linkup.so/pages/documentation/get-started/quickstart")
    }

    fn properties(&self) -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::string("apiKey", "API Key")
            .password()
            .describe("Get your API key from https://app.linkup.so")]
    }

    fn header_rules(&self) -> Vec<HeaderRule> {
        vec![HeaderRule {
            header: "Authorization",
            prefix: "Bearer ",
            property: "apiKey",
        }]
    }

    fn test_request(&self) -> HttpRequestOptions {
        HttpRequestOptions::new(HttpMethod::Get, format!("{}/credits/balance", self.base_url))
    }
}
