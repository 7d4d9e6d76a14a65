//! The one imperative call site: an authenticated request to the Linkup API.

use serde_json::{Map, Value};
use tracing::debug;

use crate::credentials::linkup_api::LINKUP_CREDENTIAL;
use crate::description::RequestDefaults;
use crate::http::{HttpMethod, HttpRequestOptions};
use crate::traits::HttpHelpers;
use crate::HttpError;

/// Send one request to `{base_url}{resource}` through the host helper.
///
/// `defaults` supplies the API root and the headers every request carries.
/// The body is sent as JSON and the parsed response is returned as-is.
/// Failures are the host's errors, unmodified; there is no retry.
pub async fn linkup_api_request(
    helpers: &dyn HttpHelpers,
    defaults: &RequestDefaults,
    method: HttpMethod,
    resource: &str,
    body: Option<Value>,
    qs: Map<String, Value>,
) -> Result<Value, HttpError> {
    let mut options =
        HttpRequestOptions::new(method, format!("{}{resource}", defaults.base_url)).with_query(qs);
    for (name, value) in &defaults.headers {
        options = options.with_header(*name, *value);
    }
    options.body = body;

    debug!(%method, url = %options.url, "linkup api request");
    helpers.request_with_authentication(LINKUP_CREDENTIAL, options).await
}
