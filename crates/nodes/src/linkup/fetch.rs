//! `fetch` resource: `POST /fetch`.

use crate::description::OperationEntry;
use crate::http::HttpMethod;
use crate::schema::{BodyMapping, FieldDescriptor};

pub fn fetch_operation() -> OperationEntry {
    OperationEntry {
        resource: "fetch",
        operation: "fetch",
        name: "Fetch",
        action: "Fetch webpage content",
        description: "Fetch and convert a webpage to markdown",
        method: HttpMethod::Post,
        path: "/fetch",
        fields: vec![
            FieldDescriptor::string("url", "URL")
                .required()
                .placeholder("https://example.com")
                .describe("The URL of the webpage you want to fetch")
                .route("url", BodyMapping::Text),
            FieldDescriptor::collection(
                "options",
                "Options",
                vec![
                    FieldDescriptor::boolean("includeRawHtml", "Include Raw HTML")
                        .describe("Whether to include the raw HTML of the webpage in the response")
                        .route("includeRawHtml", BodyMapping::Flag),
                    FieldDescriptor::boolean("renderJs", "Render JavaScript")
                        .describe("Whether to render the JavaScript of the webpage before fetching")
                        .route("renderJs", BodyMapping::Flag),
                    FieldDescriptor::boolean("extractImages", "Extract Images")
                        .describe("Whether to extract images from the webpage")
                        .route("extractImages", BodyMapping::Flag),
                ],
            )
            .placeholder("Add Option"),
        ],
    }
}
