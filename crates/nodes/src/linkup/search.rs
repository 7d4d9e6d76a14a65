//! `search` resource: `POST /search`.

use crate::description::OperationEntry;
use crate::http::HttpMethod;
use crate::schema::{BodyMapping, FieldDescriptor, FieldRef, OptionValue};

pub const OUTPUT_TYPE: &str = "outputType";

pub fn search_operation() -> OperationEntry {
    OperationEntry {
        resource: "search",
        operation: "search",
        name: "Search",
        action: "Perform a web search",
        description: "Search the web and retrieve context for AI grounding",
        method: HttpMethod::Post,
        path: "/search",
        fields: search_fields(),
    }
}

fn search_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::string("q", "Query")
            .required()
            .placeholder("What is the latest news about AI?")
            .describe("The natural language question for which you want to retrieve context")
            .route("q", BodyMapping::Text),
        FieldDescriptor::options(
            "depth",
            "Depth",
            "standard",
            vec![
                OptionValue::new("Standard", "standard")
                    .describe("Fast search for straightforward queries (1 credit per call)"),
                OptionValue::new("Deep", "deep")
                    .describe("Comprehensive search for complex queries (10 credits per call)"),
            ],
        )
        .required()
        .describe("Search precision level. Standard is faster, deep is more comprehensive.")
        .route("depth", BodyMapping::Text),
        FieldDescriptor::options(
            OUTPUT_TYPE,
            "Output Type",
            "sourcedAnswer",
            vec![
                OptionValue::new("Sourced Answer", "sourcedAnswer").describe("Returns a concise answer with sources"),
                OptionValue::new("Search Results", "searchResults").describe("Returns a list of relevant documents"),
                OptionValue::new("Structured", "structured")
                    .describe("Returns structured output according to a user-defined schema"),
            ],
        )
        .required()
        .describe("Response format for the search results")
        .route(OUTPUT_TYPE, BodyMapping::Text),
        FieldDescriptor::json("structuredOutputSchema", "Structured Output Schema", "{}")
            .required()
            .placeholder(r#"{ "name": "string", "age": "number" }"#)
            .describe("JSON schema defining the structure of the response (required when Output Type is Structured)")
            .show_when(FieldRef::Sibling(OUTPUT_TYPE), &["structured"])
            .route("structuredOutputSchema", BodyMapping::JsonObject),
        FieldDescriptor::collection("options", "Options", search_options()).placeholder("Add Option"),
    ]
}

fn search_options() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::string("excludeDomains", "Exclude Domains")
            .placeholder("example.com, another.com")
            .describe("Comma-separated list of domains to exclude from search")
            .route("excludeDomains", BodyMapping::CommaList),
        FieldDescriptor::date_time("fromDate", "From Date")
            .describe("Start date filter (ISO 8601 format)")
            .route("fromDate", BodyMapping::DateOnly),
        FieldDescriptor::string("includeDomains", "Include Domains")
            .placeholder("example.com, another.com")
            .describe("Comma-separated list of domains to restrict search to")
            .route("includeDomains", BodyMapping::CommaList),
        FieldDescriptor::boolean("includeImages", "Include Images")
            .describe("Whether to include images in the search results")
            .route("includeImages", BodyMapping::Flag),
        FieldDescriptor::boolean("includeInlineCitations", "Include Inline Citations")
            .describe("Whether to add inline citations in the answer (sourcedAnswer only)")
            .show_when(FieldRef::Root(OUTPUT_TYPE), &["sourcedAnswer"])
            .route("includeInlineCitations", BodyMapping::Flag),
        FieldDescriptor::boolean("includeSources", "Include Sources")
            .describe("Whether to include sources in the response (structured output only)")
            .show_when(FieldRef::Root(OUTPUT_TYPE), &["structured"])
            .route("includeSources", BodyMapping::Flag),
        FieldDescriptor::date_time("toDate", "To Date")
            .describe("End date filter (ISO 8601 format)")
            .route("toDate", BodyMapping::DateOnly),
    ]
}
