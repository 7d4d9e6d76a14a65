//! `linkup` CLI entry-point.
//!
//! Available sub-commands:
//! - `search`          — run a web search.
//! - `fetch`           — fetch a web page.
//! - `run`             — run the node on a parameter file (one object or an array of items).
//! - `test-credential` — check the API key against the balance endpoint.
//! - `describe`        — print the node and credential descriptions.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkup_nodes::client::{ClientConfig, ReqwestHelpers};
use linkup_nodes::credentials::linkup_api::LINKUP_CREDENTIAL;
use linkup_nodes::credentials::{CredentialData, CredentialType, LinkupApi};
use linkup_nodes::linkup::{LinkupNode, LINKUP_BASE_URL};
use linkup_nodes::{ExecutableNode, ExecutionContext};

#[derive(Parser)]
#[command(name = "linkup", about = "Linkup web search and fetch from the command line", version)]
struct Cli {
    /// Linkup API key.
    #[arg(long, env = "LINKUP_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// API root, without a trailing slash.
    #[arg(long, env = "LINKUP_BASE_URL", global = true, default_value = LINKUP_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds. No timeout when omitted.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the web and retrieve context for AI grounding.
    Search(SearchArgs),
    /// Fetch and convert a webpage to markdown.
    Fetch(FetchArgs),
    /// Run the node on a JSON parameter file.
    Run {
        /// Path to a parameter object, or an array of them (one per item).
        path: PathBuf,
    },
    /// Validate the API key.
    TestCredential,
    /// Print the node description as JSON.
    Describe,
}

#[derive(Args)]
struct SearchArgs {
    /// Natural language question.
    q: String,
    #[arg(long, default_value = "standard", value_parser = ["standard", "deep"])]
    depth: String,
    #[arg(long, default_value = "sourcedAnswer", value_parser = ["sourcedAnswer", "searchResults", "structured"])]
    output_type: String,
    /// JSON schema for `structured` output.
    #[arg(long, conflicts_with = "schema_file")]
    schema: Option<String>,
    /// Read the JSON schema for `structured` output from a file.
    #[arg(long)]
    schema_file: Option<PathBuf>,
    /// Comma-separated domains to exclude.
    #[arg(long)]
    exclude_domains: Option<String>,
    /// Comma-separated domains to restrict the search to.
    #[arg(long)]
    include_domains: Option<String>,
    /// Start date (ISO 8601).
    #[arg(long)]
    from_date: Option<String>,
    /// End date (ISO 8601).
    #[arg(long)]
    to_date: Option<String>,
    #[arg(long)]
    include_images: bool,
    #[arg(long)]
    include_inline_citations: bool,
    #[arg(long)]
    include_sources: bool,
}

#[derive(Args)]
struct FetchArgs {
    url: String,
    #[arg(long)]
    include_raw_html: bool,
    #[arg(long)]
    render_js: bool,
    #[arg(long)]
    extract_images: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Describe => {
            let node = LinkupNode::with_base_url(&cli.base_url);
            let credential = LinkupApi::with_base_url(&cli.base_url);
            print_json(&json!({
                "node": node.description(),
                "credentials": [credential.describe()],
            }))
        }
        Command::TestCredential => {
            let helpers = build_helpers(&cli.base_url, cli.api_key.as_deref(), cli.timeout_secs)?;
            helpers.test_credential(LINKUP_CREDENTIAL).await?;
            println!("✅ API key is valid");
            Ok(())
        }
        Command::Search(args) => {
            let params = search_params(args)?;
            let out = execute(&cli.base_url, cli.api_key.as_deref(), cli.timeout_secs, vec![params]).await?;
            print_json(&out[0])
        }
        Command::Fetch(args) => {
            let params = fetch_params(args);
            let out = execute(&cli.base_url, cli.api_key.as_deref(), cli.timeout_secs, vec![params]).await?;
            print_json(&out[0])
        }
        Command::Run { path } => {
            let content =
                std::fs::read_to_string(&path).with_context(|| format!("cannot read file {}", path.display()))?;
            let parsed: Value = serde_json::from_str(&content).context("invalid JSON")?;
            let (items, many) = match parsed {
                Value::Array(items) => (items, true),
                single => (vec![single], false),
            };
            let out = execute(&cli.base_url, cli.api_key.as_deref(), cli.timeout_secs, items).await?;
            if many {
                print_json(&Value::Array(out))
            } else {
                print_json(&out[0])
            }
        }
    }
}

fn build_helpers(base_url: &str, api_key: Option<&str>, timeout_secs: Option<u64>) -> Result<ReqwestHelpers> {
    let Some(api_key) = api_key else {
        bail!("no API key: pass --api-key or set LINKUP_API_KEY");
    };
    let config = ClientConfig {
        timeout: timeout_secs.map(Duration::from_secs),
        ..ClientConfig::default()
    };
    let helpers = ReqwestHelpers::new(config)?
        .register(Arc::new(LinkupApi::with_base_url(base_url)))
        .with_credentials(LINKUP_CREDENTIAL, CredentialData::default().with("apiKey", api_key));
    Ok(helpers)
}

/// Run the node once per item, in order, stopping at the first failure.
async fn execute(
    base_url: &str,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
    items: Vec<Value>,
) -> Result<Vec<Value>> {
    let helpers = build_helpers(base_url, api_key, timeout_secs)?;
    let node = LinkupNode::with_base_url(base_url);
    let mut ctx = ExecutionContext::standalone(Arc::new(helpers));

    let mut outputs = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        ctx.item_index = idx;
        let out = node
            .execute(item, &ctx)
            .await
            .with_context(|| format!("item {idx} failed"))?;
        info!("item {idx} succeeded");
        outputs.push(out);
    }
    Ok(outputs)
}

fn search_params(args: SearchArgs) -> Result<Value> {
    let schema = match (args.schema, args.schema_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(
            std::fs::read_to_string(&path).with_context(|| format!("cannot read schema {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let mut options = Map::new();
    for (key, value) in [
        ("excludeDomains", args.exclude_domains),
        ("includeDomains", args.include_domains),
        ("fromDate", args.from_date),
        ("toDate", args.to_date),
    ] {
        if let Some(value) = value {
            options.insert(key.to_string(), Value::String(value));
        }
    }
    for (key, set) in [
        ("includeImages", args.include_images),
        ("includeInlineCitations", args.include_inline_citations),
        ("includeSources", args.include_sources),
    ] {
        if set {
            options.insert(key.to_string(), Value::Bool(true));
        }
    }

    let mut params = json!({
        "resource": "search",
        "operation": "search",
        "q": args.q,
        "depth": args.depth,
        "outputType": args.output_type,
        "options": options,
    });
    if let Some(schema) = schema {
        params["structuredOutputSchema"] = Value::String(schema);
    }
    Ok(params)
}

fn fetch_params(args: FetchArgs) -> Value {
    let mut options = Map::new();
    for (key, set) in [
        ("includeRawHtml", args.include_raw_html),
        ("renderJs", args.render_js),
        ("extractImages", args.extract_images),
    ] {
        if set {
            options.insert(key.to_string(), Value::Bool(true));
        }
    }
    json!({
        "resource": "fetch",
        "operation": "fetch",
        "url": args.url,
        "options": options,
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flags_become_options() {
        let cli = Cli::parse_from([
            "linkup",
            "search",
            "rust news",
            "--exclude-domains",
            "a.com, b.com",
            "--include-images",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        let params = search_params(args).unwrap();
        assert_eq!(params["q"], "rust news");
        assert_eq!(params["depth"], "standard");
        assert_eq!(params["outputType"], "sourcedAnswer");
        assert_eq!(params["options"], json!({ "excludeDomains": "a.com, b.com", "includeImages": true }));
        assert!(params.get("structuredOutputSchema").is_none());
    }

    #[test]
    fn fetch_without_flags_has_empty_options() {
        let cli = Cli::parse_from(["linkup", "fetch", "https://example.com"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(fetch_params(args)["options"], json!({}));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = build_helpers(LINKUP_BASE_URL, None, None).err().unwrap();
        assert!(err.to_string().contains("LINKUP_API_KEY"));
    }

    #[test]
    fn invalid_depth_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["linkup", "search", "q", "--depth", "shallow"]).is_err());
    }
}
