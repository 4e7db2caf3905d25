//! `vitrine url`: show how a list page reads a query string.

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::context::ConsoleContext;
use crate::config::Config;
use crate::entities::Resource;
use crate::error::Result;
use crate::query::{decode, encode, request_params};

/// Decode `query` the way the resource's list page would on mount, and
/// print the canonical query string and the request it would send.
pub fn cmd_url(resource: Resource, query: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let ctx = ConsoleContext::from_config(&config);
    let schema = resource.list_schema();

    let decoded = decode(query, &schema);
    let canonical = encode(&decoded, &schema);
    let params = request_params(&decoded, &schema, ctx.page_size());

    let json_output = json!({
        "resource": resource.to_string(),
        "query": decoded,
        "canonical": canonical,
        "request": params,
    });

    let mut text = String::new();
    text.push_str(&format!("{} {}\n", "Canonical:".cyan().bold(), display_query(&canonical)));
    text.push_str(&format!("{}\n", "Request:".cyan().bold()));
    for (key, value) in params.iter() {
        text.push_str(&format!("  {key}={value}\n"));
    }

    CommandOutput::new(json_output)
        .with_text(text.trim_end())
        .print(output)
}

pub(crate) fn display_query(query_string: &str) -> String {
    if query_string.is_empty() {
        "(defaults)".dimmed().to_string()
    } else {
        format!("?{query_string}")
    }
}
