//! Fetch command - run one query through the gateway and print the result

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use frontpage_fetch::{ContentQuery, FetchMode, QueryParams};
use serde_json::Value;

use super::load_gateway;

/// Options for a single query.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Query text.
    pub query: String,
    /// `name=value` parameter bindings.
    pub params: Vec<String>,
    /// Cache tags.
    pub tags: Vec<String>,
    /// Read through the CDN.
    pub use_cdn: bool,
    /// Read drafts.
    pub draft: bool,
}

/// Run the fetch command.
pub async fn run(config_path: &Path, options: FetchOptions) -> Result<()> {
    let (_, gateway) = load_gateway(config_path)?;
    let query = build_query(&options)?;
    let mode = FetchMode::from_draft_mode(options.draft);

    tracing::info!(?mode, use_cdn = options.use_cdn, "Running query");
    let value = gateway
        .fetch(mode, &query)
        .await
        .wrap_err("Query failed")?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Build a gateway query from CLI options.
pub fn build_query(options: &FetchOptions) -> Result<ContentQuery> {
    let params = options
        .params
        .iter()
        .map(String::as_str)
        .map(parse_param)
        .collect::<Result<QueryParams>>()?;

    let mut query = ContentQuery::new(options.query.as_str())
        .params(params)
        .use_cdn(options.use_cdn);
    if !options.tags.is_empty() {
        query = query.tags(options.tags.iter().cloned());
    }
    Ok(query)
}

/// Parse `name=value`. Values are read as JSON, falling back to a plain string.
fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| eyre!("Invalid parameter `{raw}`, expected name=value"))?;
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        return Err(eyre!("Invalid parameter `{raw}`, name is empty"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
