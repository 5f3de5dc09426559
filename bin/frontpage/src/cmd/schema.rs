//! Schema command - print the content schema or validate a document against it

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use frontpage_schema::site_schema;
use serde_json::Value;

/// Run the schema command.
///
/// Without `validate`, prints the schema description for the authoring
/// backend. With it, checks the JSON document at that path.
pub fn run(validate: Option<&Path>) -> Result<()> {
    let schema = site_schema().wrap_err("Invalid schema declaration")?;

    let Some(path) = validate else {
        println!("{}", serde_json::to_string_pretty(&schema.to_json())?);
        return Ok(());
    };

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

    schema
        .validate_document(&document)
        .wrap_err_with(|| format!("{} does not match the schema", path.display()))?;

    println!("✓ {} is valid", path.display());
    Ok(())
}
