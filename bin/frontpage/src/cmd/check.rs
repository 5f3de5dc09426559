//! Check command - validate configuration, token and schema

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use frontpage_core::{Config, config::READ_TOKEN_ENV};
use frontpage_schema::site_schema;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    let token = Config::read_token();
    let result = validate(config_path, token.as_deref());

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn validate(config_path: &Path, token: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    match Config::load_with_env(config_path) {
        Ok(config) => {
            println!("  ✓ Configuration valid");
            check_config_values(&config, &mut result);
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            result.add_error(format!("Configuration error: {e}"));
        }
    }

    println!("\nChecking read token...");
    if token.is_some() {
        println!("  ✓ {READ_TOKEN_ENV} is set");
    } else {
        result.add_warning(format!(
            "{READ_TOKEN_ENV} is not set; draft mode requests will fail"
        ));
    }

    println!("\nChecking schema...");
    match site_schema() {
        Ok(schema) => println!("  ✓ {} schema type(s) declared", schema.types().len()),
        Err(e) => result.add_error(format!("Schema error: {e}")),
    }

    result
}

fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if config.server.draft_secret.is_none() {
        result.add_warning("server.draft_secret is not set; /api/draft is disabled");
    }

    if config.server.revalidate_secret.is_none() {
        result.add_warning("server.revalidate_secret is not set; /api/revalidate is disabled");
    }

    if config.store.api_version == "X" || config.store.api_version == "vX" {
        result.add_warning("store.api_version `X` is experimental and may change without notice");
    }
}
