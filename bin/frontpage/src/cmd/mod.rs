//! CLI command implementations.

pub mod check;
pub mod fetch;
pub mod schema;
pub mod serve;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use frontpage_core::Config;
use frontpage_fetch::{AuthToken, ContentGateway};

/// Load configuration and build the content gateway from it.
///
/// The read token comes from the environment; a missing token only matters
/// once draft mode is requested.
pub fn load_gateway(config_path: &Path) -> Result<(Config, ContentGateway)> {
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let token = Config::read_token().and_then(AuthToken::new);
    let gateway =
        ContentGateway::from_config(&config, token).wrap_err("Failed to build content gateway")?;
    Ok((config, gateway))
}
