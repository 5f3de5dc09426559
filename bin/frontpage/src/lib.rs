//! Frontpage Library
//!
//! The site binary's building blocks: the HTTP server that renders the front
//! page, and the CLI commands around it.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (serve, fetch, schema, check)
//! - [`server`] - HTTP server with draft mode and tag revalidation

pub mod cmd;
pub mod server;

pub use frontpage_core::Config;
pub use frontpage_fetch::{ContentGateway, ContentQuery, FetchMode};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
