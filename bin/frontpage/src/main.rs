//! Frontpage CLI
//!
//! Serves the content-driven front page and offers tooling around the
//! content store.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use frontpage::cmd::fetch::FetchOptions;

/// Command-line interface for Frontpage.
#[derive(Parser)]
#[command(
    name = "frontpage",
    version,
    about = "Content-driven website front-end"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "frontpage.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Run the site's HTTP server
    Serve {
        /// Listen address (overrides server.addr)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Run a query against the content store and print the result
    Fetch {
        /// Query text
        query: String,
        /// Query parameter as name=value (value parsed as JSON when possible)
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Cache tag to attach
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Read through the CDN
        #[arg(long)]
        cdn: bool,
        /// Read unpublished drafts (requires SANITY_API_READ_TOKEN)
        #[arg(long)]
        draft: bool,
    },
    /// Print the content schema, or validate a document against it
    Schema {
        /// JSON document to validate
        #[arg(long)]
        validate: Option<std::path::PathBuf>,
    },
    /// Validate configuration, token and schema
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    frontpage::init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { addr } => {
            frontpage::cmd::serve::run(&cli.config, addr.as_deref()).await?;
        }
        Commands::Fetch {
            query,
            params,
            tags,
            cdn,
            draft,
        } => {
            let options = FetchOptions {
                query,
                params,
                tags,
                use_cdn: cdn,
                draft,
            };
            frontpage::cmd::fetch::run(&cli.config, options).await?;
        }
        Commands::Schema { validate } => {
            frontpage::cmd::schema::run(validate.as_deref())?;
        }
        Commands::Check { strict } => {
            frontpage::cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}
