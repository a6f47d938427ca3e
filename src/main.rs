use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booli_query::booli::{BooliClient, FileSource, ListingSource};
use booli_query::cli::{self, Cli};
use booli_query::config::Config;
use booli_query::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booli_query=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    info!("Starting booli-query v{}", env!("CARGO_PKG_VERSION"));
    metrics::registry::init_metrics();

    let source: Box<dyn ListingSource> = match &args.input {
        Some(path) => {
            info!("Reading listings from {}", path.display());
            Box::new(FileSource::new(path))
        }
        None => {
            let config = Config::from_env().context("Failed to load configuration")?;
            Box::new(BooliClient::new(&config.booli)?)
        }
    };

    let output = cli::run(&args, source.as_ref()).await?;
    println!("{}", output);

    debug!("Metrics:\n{}", metrics::render()?);

    Ok(())
}
