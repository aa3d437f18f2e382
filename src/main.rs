//! riskfeed - Vulnerability feed aggregation service
//!
//! Main entry point for the riskfeed CLI.

use clap::{Parser, Subcommand};
use riskfeed::aggregator::FeedAggregator;
use riskfeed::config::{validate_config, FeedConfig};
use riskfeed::feeds::FeedSource;
use riskfeed::server::FeedServer;
use std::path::PathBuf;
use std::process;

/// riskfeed - Vulnerability feed aggregator with TTL caching
#[derive(Parser, Debug)]
#[command(name = "riskfeed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP feed server
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Fetch a single source and print it as JSON
    Fetch {
        /// Feed source (nvd, cisa, github, statistics, owasp)
        source: String,
    },

    /// Fetch all sources and print the combined result as JSON
    Aggregate,
}

#[tokio::main]
async fn main() {
    if let Err(e) = riskfeed::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> riskfeed::Result<()> {
    let config = FeedConfig::load_or_default(cli.config.as_deref())?;
    validate_config(&config)?;

    tracing::debug!(ttl_secs = config.cache.ttl_secs, "Configuration loaded");

    match cli.command {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.bind.clone());
            let server = FeedServer::new(&config)?;
            server.run(&addr).await
        }

        Commands::Fetch { source } => {
            let source: FeedSource = source.parse()?;
            let aggregator = FeedAggregator::new(&config)?;
            let result = aggregator.get_source(source).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Commands::Aggregate => {
            let aggregator = FeedAggregator::new(&config)?;
            let result = aggregator.aggregate().await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
