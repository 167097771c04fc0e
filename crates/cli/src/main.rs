//! OKD sizing calculator CLI
//!
//! Sends compute and logging sizing requests to the sizing service, or
//! answers them in-process with `--local`, and prints the ranked node shapes.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cluster, logging, read_request, Backend};
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

/// OKD sizing calculator CLI
#[derive(Parser)]
#[command(name = "okdcalc")]
#[command(author, version, about = "CLI for the OKD cluster sizing calculator", long_about = None)]
pub struct Cli {
    /// Sizing service URL (can also be set via OKDCALC_API_URL env var)
    #[arg(long, env = "OKDCALC_API_URL")]
    pub api_url: Option<String>,

    /// Output format (defaults to the config file setting, then table)
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Calculate in-process instead of calling the sizing service
    #[arg(long)]
    pub local: bool,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank node shapes for a compute workload
    Cluster {
        /// JSON sizing request file, or - for stdin
        #[arg(long, short)]
        request: String,
    },

    /// Rank infra node shapes for a logging workload
    Logging {
        /// JSON logging sizing request file, or - for stdin
        #[arg(long, short)]
        request: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| config.default_format.as_deref().and_then(OutputFormat::from_name))
        .unwrap_or_default();

    let backend = if cli.local {
        Backend::local()
    } else {
        Backend::Remote(client::ApiClient::new(&config.api_url(cli.api_url))?)
    };

    match cli.command {
        Commands::Cluster { request } => {
            let request = read_request(&request)?;
            cluster::size_cluster(&backend, &request, format).await?;
        }
        Commands::Logging { request } => {
            let request = read_request(&request)?;
            logging::size_logging(&backend, &request, format).await?;
        }
    }

    Ok(())
}
