//! anchor-reviews: browse the project-listing program's accounts
//!
//! Scans a Solana node for `Project` and `Review` accounts, decodes them with
//! the program's IDL and prints each project with its reviews.
//!
//! ## Example Usage
//!
//! ```bash
//! # List projects and reviews from devnet
//! anchor-reviews list
//!
//! # Same, from a saved getProgramAccounts response, as JSON
//! anchor-reviews list --snapshot accounts.json --json
//!
//! # Show the account tags used in scan filters
//! anchor-reviews discriminator Project Review
//!
//! # Decode one payload
//! anchor-reviews decode --type Review --data zT+8...
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reviews_transport::Cluster;
use tracing_subscriber::{fmt, EnvFilter};

mod reviews_cli;

use anchor_reviews::output::format_error;
use anchor_reviews::{ConfigOverrides, ReviewsConfig};
use reviews_cli::{decode::DecodeCmd, discriminator::DiscriminatorCmd, list::ListCmd};

#[derive(Parser)]
#[command(
    name = "anchor-reviews",
    author,
    version,
    about = "Discover projects and reviews stored by an Anchor program"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC endpoint (env: SOLANA_RPC_URL; default: devnet)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Well-known cluster: mainnet-beta, devnet, testnet, localnet
    #[arg(long, global = true, conflicts_with = "rpc_url")]
    cluster: Option<Cluster>,

    /// Program that owns the accounts (env: REVIEWS_PROGRAM_ID)
    #[arg(long, global = true)]
    program_id: Option<String>,

    /// Anchor IDL JSON file (env: REVIEWS_IDL_PATH; default: bundled)
    #[arg(long, global = true)]
    idl: Option<PathBuf>,

    /// Commitment level for reads (env: SOLANA_COMMITMENT)
    #[arg(long, global = true)]
    commitment: Option<String>,

    /// Request timeout in seconds (env: SOLANA_RPC_TIMEOUT_SECS; default: none)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects with their reviews
    List(ListCmd),

    /// Print account discriminators for type names
    Discriminator(DiscriminatorCmd),

    /// Decode one account payload against the IDL
    Decode(DecodeCmd),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let overrides = ConfigOverrides {
        rpc_url: cli.rpc_url,
        cluster: cli.cluster,
        program_id: cli.program_id,
        idl: cli.idl,
        commitment: cli.commitment,
        timeout_secs: cli.timeout_secs,
    };

    match cli.command {
        Commands::Discriminator(cmd) => cmd.execute(cli.json)?,
        Commands::Decode(cmd) => cmd.execute(&ReviewsConfig::resolve(&overrides)?)?,
        Commands::List(cmd) => {
            let config = ReviewsConfig::resolve(&overrides)?;
            let assembly = cmd.execute(&config, cli.json).await?;
            if reviews_cli::list::is_total_failure(&assembly) {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", format_error(&err, json).trim_end());
            ExitCode::FAILURE
        }
    }
}
