//! List command - discover projects and their reviews

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use reviews_core::{assemble, Assembly, RecordKind};
use reviews_transport::{infer_cluster_from_url, SnapshotScanner};
use tracing::info;

use anchor_reviews::output::{format_listing, format_report, listing_json};
use anchor_reviews::ReviewsConfig;

#[derive(Parser, Debug)]
#[command(about = "List projects with their reviews")]
pub struct ListCmd {
    /// Read accounts from a saved getProgramAccounts response instead of the node
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

impl ListCmd {
    /// Returns the assembly so the caller can pick an exit status.
    pub async fn execute(&self, config: &ReviewsConfig, json_output: bool) -> Result<Assembly> {
        let idl = config.load_idl()?;

        let assembly = match &self.snapshot {
            Some(path) => {
                let scanner = SnapshotScanner::from_file(path)
                    .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
                info!(accounts = scanner.len(), "loaded snapshot");
                assemble(&scanner, &config.program_id, &idl).await
            }
            None => {
                let client = config.rpc_client();
                let cluster = infer_cluster_from_url(client.endpoint())
                    .map(|c| c.name())
                    .unwrap_or("custom");
                info!(
                    endpoint = client.endpoint(),
                    cluster,
                    program = %config.program_id,
                    "scanning"
                );
                assemble(&client, &config.program_id, &idl).await
            }
        }
        .map_err(|e| anyhow!(e))?;

        if json_output {
            println!("{}", serde_json::to_string_pretty(&listing_json(&assembly))?);
        } else {
            print!("{}", format_listing(&assembly));
            if let Some(report) = format_report(&assembly) {
                print!("\n{}", report);
            }
        }
        Ok(assembly)
    }
}

/// Nothing usable came back: both kinds failed outright.
pub fn is_total_failure(assembly: &Assembly) -> bool {
    RecordKind::ALL
        .iter()
        .all(|kind| assembly.failure_for(*kind).is_some())
}
