//! Walks through every IOC Lists operation against the live service.
//!
//! Reads `IOCLISTS_API_KEY` (and the optional `IOCLISTS_*` overrides) plus
//! `IOCLISTS_USERNAME` from the environment.

use std::env;
use std::process::ExitCode;

use ioclists_core::{ClientConfig, ClientError, CreateListParameters, IocListsClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LIST_NAME: &str = "testing-list";
const DEFAULT_FILTER: &str = "info,ioclists_core=debug";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            env::var("IOCLISTS_LOG")
                .map_err(|_| ())
                .and_then(|value| EnvFilter::try_new(value).map_err(|_| ()))
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let username = match env::var("IOCLISTS_USERNAME") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            eprintln!("IOCLISTS_USERNAME must be set to your IOC Lists account name");
            return ExitCode::FAILURE;
        }
    };

    match run(&username).await {
        Ok(()) => {
            println!("\nDemo finished.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(kind = ?err.kind(), status = ?err.status_code(), "demo failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(username: &str) -> Result<(), ClientError> {
    let client = IocListsClient::new(ClientConfig::from_env()?)?;

    println!("\n> Creating a new list");
    let params = CreateListParameters::new(username, LIST_NAME)
        .with_description("This is a list created using the Rust IOC Lists library.");
    client.create_list(&params).await?;
    println!("List successfully created.");

    println!("\n> Adding an indicator");
    client
        .add(username, LIST_NAME, "https://example[.]com -- Testing Indicator")
        .await?;
    println!("Indicator successfully added. It may take a few seconds to appear.");

    println!("\n> Getting the most recent entries from 'mirrors/phishtank'");
    let recent = client.get_recent("mirrors", "phishtank").await?;
    info!(count = recent.len(), "fetched recent entries");
    for entry in &recent {
        println!("({}) {}", entry.added_at, entry.raw);
    }

    println!("\n> Getting all unique entries from 'mirrors/phishtank'");
    let unique = client.get_unique("mirrors", "phishtank").await?;
    println!("Fetched {} unique entries", unique.len());
    println!("Preview: {}", unique.iter().take(5).cloned().collect::<Vec<_>>().join(", "));

    println!("\n> Searching for an indicator across the platform");
    let matches = client.search("62.216.168.7").await?;
    let plural = if matches.len() == 1 { "" } else { "s" };
    println!("Query is present in {} indicator{plural}.", matches.len());
    let lists: Vec<String> = matches
        .iter()
        .map(|entry| format!("{}/{}", entry.username, entry.list_name))
        .collect();
    println!("Lists: {}", lists.join(", "));

    Ok(())
}
