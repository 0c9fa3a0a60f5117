//! # trivia_ingest
//!
//! Command-line front end for the ingestion library.
//!
//! ## Usage
//!
//! ```sh
//! trivia_ingest show 6543
//! trivia_ingest download 6543 6544
//! trivia_ingest random
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use trivia_ingest::utils::ensure_writable_dir;
use trivia_ingest::{Config, Ingested, MatchId, Resolver};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(dir) = args.media_root {
        config.media_root = dir;
    }

    let resolver = Resolver::new(&config)?;

    match args.command {
        Command::Show { id } => {
            let id = MatchId::new(id);
            match resolver.resolve(&id).await {
                Ok(Ingested::Complete(game)) => {
                    println!("{}", serde_json::to_string_pretty(&game)?);
                }
                Ok(Ingested::Incomplete(why)) => {
                    println!("{why}");
                }
                Err(e) => {
                    error!(%id, error = %e, "Match could not be loaded");
                    eprintln!("{}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        Command::Download { ids } => {
            if let Err(e) = ensure_writable_dir(&config.cache_dir).await {
                error!(
                    path = %config.cache_dir.display(),
                    error = %e,
                    "Cache directory is not writable (fix perms or choose a different path)"
                );
                return Err(e.into());
            }
            let ids: Vec<MatchId> = ids.into_iter().map(MatchId::new).collect();
            let results = resolver.fetcher().download_all(&ids).await;
            for (id, result) in &results {
                match result {
                    Ok(tier) => println!("{id}: saved ({tier})"),
                    Err(e) => println!("{id}: {}", e.user_message()),
                }
            }
        }
        Command::Random => {
            let id = resolver.fetcher().random_identifier().await?;
            println!("{id}");
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}
