//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetch trivia matches from archived episode pages or spreadsheet templates.
///
/// # Examples
///
/// ```sh
/// # Print a match as JSON
/// trivia_ingest show 6543
///
/// # Save several episode pages to the cache
/// trivia_ingest download 6543 6544 6545
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of cached episode pages (overrides the config file)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Root directory of clue media (overrides the config file)
    #[arg(long)]
    pub media_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fetch a match and print it as JSON
    Show {
        /// Episode id or spreadsheet key
        id: String,
    },
    /// Save episode pages to the cache, pausing between network fetches
    Download {
        /// Episode ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print a random episode id from the live site
    Random,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_show() {
        let cli = Cli::parse_from(["trivia_ingest", "show", "6543"]);
        assert_eq!(cli.command, Command::Show { id: "6543".to_string() });
        assert!(cli.cache_dir.is_none());
    }

    #[test]
    fn test_cli_download_with_overrides() {
        let cli = Cli::parse_from([
            "trivia_ingest",
            "--cache-dir",
            "/tmp/games",
            "-c",
            "conf.yaml",
            "download",
            "1",
            "2",
        ]);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/games")));
        assert_eq!(cli.config, Some(PathBuf::from("conf.yaml")));
        assert_eq!(
            cli.command,
            Command::Download {
                ids: vec!["1".to_string(), "2".to_string()]
            }
        );
    }

    #[test]
    fn test_cli_download_requires_ids() {
        assert!(Cli::try_parse_from(["trivia_ingest", "download"]).is_err());
    }
}
