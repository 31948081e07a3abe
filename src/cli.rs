use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank a game wishlist through head-to-head votes")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the web server
    Serve {
        /// Port number (optional, defaults to 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Merge a wishlist JSON file (list or appid-keyed object) into the database
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Print the current leaderboard
    Ranked {
        /// Number of games to show
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Snapshot the database, then reset every rating and clear history
    Reset,
    /// Save a snapshot of the database
    Snapshot,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
