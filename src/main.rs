use anyhow::Result;

use wishlist_ranker::cli::Command;
use wishlist_ranker::{
    handle_completions, handle_import, handle_ranked, handle_reset, handle_serve, handle_snapshot, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Import { path } => handle_import(path),
        Command::Ranked { limit } => handle_ranked(*limit),
        Command::Reset => handle_reset(),
        Command::Snapshot => handle_snapshot(),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
