pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod matchmaking;
pub mod rating;
pub mod services;
pub mod store;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::domain::parse_import_entries;
use crate::services::server::{open_store, ServerService};
use crate::services::{CatalogService, MaintenanceService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_import(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    let batch = parse_import_entries(&body)?;

    let config = AppConfig::new();
    let catalog = CatalogService::new(open_store(&config)?, config.rating);
    let summary = catalog.import(&batch)?;

    println!(
        "{} {} entries, {} new, {} games in wishlist",
        "Imported".green().bold(),
        summary.imported,
        summary.added,
        summary.total
    );
    Ok(())
}

pub fn handle_ranked(limit: usize) -> Result<()> {
    let config = AppConfig::new();
    let catalog = CatalogService::new(open_store(&config)?, config.rating);
    let board = catalog.leaderboard(None, limit)?;

    println!(
        "{} ({} games, {} matches played)",
        "Leaderboard".bold(),
        board.count,
        catalog.total_played()?
    );
    for (rank, ranked) in board.games.iter().enumerate() {
        let game = &ranked.game;
        println!(
            "{:>4}. {:>7} {} {}",
            rank + 1,
            format!("{:.1}", game.rating).cyan(),
            game.title,
            format!("({}W/{}L, {:.1}%)", game.wins, game.losses, ranked.winrate_percent).dimmed()
        );
    }
    Ok(())
}

pub fn handle_reset() -> Result<()> {
    let config = AppConfig::new();
    let maintenance = MaintenanceService::new(open_store(&config)?, config.rating.clone(), &config.storage);
    let version = maintenance.reset_ratings()?;
    println!(
        "{} all ratings, previous state saved as snapshot {}",
        "Reset".yellow().bold(),
        version
    );
    Ok(())
}

pub fn handle_snapshot() -> Result<()> {
    let config = AppConfig::new();
    let maintenance = MaintenanceService::new(open_store(&config)?, config.rating.clone(), &config.storage);
    let version = maintenance.save_snapshot()?;
    println!("{} snapshot {}", "Saved".green().bold(), version);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
