use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use rusqlite::Connection;

use waqt::cli::args::{Cli, Commands};
use waqt::cli::handlers;
use waqt::config::AppConfig;
use waqt::db::migrations::run_migrations;
use waqt::db::repository::MetaRepo;

fn main() -> Result<()> {
    env_logger::init();
    waqt::prayer_times::calculator::silence_calculation_panics();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Setup { reset }) => {
            handlers::handle_setup(&conn, &mut config, reset)?;
        }

        // Settings changes work without a finished setup
        Some(Commands::Set { key, value }) => {
            handlers::handle_set(&conn, &mut config, &key, &value)?;
        }
        Some(Commands::Location { preset, list }) => {
            handlers::handle_location(&conn, &mut config, preset.as_deref(), list)?;
        }

        Some(cmd) => {
            ensure_setup(&conn, &mut config)?;
            match cmd {
                Commands::Times { date, json } => {
                    handlers::handle_times(&conn, &config, date.as_deref(), json)?;
                }
                Commands::Next { seconds } => {
                    handlers::handle_next(&conn, &config, seconds)?;
                }
                Commands::Month { month, year } => {
                    handlers::handle_month(&conn, &config, month, year)?;
                }
                Commands::Import { file, format } => {
                    handlers::handle_import(&conn, &config, &file, format)?;
                }
                Commands::Setup { .. } | Commands::Set { .. } | Commands::Location { .. } => {}
            }
        }

        // No subcommand → launch TUI
        None => {
            ensure_setup(&conn, &mut config)?;
            waqt::tui::run(&conn, config)?;
        }
    }

    Ok(())
}

/// Run the wizard first if setup has never completed. Without a terminal on
/// stdout the saved (or default) configuration is used as is.
fn ensure_setup(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let done = MetaRepo::get(conn, "setup_done")?;
    if done.as_deref() == Some("1") {
        return Ok(());
    }
    if !std::io::stdout().is_terminal() {
        log::info!("setup not done; using {} without the wizard", config.location.name);
        return Ok(());
    }
    eprintln!("No configuration found. Running setup...");
    eprintln!();
    handlers::handle_setup(conn, config, false)
}
