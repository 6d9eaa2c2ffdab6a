//! Console entry point.
//!
//! # Responsibility
//! - Merge environment and flag configuration.
//! - Pick the record store (SQLite file or memory) and run the menu.

mod args;
mod menu;

use args::Cli;
use clap::Parser;
use friendmap_core::db::open_db;
use friendmap_core::{
    init_logging, AppConfig, InMemoryUserRepository, LeafletMap, SqliteUserRepository,
    Synchronizer, WikipediaGeocoder,
};
use log::info;
use menu::Menu;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("friendmap: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config)?;

    let log_dir = absolute_dir(&config.log_dir)?;
    if let Err(err) = init_logging(&config.log_level, &log_dir) {
        eprintln!("friendmap: file logging disabled: {err}");
    }

    let geocoder = WikipediaGeocoder::new(
        &config.wiki_base_url,
        &config.user_agent,
        config.request_timeout,
    )?;

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut menu = Menu::new(&mut input, &mut output, &config);

    match &config.db_path {
        Some(path) => {
            let conn = open_db(path)?;
            let repository = SqliteUserRepository::new(&conn);
            let mut sync = Synchronizer::new(repository, geocoder, LeafletMap::default());
            menu.run(&mut sync)?;
        }
        None => {
            info!("event=store_select module=cli status=ok mode=memory");
            let mut sync =
                Synchronizer::new(InMemoryUserRepository::new(), geocoder, LeafletMap::default());
            menu.run(&mut sync)?;
        }
    }

    Ok(())
}

fn absolute_dir(dir: &std::path::Path) -> io::Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(dir))
}
