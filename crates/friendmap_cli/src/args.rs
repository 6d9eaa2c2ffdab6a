//! Command-line flags; each one overrides its `FRIENDMAP_*` variable.

use clap::Parser;
use friendmap_core::{AppConfig, ConfigError};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "friendmap",
    version,
    about = "Keep a list of friends and map where they live"
)]
pub struct Cli {
    /// SQLite database file. Records are kept in memory when omitted.
    #[arg(long, value_name = "PATH", conflicts_with = "in_memory")]
    pub db: Option<PathBuf>,

    /// Ignore any configured database and keep records in memory.
    #[arg(long)]
    pub in_memory: bool,

    /// Encyclopedia base url used for coordinate lookups.
    #[arg(long, value_name = "URL")]
    pub wiki_url: Option<String>,

    /// Directory that generated map files are written to.
    #[arg(long, value_name = "DIR")]
    pub map_dir: Option<PathBuf>,

    /// Abort coordinate lookups after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Applies flags on top of `config`.
    pub fn apply(self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(url) = self.wiki_url {
            config.set_wiki_base_url(url)?;
        }
        if self.in_memory {
            config.db_path = None;
        } else if let Some(db) = self.db {
            config.db_path = Some(db);
        }
        if let Some(dir) = self.map_dir {
            config.map_dir = dir;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        Ok(())
    }
}
