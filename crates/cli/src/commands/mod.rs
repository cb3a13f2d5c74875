use clap::{Args, Subcommand};

pub mod backup;
pub mod cache;
pub mod update;

use self::cache::CacheCommands;

/// Options of the update command, also accepted without a subcommand
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateArgs {
    /// Server entry under `servers:` whose directories to use
    #[arg(long, value_name = "NAME")]
    pub server: Option<String>,

    /// Paper version: `stable` (default), `latest` or an explicit version
    #[arg(long, value_name = "VERSION")]
    pub paper_version: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download new Paper, Geyser and Floodgate builds (the default)
    Update(UpdateArgs),

    /// Back up a server now, at most once per hour
    Backup {
        /// Server entry under `servers:`
        #[arg(long, value_name = "NAME")]
        server: String,
    },

    /// Manage the metadata cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}
