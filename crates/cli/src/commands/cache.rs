use crate::context::Context;
use clap::Subcommand;
use mcup_core::Result;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommands {
    /// Clear all cached metadata
    Clear,
}

impl CacheCommands {
    pub fn execute(self, context: &Context) -> Result<()> {
        match self {
            CacheCommands::Clear => {
                let config = context.optional_config()?;
                let store = context.cache_store(&config);
                store.clear()?;
                tracing::info!(path = %store.path().display(), "Cache cleared");
                Ok(())
            }
        }
    }
}
