use crate::commands::{backup, update, Commands};
use crate::context::Context;
use mcup_core::Result;

impl Commands {
    pub fn execute(self, context: &Context) -> Result<()> {
        match self {
            Commands::Update(args) => update::execute(args, context),
            Commands::Backup { server } => backup::execute(context, &server),
            Commands::Cache { command } => command.execute(context),
        }
    }
}
