use clap::Parser;
use mcup_cli::{Commands, Context, UpdateArgs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mcup")]
#[command(about = "Minecraft server updater: Paper, Geyser and Floodgate, with hourly backups", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output (MCUP_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    update: UpdateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = mcup_utils::tracing::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let context = Context::new(cli.config);
    // Without a subcommand, update
    let command = cli.command.unwrap_or(Commands::Update(cli.update));

    match command.execute(&context) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = %e.kind(), "{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
