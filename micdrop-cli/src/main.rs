mod cli;
mod commands;
mod console_delegate;
mod signals;

use clap::Parser;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match &cli.command {
        Command::Record(args) => commands::record(args),
        Command::Devices(args) => commands::devices(args),
        Command::Inspect { file } => commands::inspect(file),
    }
}
