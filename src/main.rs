mod cli;
mod commands;
mod config;
mod flow;
mod prompt;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{Settings, StratusConfig};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let config = StratusConfig::load()?;
    let settings = Settings::resolve(&cli, config);

    match &cli.command {
        Command::Create(args) => commands::create::run(&settings, args),
        Command::Update(args) => commands::update::run(&settings, args),
        Command::List(args) => commands::list::run(&settings, args),
        Command::Describe(args) => commands::describe::run(&settings, args),
        Command::Events(args) => commands::events::run(&settings, args),
        Command::Inspect(args) => commands::inspect::run(&settings, args),
        Command::Destroy(args) => commands::destroy::run(&settings, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "stratus", &mut io::stdout());
            Ok(())
        }
    }
}
