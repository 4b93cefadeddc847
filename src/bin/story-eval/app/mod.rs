mod commands;

use clap::Parser;

use story_eval::config::load_config;

use crate::args::{CliArgs, Command};
use crate::logging::init_logging;

pub async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    let _logger = init_logging(&config.logging)?;

    match args.command {
        Command::Run { prompts, limit } => {
            commands::run_batch(&config, prompts.as_deref(), limit).await
        }
        Command::Compare { tables } => commands::compare_tables(&tables),
        Command::Prompts => {
            commands::list_prompts();
            Ok(())
        }
    }
}
