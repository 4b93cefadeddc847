use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "story-eval",
    about = "Generate story continuations and score them with an LLM judge"
)]
pub struct CliArgs {
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    /// Overrides the configured log level, e.g. `debug` or `story_eval=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate, judge and tabulate every prompt.
    Run {
        /// Newline-delimited prompt file; the built-in prompts otherwise.
        #[arg(long, short = 'p')]
        prompts: Option<PathBuf>,
        /// Only score the first N prompts.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Compare two or more result tables.
    Compare {
        #[arg(required = true, num_args = 2..)]
        tables: Vec<PathBuf>,
    },
    /// Print the built-in prompts.
    Prompts,
}
