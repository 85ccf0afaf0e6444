//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for haven
#[derive(Parser, Debug)]
#[command(name = "haven")]
#[command(author, version, about = "Disaster-preparedness assistant with guarded tool use")]
#[command(long_about = r#"
haven answers disaster-preparedness questions. Every answer is screened,
grounded in live weather and alert data, and checked before it is shown.
When an active hazard is in effect for your location, an evacuation route
is always included.

Configuration files are loaded from (in priority order):
1. HAVEN_* environment variables   (HAVEN_ORCHESTRATOR__MAX_TOOL_TURNS=3)
2. --config <path>                 Explicit config file
3. ./haven.toml                    Project-level config
4. ~/.config/haven/config.toml     Global config

Example:
  haven ask "Is there a hurricane warning in Miami?"
  haven chat
  haven check-config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write diagnostics to daily-rolling files in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask one question and print the answer
    Ask {
        /// The question
        question: String,

        /// Print tool calls and the validation verdict
        #[arg(long)]
        details: bool,
    },
    /// Interactive session on stdin (Ctrl-C cancels the running turn)
    Chat,
    /// Print the effective configuration as TOML
    Config,
    /// Validate the configuration and exit non-zero on errors
    CheckConfig,
}
