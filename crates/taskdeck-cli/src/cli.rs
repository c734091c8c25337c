//! CLI argument definitions.

use clap::Parser;

use crate::commands::Command;

/// Default API base URL for a locally running server.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Command-line client for a taskdeck API server.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version = env!("TASKDECK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = "TASKDECK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}
