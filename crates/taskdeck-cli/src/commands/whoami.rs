//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the full profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;

    let user = session
        .initialize_auth()
        .await
        .context("Failed to restore session")?
        .context("No active session. Run 'taskdeck login' first.")?;

    if args.json {
        output::json_pretty(&user)?;
    } else {
        output::profile(&user);
    }

    Ok(())
}
