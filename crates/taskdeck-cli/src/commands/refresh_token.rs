//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;
    let credentials = session.client().credentials();

    credentials
        .rehydrate()
        .context("No active session. Run 'taskdeck login' first.")?;

    eprintln!("{}", "Refreshing session...".dimmed());

    // A rejected refresh token clears the stored credentials.
    session
        .client()
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");

    Ok(())
}
