//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;

    if session.client().credentials().rehydrate().is_none() {
        output::warning("No active session");
    }

    session.logout().await;
    output::success("Logged out");

    Ok(())
}
