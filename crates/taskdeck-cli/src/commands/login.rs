//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use taskdeck::Credentials;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;

    eprintln!("{}", "Logging in...".dimmed());

    let user = session
        .login(Credentials::new(args.email, args.password))
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::profile(&user);
    output::field("API", api_url);

    Ok(())
}
