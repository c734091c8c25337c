//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use taskdeck::Registration;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Role to request; the server picks a default when omitted
    #[arg(long)]
    pub role: Option<String>,
}

pub async fn run(args: RegisterArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;

    let mut registration =
        Registration::new(args.email, args.password, args.first_name, args.last_name);
    if let Some(role) = args.role {
        registration = registration.with_role(role);
    }

    eprintln!("{}", "Creating account...".dimmed());

    let user = session
        .register(registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::profile(&user);

    Ok(())
}
