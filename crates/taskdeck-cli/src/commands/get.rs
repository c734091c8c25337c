//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// API path relative to the base URL (e.g. /projects)
    pub path: String,
}

pub async fn run(args: GetArgs, api_url: &str) -> Result<()> {
    let session = storage::open_session(api_url)?;
    session.client().credentials().rehydrate();

    let data: Value = session
        .client()
        .get(&args.path)
        .await
        .with_context(|| format!("GET {} failed", args.path))?;

    output::json_pretty(&data)
}
