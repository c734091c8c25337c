//! Upload command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use taskdeck::MultipartPayload;

use crate::output;
use crate::storage;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// API path relative to the base URL (e.g. /files/upload)
    pub path: String,

    /// File to upload
    pub file: PathBuf,

    /// Form field name for the file part
    #[arg(long, default_value = "file")]
    pub field: String,

    /// MIME type of the file part
    #[arg(long)]
    pub content_type: Option<String>,

    /// Extra text fields as key=value
    #[arg(long = "form", value_name = "KEY=VALUE")]
    pub form: Vec<String>,
}

pub async fn run(args: UploadArgs, api_url: &str) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no usable file name")?
        .to_string();

    let mut payload = MultipartPayload::new();
    for pair in &args.form {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid form field '{}', expected KEY=VALUE", pair);
        };
        payload = payload.text(key, value);
    }
    payload = payload.file(args.field, file_name, args.content_type, bytes);

    let session = storage::open_session(api_url)?;
    session.client().credentials().rehydrate();

    eprintln!("{}", format!("Uploading {}...", args.file.display()).dimmed());

    let data: Value = session
        .client()
        .upload(&args.path, payload)
        .await
        .context("Upload failed")?;

    output::success("Uploaded");
    output::json_pretty(&data)
}
