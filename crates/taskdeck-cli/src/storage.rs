//! Credential persistence for the CLI.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use taskdeck::{ApiUrl, AuthSession, ClientConfig, FileStorage};
use tracing::debug;

/// Path of the credentials file in the platform data directory.
fn credentials_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "taskdeck").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("credentials.json"))
}

/// Build an auth session against `api_url`, persisting to the data directory.
///
/// Stored credentials are not loaded yet; commands decide whether to
/// rehydrate or to validate them against the server first.
pub fn open_session(api_url: &str) -> Result<AuthSession> {
    let base_url = ApiUrl::new(api_url).context("Invalid API URL")?;
    let path = credentials_path()?;
    debug!(path = %path.display(), api = %base_url, "Opening session");
    let storage = Arc::new(FileStorage::new(path));
    let config = ClientConfig::new(base_url);

    AuthSession::new(&config, storage).context("Failed to create HTTP client")
}
