use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};

/// Run the CLI binary with arguments and no configured server.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskdeck"));
    cmd.args(args);
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME directory for isolated credential storage.
pub fn run_cli_with_env(args: &[&str], home: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskdeck"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("TASKDECK_API_URL", api_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so the mock server keeps serving.
pub async fn run_cli_async(args: &[&str], home: &Path, api_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let home = home.to_path_buf();
    let api_url = api_url.to_string();

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &home, &api_url)
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli_async(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Where the CLI keeps credentials under an isolated HOME (Linux layout).
pub fn credentials_file(home: &Path) -> PathBuf {
    home.join("data").join("taskdeck").join("credentials.json")
}

/// Wrap `data` in the server's success envelope.
pub fn envelope(data: Value) -> Value {
    json!({
        "success": true,
        "message": "OK",
        "data": data,
        "timestamp": "2024-05-01T12:00:00.000Z"
    })
}

pub fn user_json() -> Value {
    json!({
        "id": 1,
        "email": "a@b.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "member",
        "status": "active"
    })
}
