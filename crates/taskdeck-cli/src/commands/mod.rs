//! Subcommand implementations.

mod get;
mod login;
mod logout;
mod refresh_token;
mod register;
mod upload;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session credentials
    Login(login::LoginArgs),

    /// Create an account and sign in
    Register(register::RegisterArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for a new credential pair
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Sign out and forget the stored credentials
    Logout(logout::LogoutArgs),

    /// GET an API path and print the response data
    Get(get::GetArgs),

    /// Upload a file to an API path as multipart form data
    Upload(upload::UploadArgs),
}

pub async fn handle(cmd: Command, api_url: &str) -> Result<()> {
    match cmd {
        Command::Login(args) => login::run(args, api_url).await,
        Command::Register(args) => register::run(args, api_url).await,
        Command::Whoami(args) => whoami::run(args, api_url).await,
        Command::RefreshToken(args) => refresh_token::run(args, api_url).await,
        Command::Logout(args) => logout::run(args, api_url).await,
        Command::Get(args) => get::run(args, api_url).await,
        Command::Upload(args) => upload::run(args, api_url).await,
    }
}
