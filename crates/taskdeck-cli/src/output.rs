//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use taskdeck::UserProfile;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the fields of a user profile.
pub fn profile(user: &UserProfile) {
    let id = match user.id.as_str() {
        Some(id) => id.to_string(),
        None => user.id.to_string(),
    };
    field("ID", &id);
    field("Email", &user.email);
    field("Name", &user.display_name());
    if let Some(role) = &user.role {
        field("Role", role);
    }
    if let Some(status) = &user.status {
        field("Status", status);
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
