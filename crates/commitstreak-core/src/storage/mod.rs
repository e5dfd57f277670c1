mod config;

pub use config::{ActivityConfig, CalendarConfig, Config, RepoConfig};

use std::path::PathBuf;

/// Returns `~/.config/commitstreak[-dev]/` based on COMMITSTREAK_ENV.
///
/// Set COMMITSTREAK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("COMMITSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("commitstreak-dev")
    } else {
        base_dir.join("commitstreak")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
