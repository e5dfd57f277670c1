pub mod config;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use commitstreak_core::{Config, ConfigError};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}

/// State file location inside the working tree.
pub fn state_path(repo: &Path, state_file: &Path) -> PathBuf {
    repo.join(state_file)
}
