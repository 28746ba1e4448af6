use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the paths to avoid repeated environment lookups
static TWITCHER_HOME: OnceLock<PathBuf> = OnceLock::new();
static TWITCHER_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the twitcher home directory
/// Checks the TWITCHER_HOME environment variable, falls back to ~/.twitcher
pub fn twitcher_home() -> PathBuf {
    TWITCHER_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("TWITCHER_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".twitcher")
            }
        })
        .clone()
}

/// Get the twitcher data directory
/// Checks the TWITCHER_DATA_DIR environment variable, falls back to TWITCHER_HOME
pub fn twitcher_data_dir() -> PathBuf {
    TWITCHER_DATA_DIR
        .get_or_init(|| {
            if let Ok(path) = std::env::var("TWITCHER_DATA_DIR") {
                PathBuf::from(path)
            } else {
                twitcher_home()
            }
        })
        .clone()
}

/// Default location of the config file
pub fn config_path() -> PathBuf {
    twitcher_home().join("config.toml")
}
