pub mod cache;
pub mod find;
pub mod history;

use std::path::Path;

use crate::core::config::{load_config, Config};
use crate::core::paths;

/// Explicit config path, else the default path when a file is there,
/// else built-in defaults.
pub(crate) fn load_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => {
            let default = paths::config_path();
            if default.exists() {
                Ok(load_config(&default)?)
            } else {
                Ok(Config::default())
            }
        }
    }
}
