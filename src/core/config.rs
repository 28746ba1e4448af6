use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::paths::twitcher_data_dir;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub files: FilesConfig,
    pub search: SearchConfig,
    pub regions: RegionsConfig,
    pub ebird: EbirdConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// eBird taxonomy CSV; defaults to the data dir
    pub taxonomy: Option<PathBuf>,
    /// Personal record export ("MyEBirdData.csv")
    pub life_list: Option<PathBuf>,
    /// Directory holding the per-region barchart exports
    pub frequency_dir: Option<PathBuf>,
    /// Frequency model cache file
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub days_back: u32,
    pub distance_km: u32,
    pub include_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Region codes the frequency model covers
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EbirdConfig {
    pub api_url: String,
    /// The EBIRD_API_KEY environment variable wins over this
    pub api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            region: "US-LA".to_string(),
            latitude: 30.47,
            longitude: -90.03,
            days_back: 7,
            distance_km: 25,
            include_private: false,
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            codes: default_region_codes(),
        }
    }
}

impl Default for EbirdConfig {
    fn default() -> Self {
        Self {
            api_url: crate::ebird::DEFAULT_API_URL.to_string(),
            api_key: None,
        }
    }
}

/// The supported scope: lower 48 plus Alaska, and the Canadian provinces
/// and territories. Hawaii is deliberately absent.
pub fn default_region_codes() -> Vec<String> {
    const US: [&str; 49] = [
        "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DE", "FL", "GA", "IA", "ID", "IL", "IN", "KS",
        "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE", "NH", "NJ",
        "NM", "NV", "NY", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VA", "VT",
        "WA", "WI", "WV", "WY",
    ];
    const CANADA: [&str; 13] = [
        "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
    ];
    US.iter()
        .map(|s| format!("US-{}", s))
        .chain(CANADA.iter().map(|p| format!("CA-{}", p)))
        .collect()
}

impl Config {
    pub fn taxonomy_path(&self) -> PathBuf {
        self.files
            .taxonomy
            .clone()
            .unwrap_or_else(|| twitcher_data_dir().join("ebird_taxonomy.csv"))
    }

    pub fn life_list_path(&self) -> PathBuf {
        self.files
            .life_list
            .clone()
            .unwrap_or_else(|| twitcher_data_dir().join("MyEBirdData.csv"))
    }

    pub fn frequency_dir(&self) -> PathBuf {
        self.files
            .frequency_dir
            .clone()
            .unwrap_or_else(|| twitcher_data_dir().join("data"))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.files
            .cache
            .clone()
            .unwrap_or_else(|| twitcher_data_dir().join("regiondata.json"))
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::TwitcherError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::TwitcherError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::TwitcherError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::TwitcherError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
