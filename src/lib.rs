pub mod cli;
pub mod core;
pub mod ebird;
pub mod report;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwitcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed taxonomy: {0}")]
    Taxonomy(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unrecognized history format: {0}")]
    UnrecognizedFormat(String),

    #[error("History file produced no usable entries")]
    EmptyHistory,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("eBird API error: {0}")]
    Api(String),

    #[error("{0}")]
    Other(String),
}

impl From<csv::Error> for TwitcherError {
    fn from(e: csv::Error) -> Self {
        TwitcherError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TwitcherError>;
