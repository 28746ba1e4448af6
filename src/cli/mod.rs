pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "twitcher",
    version,
    about = "Find the birds you still need, and where to go see them",
    long_about = "Twitcher compares recent eBird sightings near you against your personal \
                  record, works out which species would be new for the list you are filling, \
                  and ranks nearby locations by how many of them you could pick up."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find needed birds nearby and the best places to see them
    Find(commands::find::FindArgs),

    /// Inspect or rebuild the regional frequency cache
    Cache(commands::cache::CacheArgs),

    /// Summarize your personal observation history
    History(commands::history::HistoryArgs),
}
