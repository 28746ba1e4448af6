use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::core::history::ObservationHistory;
use crate::core::taxonomy::TaxonomyIndex;

#[derive(Args)]
pub struct HistoryArgs {
    /// Config file (defaults to ~/.twitcher/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let config = super::load_or_default(args.config.as_deref())?;
    let taxonomy = TaxonomyIndex::load(config.taxonomy_path())?;
    let history = ObservationHistory::load(config.life_list_path(), &taxonomy)?;

    println!("{}", "Observation history".bold());
    println!("  File: {}", config.life_list_path().display());
    println!("  Species recorded: {}", history.species_count());
    println!("  Regions recorded: {}", history.region_count());

    let years = history.years();
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => {
            println!("  Years: {} to {}", first, last)
        }
        (Some(only), _) => println!("  Years: {}", only),
        _ => {}
    }
    Ok(())
}
