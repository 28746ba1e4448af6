use clap::{Args, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::core::frequency::RegionalFrequencyModel;
use crate::core::taxonomy::TaxonomyIndex;

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show whether the frequency cache is present, fresh, and well-formed
    Status(StatusArgs),

    /// Rebuild the frequency cache from the barchart files
    Rebuild(StatusArgs),
}

#[derive(Args)]
pub struct StatusArgs {
    /// Config file (defaults to ~/.twitcher/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: CacheArgs) -> anyhow::Result<()> {
    match args.command {
        CacheCommands::Status(args) => run_status(args),
        CacheCommands::Rebuild(args) => run_rebuild(args),
    }
}

fn run_status(args: StatusArgs) -> anyhow::Result<()> {
    let config = super::load_or_default(args.config.as_deref())?;
    let cache_path = config.cache_path();
    let regions = &config.regions.codes;

    println!("Cache file: {}", cache_path.display());
    if !cache_path.exists() {
        println!("Status: {}", "missing".red());
        return Ok(());
    }

    let fresh = RegionalFrequencyModel::cache_is_fresh(&cache_path, &config.frequency_dir(), regions);
    if !fresh {
        println!("Status: {}", "stale (a source file is newer)".yellow());
        return Ok(());
    }

    // Status only inspects; rebuilding is the rebuild command's job
    let taxonomy = TaxonomyIndex::load(config.taxonomy_path())?;
    match RegionalFrequencyModel::load_cache(&cache_path, regions, &taxonomy) {
        Some(model) => {
            println!("Status: {}", "fresh".green());
            println!("Regions covered: {}", model.region_count());
            for region in regions.iter().take(5) {
                if let Some(count) = model.species_count(region) {
                    println!("  {}: {} species", region, count);
                }
            }
        }
        None => println!(
            "Status: {} (run `twitcher cache rebuild`)",
            "invalid".red()
        ),
    }
    Ok(())
}

fn run_rebuild(args: StatusArgs) -> anyhow::Result<()> {
    let config = super::load_or_default(args.config.as_deref())?;
    let taxonomy = TaxonomyIndex::load(config.taxonomy_path())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!(
        "Rebuilding frequency model for {} regions...",
        config.regions.codes.len()
    ));

    let model =
        RegionalFrequencyModel::rebuild(&config.frequency_dir(), &config.regions.codes, &taxonomy)?;
    // A forced rebuild should not fail silently on persist
    model.save_cache(&config.cache_path())?;
    pb.finish_with_message(format!(
        "Rebuilt {} regions into {}",
        model.region_count(),
        config.cache_path().display()
    ));
    Ok(())
}
