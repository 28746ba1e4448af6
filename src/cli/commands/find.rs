use clap::Args;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::frequency::RegionalFrequencyModel;
use crate::core::history::ObservationHistory;
use crate::core::needs::{ListKind, ListQuery};
use crate::core::places;
use crate::core::taxonomy::TaxonomyIndex;
use crate::ebird::{EbirdClient, ObservationSource, SearchArea};
use crate::report::{self, Report, RunSummary};
use crate::TwitcherError;

#[derive(Args)]
pub struct FindArgs {
    /// Which list you are trying to fill
    #[arg(short, long, value_enum, default_value = "state-life")]
    pub mode: ListKind,

    /// Region code for state lists (e.g. US-LA)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Search center latitude
    #[arg(long)]
    pub lat: Option<f64>,

    /// Search center longitude
    #[arg(long)]
    pub lng: Option<f64>,

    /// How many days of sightings to consider
    #[arg(long)]
    pub days_back: Option<u32>,

    /// Search radius in kilometers
    #[arg(long)]
    pub dist_km: Option<u32>,

    /// Also collect locations flagged private
    #[arg(long)]
    pub include_private: bool,

    /// Year for year lists (defaults to the current year)
    #[arg(long)]
    pub year: Option<String>,

    /// Text report destination
    #[arg(short, long, default_value = "results.txt")]
    pub output: PathBuf,

    /// Mapping-tool CSV destination
    #[arg(long, default_value = "googlemap.csv")]
    pub map_output: PathBuf,

    /// Config file (defaults to ~/.twitcher/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// eBird API key
    #[arg(long, env = "EBIRD_API_KEY")]
    pub api_key: Option<String>,
}

struct Search {
    region: String,
    area: SearchArea,
    include_private: bool,
    year: String,
}

impl Search {
    fn from(args: &FindArgs, config: &Config) -> Self {
        Self {
            region: args
                .region
                .clone()
                .unwrap_or_else(|| config.search.region.clone()),
            area: SearchArea {
                lat: args.lat.unwrap_or(config.search.latitude),
                lng: args.lng.unwrap_or(config.search.longitude),
                days_back: args.days_back.unwrap_or(config.search.days_back),
                dist_km: args.dist_km.unwrap_or(config.search.distance_km),
            },
            include_private: args.include_private || config.search.include_private,
            year: args
                .year
                .clone()
                .unwrap_or_else(|| chrono::Local::now().format("%Y").to_string()),
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}

pub fn run(args: FindArgs) -> anyhow::Result<()> {
    let config = super::load_or_default(args.config.as_deref())?;
    let search = Search::from(&args, &config);
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.ebird.api_key.clone())
        .ok_or_else(|| {
            TwitcherError::Config(
                "no eBird API key; set EBIRD_API_KEY or [ebird].api_key".to_string(),
            )
        })?;

    let pb = spinner("Loading reference data...".to_string());
    let taxonomy = TaxonomyIndex::load(config.taxonomy_path())?;
    let history = ObservationHistory::load(config.life_list_path(), &taxonomy)?;
    let model = RegionalFrequencyModel::load_or_rebuild(
        &config.cache_path(),
        &config.frequency_dir(),
        &config.regions.codes,
        &taxonomy,
    )?;
    pb.finish_with_message(format!(
        "Loaded {} taxa, {} species in your history",
        taxonomy.len(),
        history.species_count()
    ));

    let description = args.mode.describe(&search.region);
    let summary = RunSummary {
        list_description: description.clone(),
        days_back: search.area.days_back,
        dist_km: search.area.dist_km,
        lat: search.area.lat,
        lng: search.area.lng,
    };

    let client = EbirdClient::new(&config.ebird.api_url, &api_key)?;
    let pb = spinner("Fetching recent sightings...".to_string());
    let sightings = client.recent_sightings(&search.area)?;
    pb.finish_with_message(format!("{} recent sightings", sightings.len()));

    if sightings.is_empty() {
        println!("You asked for birds needed for your {}.", description);
        println!("Unfortunately, no sightings were reported.");
        return Ok(());
    }

    let candidates = taxonomy.retain_countable(sightings);
    let query = ListQuery::new(args.mode, search.region.clone(), search.year.clone());
    let needs = query.needed(candidates, &history);
    if needs.is_empty() {
        println!(
            "You asked for {}, but you've seen it all! No birds needed in this area.",
            description
        );
        return Ok(());
    }

    let pb = spinner(format!("Looking up locations for {} species...", needs.len()));
    let place_map = places::aggregate(&needs, &client, &search.area, search.include_private);
    pb.finish_with_message(format!("{} locations found", place_map.len()));

    let report = Report::assemble(
        summary,
        &place_map,
        &model,
        &search.region,
        search.include_private,
    );

    println!();
    if report.is_empty() {
        println!(
            "{} {} needed species, but no locations were reported for them",
            "Found:".yellow().bold(),
            needs.len()
        );
    } else {
        println!(
            "{} {} needed species across {} locations",
            "Found:".green().bold(),
            needs.len(),
            place_map.len()
        );
        for place in report.public_places.iter().take(3) {
            println!(
                "  {} {} ({} species)",
                "→".cyan(),
                place.name,
                place.species.len()
            );
        }
    }

    report::write_reports(&report, &args.output, &args.map_output)?;
    if report.public_places.is_empty() {
        println!("Report written to {}", args.output.display().to_string().bold());
    } else {
        println!(
            "Report written to {}, map export to {}",
            args.output.display().to_string().bold(),
            args.map_output.display().to_string().bold()
        );
    }
    Ok(())
}
