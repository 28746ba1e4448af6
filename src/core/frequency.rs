/// Regional rarity model built from eBird weekly "barchart" exports
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::taxonomy::TaxonomyIndex;
use crate::TwitcherError;

/// Number of metadata lines before the first species row in a barchart file
const BARCHART_HEADER_LINES: usize = 16;

/// Rarity tier, best to worst. The ordering matters: breadth counts every
/// region where a species ranks strictly better than vagrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Common,
    Uncommon,
    Seasonal,
    Localized,
    Rare,
    Vagrant,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Common => "common",
            Tier::Uncommon => "uncommon",
            Tier::Seasonal => "seasonal",
            Tier::Localized => "localized",
            Tier::Rare => "rare",
            Tier::Vagrant => "vagrant",
        };
        f.write_str(name)
    }
}

// Frequency gates, first match wins: a species earns a tier when its weekly
// frequency exceeds the threshold in more than the given number of weeks.
const TIER_GATES: [(Tier, f64, usize); 5] = [
    (Tier::Common, 0.10, 36),
    (Tier::Uncommon, 0.02, 36),
    (Tier::Seasonal, 0.02, 12),
    (Tier::Localized, 0.005, 24),
    (Tier::Rare, 0.0001, 16),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrequencyRecord {
    pub tier: Tier,
    /// Count of regions where this species is at least rare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadth: Option<usize>,
}

/// Per-region rarity table, cached as JSON between runs. BTreeMaps keep the
/// cache file stable for diffing.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalFrequencyModel {
    regions: BTreeMap<String, BTreeMap<String, FrequencyRecord>>,
}

/// Classify one region's weekly frequencies. Total: every species gets
/// exactly one tier, vagrant when no gate passes.
pub fn summarize_region(weekly: &HashMap<String, Vec<f64>>) -> BTreeMap<String, Tier> {
    weekly
        .iter()
        .map(|(species, frequencies)| {
            let tier = TIER_GATES
                .iter()
                .find(|(_, threshold, min_weeks)| {
                    let weeks = frequencies.iter().filter(|f| **f > *threshold).count();
                    weeks > *min_weeks
                })
                .map(|(tier, _, _)| *tier)
                .unwrap_or(Tier::Vagrant);
            (species.clone(), tier)
        })
        .collect()
}

/// Barchart file name for a region, as eBird exports them
pub fn region_file_name(data_dir: &Path, region: &str) -> PathBuf {
    data_dir.join(format!("ebird_{}__2000_2020_1_12_barchart.txt", region))
}

/// Parse one region's tab-separated barchart export into species -> weekly
/// frequencies, keeping countable taxa only.
fn load_region_weekly(
    path: &Path,
    taxonomy: &TaxonomyIndex,
) -> crate::Result<HashMap<String, Vec<f64>>> {
    use std::io::BufRead;

    debug!("Reading barchart {}", path.display());
    let file = std::fs::File::open(path)?;

    let mut weekly = HashMap::new();
    for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        // The export opens with metadata lines, and blank rows separate
        // sections (the last line is usually blank too)
        if i < BARCHART_HEADER_LINES || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            continue;
        }
        let species = fields[0];
        match taxonomy.get(species) {
            Some(record) if record.category.is_countable() => {}
            _ => continue,
        }

        // The export carries one junk column after the 48 weeks
        let frequencies = fields[1..fields.len() - 1]
            .iter()
            .map(|cell| {
                cell.parse::<f64>().map_err(|e| {
                    TwitcherError::Parse(format!(
                        "{} line {}: bad frequency {:?}: {}",
                        path.display(),
                        i + 1,
                        cell,
                        e
                    ))
                })
            })
            .collect::<crate::Result<Vec<f64>>>()?;
        weekly.insert(species.to_string(), frequencies);
    }
    Ok(weekly)
}

impl RegionalFrequencyModel {
    /// Build the model from the raw barchart files for every region, then
    /// annotate breadth.
    pub fn rebuild(
        data_dir: &Path,
        regions: &[String],
        taxonomy: &TaxonomyIndex,
    ) -> crate::Result<Self> {
        info!("Building frequency model for {} regions", regions.len());
        let mut model = Self::default();
        for region in regions {
            let weekly = load_region_weekly(&region_file_name(data_dir, region), taxonomy)?;
            let summary = summarize_region(&weekly)
                .into_iter()
                .map(|(species, tier)| (species, FrequencyRecord { tier, breadth: None }))
                .collect();
            model.regions.insert(region.clone(), summary);
        }
        model.annotate_breadth();
        Ok(model)
    }

    /// For each species, count the regions where it is strictly better than
    /// vagrant and stamp that count on every region entry. Reads only tiers
    /// and writes only breadth, so the result is independent of region order
    /// and idempotent.
    pub fn annotate_breadth(&mut self) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for species_tiers in self.regions.values() {
            for (species, record) in species_tiers {
                if record.tier < Tier::Vagrant {
                    *counts.entry(species.clone()).or_default() += 1;
                }
            }
        }
        for species_tiers in self.regions.values_mut() {
            for (species, record) in species_tiers.iter_mut() {
                record.breadth = Some(counts.get(species).copied().unwrap_or(0));
            }
        }
    }

    pub fn tier_for(&self, region: &str, species: &str) -> Option<&FrequencyRecord> {
        self.regions.get(region).and_then(|tiers| tiers.get(species))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn species_count(&self, region: &str) -> Option<usize> {
        self.regions.get(region).map(|tiers| tiers.len())
    }

    /// Shape check on a loaded cache: non-empty, every top-level key is a
    /// configured region, every region has species, every species is in the
    /// taxonomy. Tier strings were already vetted by serde.
    pub fn validate(&self, regions: &[String], taxonomy: &TaxonomyIndex) -> bool {
        if self.regions.is_empty() {
            debug!("Cache invalid: empty");
            return false;
        }
        for (region, species_tiers) in &self.regions {
            if !regions.iter().any(|r| r == region) {
                debug!("Cache invalid: {} is not a configured region", region);
                return false;
            }
            if species_tiers.is_empty() {
                debug!("Cache invalid: no species in {}", region);
                return false;
            }
            for species in species_tiers.keys() {
                if taxonomy.get(species).is_none() {
                    debug!("Cache invalid: {} not in taxonomy", species);
                    return false;
                }
            }
        }
        true
    }

    /// The cache is fresh when it is strictly newer than every source file.
    pub fn cache_is_fresh(cache_path: &Path, data_dir: &Path, regions: &[String]) -> bool {
        let cache_mtime = match std::fs::metadata(cache_path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => {
                info!("Frequency cache missing or unreadable");
                return false;
            }
        };
        for region in regions {
            let source = region_file_name(data_dir, region);
            match std::fs::metadata(&source).and_then(|m| m.modified()) {
                Ok(source_mtime) if cache_mtime > source_mtime => {}
                _ => {
                    info!("Source {} is newer than the cache", source.display());
                    return false;
                }
            }
        }
        true
    }

    /// Read and validate the cache without ever rebuilding or writing.
    /// `None` means unreadable, unparseable, or shape-invalid.
    pub fn load_cache(
        cache_path: &Path,
        regions: &[String],
        taxonomy: &TaxonomyIndex,
    ) -> Option<Self> {
        let contents = std::fs::read_to_string(cache_path).ok()?;
        let model: Self = match serde_json::from_str(&contents) {
            Ok(model) => model,
            Err(e) => {
                warn!("Frequency cache unparseable: {}", e);
                return None;
            }
        };
        model.validate(regions, taxonomy).then_some(model)
    }

    pub fn save_cache(&self, cache_path: &Path) -> crate::Result<()> {
        let contents = serde_json::to_string_pretty(&self.regions)
            .map_err(|e| TwitcherError::Other(format!("serializing frequency cache: {}", e)))?;
        std::fs::write(cache_path, contents)?;
        Ok(())
    }

    /// Use the cache when it is fresh and well-formed; otherwise rebuild
    /// from the barchart files and try to persist. A failed persist only
    /// costs us a rebuild next run.
    pub fn load_or_rebuild(
        cache_path: &Path,
        data_dir: &Path,
        regions: &[String],
        taxonomy: &TaxonomyIndex,
    ) -> crate::Result<Self> {
        if Self::cache_is_fresh(cache_path, data_dir, regions) {
            if let Some(model) = Self::load_cache(cache_path, regions, taxonomy) {
                info!("Loaded frequency model from cache");
                return Ok(model);
            }
        }

        let model = Self::rebuild(data_dir, regions, taxonomy)?;
        if let Err(e) = model.save_cache(cache_path) {
            warn!("Could not persist frequency cache: {}", e);
        }
        Ok(model)
    }
}
