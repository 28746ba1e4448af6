/// Personal sighting history: species -> region -> years seen there
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::taxonomy::TaxonomyIndex;
use crate::TwitcherError;

// Date is always the 12th column in both eBird export layouts
const DATE_COLUMN: usize = 11;

/// One of the two recognized eBird export layouts, detected from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Full "download my data" export: name in column 1, region in column 5
    LifeList,
    /// Year-list export: name in column 1, region in column 4
    YearList,
}

impl Layout {
    fn detect(header: &csv::StringRecord) -> Option<Self> {
        let cell = |i: usize| header.get(i).unwrap_or("");
        if cell(1) == "Common Name" && cell(5) == "State/Province" {
            Some(Self::LifeList)
        } else if cell(1) == "Species" && cell(4) == "S/P" {
            Some(Self::YearList)
        } else {
            None
        }
    }

    fn name_column(self) -> usize {
        1
    }

    fn region_column(self) -> usize {
        match self {
            Self::LifeList => 5,
            Self::YearList => 4,
        }
    }
}

/// Region codes we keep: US and Canada, minus Hawaii
fn in_scope(region: &str) -> bool {
    (region.starts_with("US") || region.starts_with("CA")) && region != "US-HI"
}

#[derive(Debug, Default)]
pub struct ObservationHistory {
    entries: HashMap<String, HashMap<String, HashSet<String>>>,
}

impl ObservationHistory {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Load the personal record file, keeping only countable taxa seen
    /// inside the supported scope.
    pub fn load<P: AsRef<Path>>(path: P, taxonomy: &TaxonomyIndex) -> crate::Result<Self> {
        info!("Loading observation history from {}", path.as_ref().display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_ref())?;

        let mut rows = reader.records();
        let header = match rows.next() {
            Some(row) => row?,
            None => return Err(TwitcherError::EmptyHistory),
        };
        let layout = Layout::detect(&header).ok_or_else(|| {
            TwitcherError::UnrecognizedFormat(format!(
                "header row does not match a known eBird export: {:?}",
                header
            ))
        })?;
        info!("Detected {:?} layout", layout);

        let mut history = Self::new();
        for (i, row) in rows.enumerate() {
            let row = row?;
            let line = i + 2;

            let (species, region, date) = match (
                row.get(layout.name_column()),
                row.get(layout.region_column()),
                row.get(DATE_COLUMN),
            ) {
                (Some(s), Some(r), Some(d)) => (s, r, d),
                _ => {
                    warn!("Line {}: too few columns, skipping", line);
                    continue;
                }
            };

            if !in_scope(region) {
                debug!("Line {}: {} is out of scope, skipping", line, region);
                continue;
            }
            let year = match date.get(0..4) {
                Some(y) => y,
                None => {
                    warn!("Line {}: unusable date {:?}, skipping", line, date);
                    continue;
                }
            };
            match taxonomy.get(species) {
                Some(record) if record.category.is_countable() => {
                    history.insert(species, region, year);
                }
                Some(_) => debug!("Line {}: {} is not countable, skipping", line, species),
                None => debug!("Line {}: {} not in taxonomy, skipping", line, species),
            }
        }

        if history.entries.is_empty() {
            return Err(TwitcherError::EmptyHistory);
        }
        info!("History holds {} species", history.species_count());
        Ok(history)
    }

    pub fn insert(&mut self, species: &str, region: &str, year: &str) {
        self.entries
            .entry(species.to_string())
            .or_default()
            .entry(region.to_string())
            .or_default()
            .insert(year.to_string());
    }

    pub fn seen_in(&self, species: &str, region: &str, year: &str) -> bool {
        self.entries
            .get(species)
            .and_then(|regions| regions.get(region))
            .is_some_and(|years| years.contains(year))
    }

    pub fn seen_ever(&self, species: &str) -> bool {
        self.entries.contains_key(species)
    }

    pub fn seen_in_region(&self, species: &str, region: &str) -> bool {
        self.entries
            .get(species)
            .is_some_and(|regions| regions.contains_key(region))
    }

    pub fn seen_in_year(&self, species: &str, year: &str) -> bool {
        self.entries
            .get(species)
            .is_some_and(|regions| regions.values().any(|years| years.contains(year)))
    }

    pub fn species_count(&self) -> usize {
        self.entries.len()
    }

    /// Distinct regions across all species
    pub fn region_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|regions| regions.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// All years appearing anywhere in the history, sorted
    pub fn years(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|regions| regions.values())
            .flatten()
            .cloned()
            .collect()
    }
}
