/// eBird taxonomy reference index keyed by common name
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::ebird::Sighting;
use crate::TwitcherError;

/// Taxonomic category from the eBird taxonomy CATEGORY column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Species,
    Issf,
    Domestic,
    Form,
    Hybrid,
    Intergrade,
    Slash,
    Spuh,
    /// Anything the taxonomy file carries that we don't recognize
    Other(String),
}

impl Category {
    pub fn from_str(s: &str) -> Self {
        match s {
            "species" => Self::Species,
            "issf" => Self::Issf,
            "domestic" => Self::Domestic,
            "form" => Self::Form,
            "hybrid" => Self::Hybrid,
            "intergrade" => Self::Intergrade,
            "slash" => Self::Slash,
            "spuh" => Self::Spuh,
            other => Self::Other(other.to_string()),
        }
    }

    /// A countable taxon is a full species or an identifiable subspecific
    /// form; hybrids, slashes, spuhs and the rest don't go on a list.
    pub fn is_countable(&self) -> bool {
        matches!(self, Self::Species | Self::Issf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub common_name: String,
    pub category: Category,
    pub scientific_name: Option<String>,
    pub species_code: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Default)]
pub struct TaxonomyIndex {
    taxa: HashMap<String, TaxonRecord>,
}

impl TaxonomyIndex {
    pub fn new() -> Self {
        Self {
            taxa: HashMap::new(),
        }
    }

    /// Load the eBird taxonomy CSV. Requires at least the COMMON_NAME and
    /// CATEGORY columns; reads the descriptive columns when present.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        info!("Loading taxonomy from {}", path.as_ref().display());

        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader
            .headers()
            .map_err(|e| TwitcherError::Taxonomy(format!("unreadable header row: {}", e)))?
            .clone();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let name_col = column("COMMON_NAME")
            .ok_or_else(|| TwitcherError::Taxonomy("missing COMMON_NAME column".to_string()))?;
        let category_col = column("CATEGORY")
            .ok_or_else(|| TwitcherError::Taxonomy("missing CATEGORY column".to_string()))?;
        let sci_col = column("SCIENTIFIC_NAME");
        let code_col = column("SPECIES_CODE");
        let order_col = column("ORDER");
        let family_col = column("FAMILY_COM_NAME");

        let mut index = Self::new();
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|e| TwitcherError::Parse(format!("taxonomy row: {}", e)))?;
            let common_name = row.get(name_col).unwrap_or("").to_string();
            if common_name.is_empty() {
                return Err(TwitcherError::Taxonomy(format!(
                    "row {} has an empty common name",
                    i + 2
                )));
            }
            let category = Category::from_str(row.get(category_col).unwrap_or(""));
            let field = |col: Option<usize>| {
                col.and_then(|c| row.get(c))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            // Last row wins on a duplicate common name
            index.insert(TaxonRecord {
                common_name,
                category,
                scientific_name: field(sci_col),
                species_code: field(code_col),
                order: field(order_col),
                family: field(family_col),
            });
        }

        info!("Loaded {} taxa", index.len());
        Ok(index)
    }

    pub fn insert(&mut self, record: TaxonRecord) {
        self.taxa.insert(record.common_name.clone(), record);
    }

    pub fn get(&self, common_name: &str) -> Option<&TaxonRecord> {
        self.taxa.get(common_name)
    }

    /// Whether the named taxon is countable. Errors when the name is not in
    /// the taxonomy at all, so callers can tell "unknown" from "known but
    /// not countable".
    pub fn is_countable(&self, common_name: &str) -> crate::Result<bool> {
        self.taxa
            .get(common_name)
            .map(|r| r.category.is_countable())
            .ok_or_else(|| TwitcherError::UnknownSpecies(common_name.to_string()))
    }

    /// Keep only the sightings of countable taxa. Names the taxonomy has
    /// never heard of are dropped, not errors; the remote service reports
    /// spuhs and slashes freely.
    pub fn retain_countable(&self, sightings: Vec<Sighting>) -> Vec<Sighting> {
        sightings
            .into_iter()
            .filter(|s| match self.taxa.get(&s.com_name) {
                Some(record) => record.category.is_countable(),
                None => {
                    debug!("Dropping {}: not in taxonomy", s.com_name);
                    false
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }
}
