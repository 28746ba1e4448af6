/// Which list are we trying to fill, and which birds are still missing
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::history::ObservationHistory;
use crate::ebird::Sighting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    /// Birds never seen anywhere
    Life,
    /// Birds not seen anywhere this year
    Year,
    /// Birds never seen in the current region
    StateLife,
    /// Birds not seen in the current region this year
    StateYear,
}

impl ListKind {
    /// Human description used in the report header
    pub fn describe(&self, region: &str) -> String {
        match self {
            ListKind::Life => "life list".to_string(),
            ListKind::Year => "year list".to_string(),
            ListKind::StateLife => format!("state life list for the state {}", region),
            ListKind::StateYear => format!("state year list for the state {}", region),
        }
    }
}

/// A classification request: the list being filled, the region it applies
/// to, and the year that counts as "current".
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub kind: ListKind,
    pub region: String,
    pub year: String,
}

impl ListQuery {
    pub fn new(kind: ListKind, region: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            kind,
            region: region.into(),
            year: year.into(),
        }
    }

    /// Keep the candidates not yet satisfied under this query. A species
    /// absent from the history is always needed, whatever the list kind.
    /// Candidate order is preserved; an empty result just means there is
    /// nothing new around.
    pub fn needed(
        &self,
        candidates: Vec<Sighting>,
        history: &ObservationHistory,
    ) -> Vec<Sighting> {
        info!("Classifying {} candidates for {:?}", candidates.len(), self.kind);
        candidates
            .into_iter()
            .filter(|sighting| {
                let satisfied = match self.kind {
                    ListKind::Life => history.seen_ever(&sighting.com_name),
                    ListKind::Year => history.seen_in_year(&sighting.com_name, &self.year),
                    ListKind::StateLife => {
                        history.seen_in_region(&sighting.com_name, &self.region)
                    }
                    ListKind::StateYear => {
                        history.seen_in(&sighting.com_name, &self.region, &self.year)
                    }
                };
                if satisfied {
                    debug!("{}: already satisfied", sighting.com_name);
                }
                !satisfied
            })
            .collect()
    }
}
