use anyhow::Result;
use indexmap::IndexMap;
use std::path::Path;
use tracing::error;

pub mod text;

use crate::core::frequency::RegionalFrequencyModel;
use crate::core::places::{self, PlaceRecord};

/// What the run was asked to do, echoed at the top of the report
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub list_description: String,
    pub days_back: u32,
    pub dist_km: u32,
    pub lat: f64,
    pub lng: f64,
}

/// One location ready for rendering: species already annotated with their
/// rarity labels, in sorted order.
#[derive(Debug, Clone)]
pub struct PlaceSummary {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub species: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct Report {
    pub summary: RunSummary,
    pub public_places: Vec<PlaceSummary>,
    pub private_places: Vec<PlaceSummary>,
    pub include_private: bool,
}

impl Report {
    /// Rank the aggregated places and attach rarity labels. Public and
    /// private sections each keep the ranked order.
    pub fn assemble(
        summary: RunSummary,
        places: &IndexMap<String, PlaceRecord>,
        model: &RegionalFrequencyModel,
        region: &str,
        include_private: bool,
    ) -> Self {
        let mut public_places = Vec::new();
        let mut private_places = Vec::new();

        for name in places::rank(places) {
            let place = &places[name];
            let labels = places::annotate(place, model, region);
            let entry = PlaceSummary {
                name: place.name.clone(),
                lat: place.lat,
                lng: place.lng,
                species: labels.into_iter().collect(),
            };
            if place.private {
                private_places.push(entry);
            } else {
                public_places.push(entry);
            }
        }

        Self {
            summary,
            public_places,
            private_places,
            include_private,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.public_places.is_empty() && self.private_places.is_empty()
    }
}

/// Mapping-tool CSV: one row per public place with a pipe-delimited
/// species list.
pub fn generate_map_csv(report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(["Place", "Latitude", "Longitude", "Count", "Species"])?;

        for place in &report.public_places {
            let species = place
                .species
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(" | ");
            writer.write_record([
                place.name.as_str(),
                &place.lat.to_string(),
                &place.lng.to_string(),
                &place.species.len().to_string(),
                &species,
            ])?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(buf)?)
}

/// Write both output targets. A failure on one is reported and does not
/// stop the other.
pub fn write_reports(report: &Report, text_path: &Path, csv_path: &Path) -> Result<()> {
    match text::generate_text_report(report) {
        Ok(contents) => {
            if let Err(e) = std::fs::write(text_path, contents) {
                error!("Could not write {}: {}", text_path.display(), e);
                eprintln!("Could not write {}: {}", text_path.display(), e);
            }
        }
        Err(e) => {
            error!("Could not render text report: {}", e);
            eprintln!("Could not render text report: {}", e);
        }
    }

    if !report.public_places.is_empty() {
        match generate_map_csv(report) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(csv_path, contents) {
                    error!("Could not write {}: {}", csv_path.display(), e);
                    eprintln!("Could not write {}: {}", csv_path.display(), e);
                }
            }
            Err(e) => {
                error!("Could not render map export: {}", e);
                eprintln!("Could not render map export: {}", e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            list_description: "state life list for the state US-LA".to_string(),
            days_back: 7,
            dist_km: 25,
            lat: 30.47,
            lng: -90.03,
        }
    }

    fn place(name: &str, species: &[&str]) -> PlaceSummary {
        PlaceSummary {
            name: name.to_string(),
            lat: 30.5,
            lng: -90.1,
            species: species
                .iter()
                .map(|s| (s.to_string(), "common".to_string()))
                .collect(),
        }
    }

    #[test]
    fn map_csv_pipe_delimits_species() {
        let report = Report {
            summary: summary(),
            public_places: vec![place("Pond A, north end", &["Anhinga", "Limpkin"])],
            private_places: vec![],
            include_private: false,
        };

        let csv = generate_map_csv(&report).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "Place,Latitude,Longitude,Count,Species");
        // The place name contains a comma, so the writer must quote it
        assert_eq!(
            lines.next().unwrap(),
            "\"Pond A, north end\",30.5,-90.1,2,Anhinga | Limpkin"
        );
    }

    #[test]
    fn is_empty_requires_both_sections_empty() {
        let mut report = Report {
            summary: summary(),
            public_places: vec![],
            private_places: vec![],
            include_private: true,
        };
        assert!(report.is_empty());

        report.private_places.push(place("Backyard", &["Limpkin"]));
        assert!(!report.is_empty());
    }

    #[test]
    fn map_csv_skips_private_places() {
        let report = Report {
            summary: summary(),
            public_places: vec![place("Pond A", &["Anhinga"])],
            private_places: vec![place("Backyard", &["Limpkin"])],
            include_private: true,
        };

        let csv = generate_map_csv(&report).unwrap();
        assert!(csv.contains("Pond A"));
        assert!(!csv.contains("Backyard"));
    }
}
