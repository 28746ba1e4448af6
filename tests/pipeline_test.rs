use std::collections::HashMap;

use twitcher::core::frequency::{summarize_region, RegionalFrequencyModel};
use twitcher::core::history::ObservationHistory;
use twitcher::core::needs::{ListKind, ListQuery};
use twitcher::core::places;
use twitcher::core::taxonomy::{Category, TaxonRecord, TaxonomyIndex};
use twitcher::ebird::{ObservationSource, SearchArea, Sighting};
use twitcher::report::{generate_map_csv, text::generate_text_report, Report, RunSummary};
use twitcher::TwitcherError;

/// Canned per-species answers standing in for the remote service
struct StubSource {
    by_code: HashMap<String, Vec<Sighting>>,
}

impl StubSource {
    fn new(entries: Vec<(&str, Vec<Sighting>)>) -> Self {
        Self {
            by_code: entries
                .into_iter()
                .map(|(code, sightings)| (code.to_string(), sightings))
                .collect(),
        }
    }
}

impl ObservationSource for StubSource {
    fn recent_sightings(&self, _area: &SearchArea) -> twitcher::Result<Vec<Sighting>> {
        Ok(self.by_code.values().flatten().cloned().collect())
    }

    fn sightings_for_species(
        &self,
        code: &str,
        _area: &SearchArea,
    ) -> twitcher::Result<Vec<Sighting>> {
        self.by_code
            .get(code)
            .cloned()
            .ok_or_else(|| TwitcherError::Api(format!("no stub for {}", code)))
    }
}

fn taxonomy() -> TaxonomyIndex {
    let mut index = TaxonomyIndex::new();
    for (name, code, category) in [
        ("Blue Jay", "blujay", Category::Species),
        ("Northern Cardinal", "norcar", Category::Species),
        ("jay sp.", "jaysp1", Category::Spuh),
    ] {
        index.insert(TaxonRecord {
            common_name: name.to_string(),
            category,
            scientific_name: None,
            species_code: Some(code.to_string()),
            order: None,
            family: None,
        });
    }
    index
}

fn history() -> ObservationHistory {
    let mut h = ObservationHistory::new();
    h.insert("Blue Jay", "US-LA", "2019");
    h
}

fn sighting(name: &str, code: &str, loc: &str) -> Sighting {
    Sighting {
        com_name: name.to_string(),
        species_code: code.to_string(),
        loc_id: format!("L-{}", loc),
        loc_name: loc.to_string(),
        lat: 30.5,
        lng: -90.1,
        location_private: false,
    }
}

fn area() -> SearchArea {
    SearchArea {
        lat: 30.47,
        lng: -90.03,
        days_back: 7,
        dist_km: 25,
    }
}

#[test]
fn state_life_excludes_birds_already_seen_in_region() {
    let candidates = vec![
        sighting("Blue Jay", "blujay", "Pond A"),
        sighting("Northern Cardinal", "norcar", "Pond A"),
    ];
    let query = ListQuery::new(ListKind::StateLife, "US-LA", "2020");
    let needs = query.needed(candidates, &history());

    let names: Vec<&str> = needs.iter().map(|s| s.com_name.as_str()).collect();
    assert_eq!(names, ["Northern Cardinal"]);
}

#[test]
fn state_year_needs_birds_seen_only_in_earlier_years() {
    let candidates = vec![
        sighting("Blue Jay", "blujay", "Pond A"),
        sighting("Northern Cardinal", "norcar", "Pond A"),
    ];
    let query = ListQuery::new(ListKind::StateYear, "US-LA", "2020");
    let needs = query.needed(candidates, &history());

    let names: Vec<&str> = needs.iter().map(|s| s.com_name.as_str()).collect();
    assert_eq!(names, ["Blue Jay", "Northern Cardinal"]);
}

#[test]
fn forty_weeks_at_fifteen_percent_is_common() {
    let mut frequencies = vec![0.15; 40];
    frequencies.resize(48, 0.0);
    let mut weekly = HashMap::new();
    weekly.insert("Blue Jay".to_string(), frequencies);

    let summary = summarize_region(&weekly);
    assert_eq!(summary["Blue Jay"].to_string(), "common");
}

#[test]
fn overlapping_species_share_one_place_record() {
    let source = StubSource::new(vec![
        ("blujay", vec![sighting("Blue Jay", "blujay", "Pond A")]),
        ("norcar", vec![sighting("Northern Cardinal", "norcar", "Pond A")]),
    ]);
    let needed = vec![
        sighting("Blue Jay", "blujay", ""),
        sighting("Northern Cardinal", "norcar", ""),
    ];

    let place_map = places::aggregate(&needed, &source, &area(), false);
    assert_eq!(place_map.len(), 1);
    let pond = &place_map["Pond A"];
    assert_eq!(pond.species.len(), 2);
    assert!(pond.species.contains("Blue Jay"));
    assert!(pond.species.contains("Northern Cardinal"));
}

#[test]
fn full_pipeline_from_candidates_to_reports() {
    let tax = taxonomy();
    let source = StubSource::new(vec![
        ("norcar", vec![sighting("Northern Cardinal", "norcar", "Pond A")]),
        // The needed-list will never ask for the spuh; no stub required
    ]);

    // Live candidates include a spuh that must be filtered out
    let candidates = vec![
        sighting("Blue Jay", "blujay", "Pond A"),
        sighting("jay sp.", "jaysp1", "Pond A"),
        sighting("Northern Cardinal", "norcar", "Pond A"),
    ];
    let candidates = tax.retain_countable(candidates);
    assert_eq!(candidates.len(), 2);

    let query = ListQuery::new(ListKind::StateLife, "US-LA", "2020");
    let needs = query.needed(candidates, &history());
    let place_map = places::aggregate(&needs, &source, &area(), false);

    let model = RegionalFrequencyModel::default();
    let report = Report::assemble(
        RunSummary {
            list_description: "state life list for the state US-LA".to_string(),
            days_back: 7,
            dist_km: 25,
            lat: 30.47,
            lng: -90.03,
        },
        &place_map,
        &model,
        "US-LA",
        false,
    );

    let text = generate_text_report(&report).unwrap();
    assert!(text.contains("state life list for the state US-LA"));
    assert!(text.contains("Pond A (30.5, -90.1)"));
    // No frequency data loaded, so the label falls back to unranked
    assert!(text.contains("\tNorthern Cardinal (unranked)"));

    let csv = generate_map_csv(&report).unwrap();
    assert!(csv.contains("Pond A,30.5,-90.1,1,Northern Cardinal"));
}
