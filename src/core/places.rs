/// Group needed-species sightings by location and rank the results
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::core::frequency::RegionalFrequencyModel;
use crate::ebird::{ObservationSource, SearchArea, Sighting};

/// One location and the needed species reported there. Keyed by display
/// name; two physical sites sharing a name will merge (same as the data
/// source's own hotspot listings, and fine at this scope).
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub name: String,
    pub loc_id: String,
    pub lat: f64,
    pub lng: f64,
    pub private: bool,
    pub species: BTreeSet<String>,
}

impl PlaceRecord {
    fn from_sighting(sighting: &Sighting) -> Self {
        Self {
            name: sighting.loc_name.clone(),
            loc_id: sighting.loc_id.clone(),
            lat: sighting.lat,
            lng: sighting.lng,
            private: sighting.location_private,
            species: BTreeSet::new(),
        }
    }
}

/// Look up where each needed species has been reported and merge by
/// location name. Lookup failures and empty answers are logged and skipped;
/// the service's needed-list and per-species lookups routinely disagree.
pub fn aggregate(
    needed: &[Sighting],
    source: &dyn ObservationSource,
    area: &SearchArea,
    include_private: bool,
) -> IndexMap<String, PlaceRecord> {
    let mut places: IndexMap<String, PlaceRecord> = IndexMap::new();

    for bird in needed {
        let locations = match source.sightings_for_species(&bird.species_code, area) {
            Ok(locations) => locations,
            Err(e) => {
                warn!("Lookup for {} failed, skipping: {}", bird.com_name, e);
                continue;
            }
        };
        if locations.is_empty() {
            warn!(
                "Service says you need {} but returned no locations for it",
                bird.com_name
            );
            continue;
        }
        for location in &locations {
            if location.location_private && !include_private {
                debug!("Skipping private location {}", location.loc_name);
                continue;
            }
            places
                .entry(location.loc_name.clone())
                .or_insert_with(|| PlaceRecord::from_sighting(location))
                .species
                .insert(bird.com_name.clone());
        }
    }
    places
}

/// Location names, best first: descending needed-species count, ties in
/// insertion order (the sort is stable).
pub fn rank(places: &IndexMap<String, PlaceRecord>) -> Vec<&str> {
    let mut names: Vec<&PlaceRecord> = places.values().collect();
    names.sort_by(|a, b| b.species.len().cmp(&a.species.len()));
    names.into_iter().map(|p| p.name.as_str()).collect()
}

/// Display label for each needed species at a place: its regional tier,
/// plus how many regions it reaches when breadth is known. Species the
/// region's table has never tiered get "unranked".
pub fn annotate(
    place: &PlaceRecord,
    model: &RegionalFrequencyModel,
    region: &str,
) -> BTreeMap<String, String> {
    place
        .species
        .iter()
        .map(|species| {
            let label = match model.tier_for(region, species) {
                Some(record) => match record.breadth {
                    Some(breadth) => format!("{}, in {} regions", record.tier, breadth),
                    None => record.tier.to_string(),
                },
                None => "unranked".to_string(),
            };
            (species.clone(), label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebird::tests::StubSource;

    fn sighting(name: &str, code: &str) -> Sighting {
        Sighting {
            com_name: name.to_string(),
            species_code: code.to_string(),
            loc_id: String::new(),
            loc_name: String::new(),
            lat: 0.0,
            lng: 0.0,
            location_private: false,
        }
    }

    fn at(name: &str, code: &str, loc: &str, private: bool) -> Sighting {
        Sighting {
            com_name: name.to_string(),
            species_code: code.to_string(),
            loc_id: format!("L-{}", loc),
            loc_name: loc.to_string(),
            lat: 30.0,
            lng: -90.0,
            location_private: private,
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
    fn overlapping_locations_merge() {
        let source = StubSource::new(vec![
            ("carwre", vec![at("Carolina Wren", "carwre", "Pond A", false)]),
            ("norcar", vec![at("Northern Cardinal", "norcar", "Pond A", false)]),
        ]);
        let needed = vec![
            sighting("Carolina Wren", "carwre"),
            sighting("Northern Cardinal", "norcar"),
        ];

        let places = aggregate(&needed, &source, &area(), false);
        assert_eq!(places.len(), 1);
        let pond = &places["Pond A"];
        assert!(pond.species.contains("Carolina Wren"));
        assert!(pond.species.contains("Northern Cardinal"));
    }

    #[test]
    fn aggregate_is_commutative_in_species_order() {
        let source = StubSource::new(vec![
            ("carwre", vec![at("Carolina Wren", "carwre", "Pond A", false)]),
            (
                "norcar",
                vec![
                    at("Northern Cardinal", "norcar", "Pond A", false),
                    at("Northern Cardinal", "norcar", "Levee Trail", false),
                ],
            ),
        ]);
        let mut needed = vec![
            sighting("Carolina Wren", "carwre"),
            sighting("Northern Cardinal", "norcar"),
        ];

        let forward = aggregate(&needed, &source, &area(), false);
        needed.reverse();
        let backward = aggregate(&needed, &source, &area(), false);

        assert_eq!(forward.len(), backward.len());
        for (name, record) in &forward {
            assert_eq!(record, &backward[name]);
        }
    }

    #[test]
    fn private_places_skipped_unless_requested() {
        let source = StubSource::new(vec![(
            "carwre",
            vec![at("Carolina Wren", "carwre", "Backyard", true)],
        )]);
        let needed = vec![sighting("Carolina Wren", "carwre")];

        assert!(aggregate(&needed, &source, &area(), false).is_empty());
        let with_private = aggregate(&needed, &source, &area(), true);
        assert!(with_private["Backyard"].private);
    }

    #[test]
    fn failed_and_empty_lookups_are_skipped() {
        let source = StubSource::new(vec![("carwre", vec![])]);
        let needed = vec![
            sighting("Carolina Wren", "carwre"),
            sighting("Northern Cardinal", "norcar"), // no stub entry: lookup error
        ];
        assert!(aggregate(&needed, &source, &area(), false).is_empty());
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let mut places = IndexMap::new();
        for (name, count) in [("Pond A", 1), ("Levee Trail", 2), ("Oak Alley", 1)] {
            let mut record = PlaceRecord::from_sighting(&at("x", "x", name, false));
            for i in 0..count {
                record.species.insert(format!("bird {}", i));
            }
            places.insert(name.to_string(), record);
        }

        assert_eq!(rank(&places), ["Levee Trail", "Pond A", "Oak Alley"]);
    }
}
