use crate::report::Report;
use anyhow::Result;
use std::fmt::Write;

pub fn generate_text_report(report: &Report) -> Result<String> {
    let mut output = String::new();
    let summary = &report.summary;

    writeln!(
        &mut output,
        "You asked for birds needed for your {}",
        summary.list_description
    )?;
    writeln!(
        &mut output,
        "I looked {} days back, within {}km of GPS coordinates {}, {}.",
        summary.days_back, summary.dist_km, summary.lat, summary.lng
    )?;
    writeln!(&mut output)?;

    writeln!(&mut output, "Places you should go")?;
    writeln!(&mut output, "--------------------")?;
    if report.public_places.is_empty() {
        writeln!(&mut output, "None found")?;
    }
    for place in &report.public_places {
        writeln!(&mut output, "{} ({}, {})", place.name, place.lat, place.lng)?;
        for (species, label) in &place.species {
            writeln!(&mut output, "\t{} ({})", species, label)?;
        }
    }

    if report.include_private {
        writeln!(&mut output)?;
        writeln!(&mut output, "Private places we can't go")?;
        writeln!(&mut output, "--------------------------")?;
        if report.private_places.is_empty() {
            writeln!(&mut output, "None found")?;
        }
        for place in &report.private_places {
            writeln!(&mut output, "{} ({}, {})", place.name, place.lat, place.lng)?;
            for (species, label) in &place.species {
                writeln!(&mut output, "\t{} ({})", species, label)?;
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{PlaceSummary, RunSummary};

    fn report(include_private: bool) -> Report {
        Report {
            summary: RunSummary {
                list_description: "year list".to_string(),
                days_back: 7,
                dist_km: 25,
                lat: 30.47,
                lng: -90.03,
            },
            public_places: vec![PlaceSummary {
                name: "Pond A".to_string(),
                lat: 30.5,
                lng: -90.1,
                species: vec![("Anhinga".to_string(), "uncommon, in 9 regions".to_string())],
            }],
            private_places: vec![PlaceSummary {
                name: "Backyard".to_string(),
                lat: 30.6,
                lng: -90.2,
                species: vec![("Limpkin".to_string(), "rare, in 2 regions".to_string())],
            }],
            include_private,
        }
    }

    #[test]
    fn renders_public_section_with_labels() {
        let text = generate_text_report(&report(false)).unwrap();
        assert!(text.contains("You asked for birds needed for your year list"));
        assert!(text.contains("Pond A (30.5, -90.1)"));
        assert!(text.contains("\tAnhinga (uncommon, in 9 regions)"));
        assert!(!text.contains("Private places"));
    }

    #[test]
    fn private_section_only_when_requested() {
        let text = generate_text_report(&report(true)).unwrap();
        assert!(text.contains("Private places we can't go"));
        assert!(text.contains("\tLimpkin (rare, in 2 regions)"));
    }

    #[test]
    fn empty_sections_say_none_found() {
        let mut r = report(true);
        r.public_places.clear();
        r.private_places.clear();
        let text = generate_text_report(&r).unwrap();
        assert_eq!(text.matches("None found").count(), 2);
    }
}
