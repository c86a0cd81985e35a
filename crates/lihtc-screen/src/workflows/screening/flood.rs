use super::domain::FloodRisk;
use crate::spatial::{Coordinate, ZoneLayer};
use serde::{Deserialize, Serialize};

pub const FLOOD_ZONE_KEY: &str = "FLD_ZONE";
pub const ZONE_SUBTYPE_KEY: &str = "ZONE_SUBTY";

/// Flood hazard at a site, taken from the most severe overlapping NFHL polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodFinding {
    pub zone: Option<String>,
    pub subtype: Option<String>,
    pub risk: FloodRisk,
}

impl FloodFinding {
    pub fn unknown() -> Self {
        Self {
            zone: None,
            subtype: None,
            risk: FloodRisk::Unknown,
        }
    }

    pub fn zone_label(&self) -> Option<String> {
        match (&self.zone, &self.subtype) {
            (Some(zone), Some(subtype)) => Some(format!("{zone} ({subtype})")),
            (Some(zone), None) => Some(zone.clone()),
            _ => None,
        }
    }
}

/// Maps NFHL `FLD_ZONE`/`ZONE_SUBTY` values onto a risk class. Zones the
/// table does not know (`OPEN WATER`, `AREA NOT INCLUDED`) come back as
/// `Unknown` and score neutral.
pub fn classify_zone(zone: &str, subtype: Option<&str>) -> FloodRisk {
    let zone = zone.trim().to_ascii_uppercase();
    let subtype = subtype.map(|value| value.trim().to_ascii_uppercase());

    if subtype
        .as_deref()
        .is_some_and(|value| value.contains("FLOODWAY"))
    {
        return FloodRisk::Floodway;
    }

    if is_special_flood_hazard_area(&zone) {
        return FloodRisk::High;
    }

    match zone.as_str() {
        "B" => FloodRisk::Moderate,
        "X" | "X500" | "SHADED X" => {
            let shaded = zone != "X"
                || subtype.as_deref().is_some_and(|value| {
                    value.contains("0.2 PCT") || value.contains("500") || value.contains("LEVEE")
                });
            if shaded {
                FloodRisk::Moderate
            } else {
                FloodRisk::Minimal
            }
        }
        "C" => FloodRisk::Minimal,
        "D" => FloodRisk::Undetermined,
        _ => FloodRisk::Unknown,
    }
}

fn is_special_flood_hazard_area(zone: &str) -> bool {
    match zone {
        "A" | "AE" | "AH" | "AO" | "AR" | "A99" | "V" | "VE" => true,
        _ => {
            let numbered = |prefix: char| {
                zone.strip_prefix(prefix)
                    .and_then(|digits| digits.parse::<u8>().ok())
                    .is_some_and(|n| (1..=30).contains(&n))
            };
            numbered('A') || numbered('V')
        }
    }
}

pub(crate) fn assess(layer: Option<&ZoneLayer>, point: &Coordinate) -> FloodFinding {
    let Some(layer) = layer else {
        return FloodFinding::unknown();
    };

    layer
        .locate_all(*point)
        .filter_map(|feature| {
            let zone = feature.attribute(FLOOD_ZONE_KEY)?;
            let subtype = feature.attribute(ZONE_SUBTYPE_KEY);
            Some(FloodFinding {
                zone: Some(zone.trim().to_string()),
                subtype: subtype.map(|value| value.trim().to_string()),
                risk: classify_zone(zone, subtype),
            })
        })
        .max_by_key(|finding| finding.risk)
        .unwrap_or(FloodFinding {
            zone: None,
            subtype: None,
            risk: FloodRisk::Minimal,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn classifies_nfhl_zone_codes() {
        assert_eq!(classify_zone("AE", None), FloodRisk::High);
        assert_eq!(classify_zone("a12", None), FloodRisk::High);
        assert_eq!(classify_zone("VE", None), FloodRisk::High);
        assert_eq!(classify_zone("A31", None), FloodRisk::Unknown);
        assert_eq!(
            classify_zone("AE", Some("FLOODWAY")),
            FloodRisk::Floodway
        );
        assert_eq!(
            classify_zone("X", Some("0.2 PCT ANNUAL CHANCE FLOOD HAZARD")),
            FloodRisk::Moderate
        );
        assert_eq!(
            classify_zone("X", Some("AREA OF MINIMAL FLOOD HAZARD")),
            FloodRisk::Minimal
        );
        assert_eq!(classify_zone("B", None), FloodRisk::Moderate);
        assert_eq!(classify_zone("C", None), FloodRisk::Minimal);
        assert_eq!(classify_zone("D", None), FloodRisk::Undetermined);
    }

    #[test]
    fn unrecognized_zones_are_unknown_not_undetermined() {
        assert_eq!(classify_zone("OPEN WATER", None), FloodRisk::Unknown);
        assert_eq!(classify_zone("AREA NOT INCLUDED", None), FloodRisk::Unknown);
        assert_eq!(classify_zone("", None), FloodRisk::Unknown);
        assert_eq!(
            classify_zone("OPEN WATER", Some("FLOODWAY")),
            FloodRisk::Floodway
        );
    }

    fn flood_layer() -> ZoneLayer {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"FLD_ZONE": "X", "ZONE_SUBTY": "0.2 PCT ANNUAL CHANCE FLOOD HAZARD"},
             "geometry": {"type": "Polygon", "coordinates": [[[-97.8,30.2],[-97.6,30.2],[-97.6,30.4],[-97.8,30.4],[-97.8,30.2]]]}},
            {"type": "Feature", "properties": {"FLD_ZONE": "AE"},
             "geometry": {"type": "Polygon", "coordinates": [[[-97.75,30.25],[-97.7,30.25],[-97.7,30.3],[-97.75,30.3],[-97.75,30.25]]]}}
        ]}"#;
        ZoneLayer::from_geojson_reader("flood", Cursor::new(json)).expect("layer loads")
    }

    #[test]
    fn assess_picks_most_severe_overlapping_zone() {
        let layer = flood_layer();

        let in_ae = assess(Some(&layer), &Coordinate { lat: 30.27, lon: -97.72 });
        assert_eq!(in_ae.risk, FloodRisk::High);
        assert_eq!(in_ae.zone.as_deref(), Some("AE"));

        let shaded = assess(Some(&layer), &Coordinate { lat: 30.35, lon: -97.65 });
        assert_eq!(shaded.risk, FloodRisk::Moderate);
        assert_eq!(
            shaded.zone_label().as_deref(),
            Some("X (0.2 PCT ANNUAL CHANCE FLOOD HAZARD)")
        );

        let outside = assess(Some(&layer), &Coordinate { lat: 31.0, lon: -97.0 });
        assert_eq!(outside.risk, FloodRisk::Minimal);
        assert!(outside.zone.is_none());
    }

    #[test]
    fn assess_without_layer_is_unknown() {
        let finding = assess(None, &Coordinate { lat: 30.27, lon: -97.72 });
        assert_eq!(finding, FloodFinding::unknown());
    }
}
