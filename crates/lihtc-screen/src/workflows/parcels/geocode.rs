use super::normalizer::normalize_address;
use crate::spatial::Coordinate;
use crate::workflows::screening::domain::PropertyRecord;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("failed to read geocoder results: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid geocoder CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: malformed coordinate '{value}' in geocoder output")]
    MalformedCoordinate { row: usize, value: String },
}

/// Lookup request for a property lacking coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GeocodeQuery<'a> {
    pub id: &'a str,
    pub address: &'a str,
}

/// Resolves an address to a coordinate. `Ok(None)` means no match.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &GeocodeQuery<'_>) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Geocoder that never matches; used when no results file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGeocoder;

impl Geocoder for NoopGeocoder {
    fn geocode(&self, _query: &GeocodeQuery<'_>) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(None)
    }
}

/// Offline geocoder backed by a U.S. Census Bureau batch geocoder result
/// file. Rows look like
/// `"id","input address","Match","Exact","matched address","-97.74,30.27","tiger id","L"`.
#[derive(Debug, Clone, Default)]
pub struct CensusBatchGeocoder {
    by_id: HashMap<String, Coordinate>,
    by_address: HashMap<String, Coordinate>,
}

impl CensusBatchGeocoder {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GeocodeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GeocodeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut geocoder = Self::default();
        for (offset, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.get(2) != Some("Match") {
                continue;
            }
            let Some(raw) = record.get(5) else {
                continue;
            };
            let coordinate =
                parse_lon_lat(raw).ok_or_else(|| GeocodeError::MalformedCoordinate {
                    row: offset + 1,
                    value: raw.to_string(),
                })?;

            if let Some(id) = record.get(0).filter(|id| !id.is_empty()) {
                geocoder.by_id.insert(id.to_string(), coordinate);
            }
            if let Some(address) = record.get(1).filter(|address| !address.is_empty()) {
                geocoder
                    .by_address
                    .insert(normalize_address(address), coordinate);
            }
        }

        debug!(matches = geocoder.by_id.len(), "loaded census geocoder results");
        Ok(geocoder)
    }

    pub fn len(&self) -> usize {
        self.by_id.len().max(self.by_address.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Geocoder for CensusBatchGeocoder {
    fn geocode(&self, query: &GeocodeQuery<'_>) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self
            .by_id
            .get(query.id)
            .or_else(|| self.by_address.get(&normalize_address(query.address)))
            .copied())
    }
}

fn parse_lon_lat(raw: &str) -> Option<Coordinate> {
    let (lon, lat) = raw.split_once(',')?;
    let lon = lon.trim().parse::<f64>().ok()?;
    let lat = lat.trim().parse::<f64>().ok()?;
    Coordinate::new(lat, lon).ok()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeStats {
    pub attempted: usize,
    pub matched: usize,
    pub failed: usize,
}

/// Fills coordinates for rows that lack them. Failures become row warnings.
pub fn fill_missing_coordinates(
    properties: &mut [PropertyRecord],
    geocoder: &dyn Geocoder,
) -> GeocodeStats {
    let mut stats = GeocodeStats::default();

    for property in properties
        .iter_mut()
        .filter(|property| property.screenable_coordinate().is_none())
    {
        let Some(address) = property.one_line_address() else {
            property
                .warnings
                .push("no coordinates and no address to geocode".to_string());
            continue;
        };

        stats.attempted += 1;
        let query = GeocodeQuery {
            id: &property.id,
            address: &address,
        };
        match geocoder.geocode(&query) {
            Ok(Some(coordinate)) => {
                stats.matched += 1;
                property.coordinate = Some(coordinate);
                property
                    .warnings
                    .push("coordinates filled by geocoder".to_string());
            }
            Ok(None) => {
                stats.failed += 1;
                property
                    .warnings
                    .push(format!("geocoder found no match for '{address}'"));
            }
            Err(err) => {
                stats.failed += 1;
                warn!(property = %property.id, error = %err, "geocoding failed");
                property.warnings.push(format!("geocoding failed: {err}"));
            }
        }
    }

    stats
}

/// Writes the Census batch geocoder upload format (`id,street,city,state,zip`,
/// no header) for rows that still need coordinates. Returns the row count.
pub fn write_batch_request<W: Write>(
    properties: &[PropertyRecord],
    writer: W,
) -> Result<usize, GeocodeError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let mut written = 0;
    for property in properties
        .iter()
        .filter(|property| property.screenable_coordinate().is_none())
    {
        let Some(street) = property.address.as_deref() else {
            continue;
        };
        csv_writer.write_record([
            property.id.as_str(),
            street,
            property.city.as_deref().unwrap_or_default(),
            property.state.as_ref().map(|state| state.code()).unwrap_or_default(),
            property.zip.as_deref().unwrap_or_default(),
        ])?;
        written += 1;
    }
    csv_writer.flush()?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::UsState;

    const RESULTS: &str = "\"1\",\"100 Congress Ave, Austin, TX, 78701\",\"Match\",\"Exact\",\"100 CONGRESS AVE, AUSTIN, TX, 78701\",\"-97.7431,30.2672\",\"123\",\"L\"\n\
        \"2\",\"9 Nowhere Rd, Austin, TX, 78701\",\"No_Match\"\n\
        \"3\",\"5 Tie Ln, Austin, TX, 78701\",\"Tie\"\n";

    fn listing(id: &str, address: &str) -> PropertyRecord {
        let mut property = PropertyRecord::new(id);
        property.address = Some(address.to_string());
        property.city = Some("Austin".to_string());
        property.state = Some(UsState::Texas);
        property.zip = Some("78701".to_string());
        property
    }

    #[test]
    fn census_results_match_by_id_then_address() {
        let geocoder = CensusBatchGeocoder::from_reader(RESULTS.as_bytes()).expect("parse");
        assert_eq!(geocoder.len(), 1);

        let by_id = geocoder
            .geocode(&GeocodeQuery {
                id: "1",
                address: "unrelated",
            })
            .expect("lookup");
        assert_eq!(
            by_id,
            Some(Coordinate {
                lat: 30.2672,
                lon: -97.7431
            })
        );

        let by_address = geocoder
            .geocode(&GeocodeQuery {
                id: "other",
                address: "100 Congress Ave., Austin, TX 78701",
            })
            .expect("lookup");
        assert!(by_address.is_some());
    }

    #[test]
    fn malformed_match_coordinates_are_errors() {
        let bad = "\"1\",\"x\",\"Match\",\"Exact\",\"X\",\"not-a-point\",\"1\",\"L\"\n";
        let err = CensusBatchGeocoder::from_reader(bad.as_bytes()).expect_err("malformed");
        assert!(matches!(err, GeocodeError::MalformedCoordinate { row: 1, .. }));
    }

    #[test]
    fn fill_records_matches_and_misses_as_warnings() {
        let geocoder = CensusBatchGeocoder::from_reader(RESULTS.as_bytes()).expect("parse");
        let mut already_placed = listing("0", "1 Placed St");
        already_placed.coordinate = Some(Coordinate {
            lat: 30.0,
            lon: -97.0,
        });
        let mut properties = vec![
            listing("1", "100 Congress Ave"),
            listing("2", "9 Nowhere Rd"),
            PropertyRecord::new("no-address"),
            already_placed,
        ];

        let stats = fill_missing_coordinates(&mut properties, &geocoder);
        assert_eq!(
            stats,
            GeocodeStats {
                attempted: 2,
                matched: 1,
                failed: 1
            }
        );
        assert!(properties[0].coordinate.is_some());
        assert!(properties[1].warnings[0].contains("no match"));
        assert!(properties[2].warnings[0].contains("no address"));
        assert!(properties[3].warnings.is_empty());

        let mut untouched = vec![listing("9", "9 Nowhere Rd")];
        let stats = fill_missing_coordinates(&mut untouched, &NoopGeocoder);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn batch_request_lists_rows_needing_coordinates() {
        let mut placed = listing("placed", "1 Placed St");
        placed.coordinate = Some(Coordinate {
            lat: 30.0,
            lon: -97.0,
        });
        let properties = vec![listing("7", "7 Oak St"), placed, PropertyRecord::new("bare")];

        let mut buffer = Vec::new();
        let written = write_batch_request(&properties, &mut buffer).expect("write");
        assert_eq!(written, 1);
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "7,7 Oak St,Austin,TX,78701\n"
        );
    }
}
