use super::mapping::{Column, HeaderIndex};
use super::normalizer::{parse_number, NumericCell};
use super::ImportError;
use crate::spatial::Coordinate;
use crate::workflows::screening::domain::{PropertyRecord, TargetPopulation, UsState};
use csv::StringRecord;
use std::io::Read;

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

pub(crate) fn parse_properties<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, ImportError> {
    let mut csv_reader = csv_reader(reader);
    let index = HeaderIndex::from_headers(csv_reader.headers()?);

    let has_coordinates = index.contains(Column::Latitude) && index.contains(Column::Longitude);
    if !has_coordinates && !index.contains(Column::Address) {
        return Err(ImportError::MissingColumns(
            "latitude/longitude or address".to_string(),
        ));
    }

    let mut properties = Vec::new();
    for (offset, record) in csv_reader.records().enumerate() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        properties.push(parse_row(&index, &record, offset + 1));
    }

    Ok(properties)
}

fn parse_row(index: &HeaderIndex, record: &StringRecord, row_number: usize) -> PropertyRecord {
    let id = index
        .get(record, Column::Id)
        .or_else(|| index.get(record, Column::Name))
        .map(str::to_string)
        .unwrap_or_else(|| row_number.to_string());

    let mut property = PropertyRecord::new(id);
    let text = |column| index.get(record, column).map(str::to_string);
    property.address = text(Column::Address);
    property.city = text(Column::City);
    property.county = text(Column::County);
    property.zip = text(Column::Zip);
    property.state = index.get(record, Column::State).map(UsState::parse);

    let mut warnings = Vec::new();
    property.coordinate = read_coordinate(index, record, &mut warnings);
    property.acres = read_number(index, record, Column::Acres, "acres", &mut warnings);
    property.asking_price =
        read_number(index, record, Column::AskingPrice, "asking price", &mut warnings);
    property.market_rent =
        read_number(index, record, Column::MarketRent, "market rent", &mut warnings);
    property.ami_rent_limit =
        read_number(index, record, Column::AmiRentLimit, "AMI rent limit", &mut warnings);
    property.population = read_population(index, record, &mut warnings);
    property.warnings = warnings;

    property
}

pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

pub(crate) fn read_number(
    index: &HeaderIndex,
    record: &StringRecord,
    column: Column,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<f64> {
    let raw = index.get(record, column);
    match parse_number(raw) {
        NumericCell::Blank => None,
        NumericCell::Value(value) => Some(value),
        NumericCell::Invalid => {
            warnings.push(format!(
                "invalid {label} value '{}' ignored",
                raw.unwrap_or_default()
            ));
            None
        }
    }
}

/// Both halves must parse and form a usable coordinate; otherwise the pair is
/// dropped with a warning so the geocoder can fill it.
pub(crate) fn read_coordinate(
    index: &HeaderIndex,
    record: &StringRecord,
    warnings: &mut Vec<String>,
) -> Option<Coordinate> {
    let lat = read_number(index, record, Column::Latitude, "latitude", warnings);
    let lon = read_number(index, record, Column::Longitude, "longitude", warnings);
    match (lat, lon) {
        (Some(lat), Some(lon)) => match Coordinate::new(lat, lon) {
            Ok(coordinate) => Some(coordinate),
            Err(err) => {
                warnings.push(format!("{err}; coordinate ignored"));
                None
            }
        },
        (Some(_), None) | (None, Some(_)) => {
            warnings.push("only one of latitude/longitude present; coordinate ignored".to_string());
            None
        }
        (None, None) => None,
    }
}

pub(crate) fn read_population(
    index: &HeaderIndex,
    record: &StringRecord,
    warnings: &mut Vec<String>,
) -> TargetPopulation {
    match index.get(record, Column::Population) {
        None => TargetPopulation::General,
        Some(raw) => TargetPopulation::parse(raw).unwrap_or_else(|| {
            warnings.push(format!(
                "unrecognised target population '{raw}'; treated as general"
            ));
            TargetPopulation::General
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTINGS: &str = "\u{feff}Site ID,Street Address,City,ST,Zip Code,LAT,LNG,Acreage,Asking_Price,Market Rent,60% AMI Rent,Target Population,Broker\n\
        A-1,100 Congress Ave,Austin,TX,78701,30.2672,-97.7431,4.5,\"$1,800,000\",1450,1390,Senior,Jones\n\
        ,,,,,,,,,,,,\n\
        ,200 Main St,Fresno,California,93721,,,2,abc,,,,\n\
        B-3,1 Elm St,Santa Fe,NM,87501,0,0,3,500000,,,Families?,\n";

    #[test]
    fn parses_aliased_headers_and_skips_blank_rows() {
        let properties = parse_properties(LISTINGS.as_bytes()).expect("parse");
        assert_eq!(properties.len(), 3);

        let austin = &properties[0];
        assert_eq!(austin.id, "A-1");
        assert_eq!(austin.address.as_deref(), Some("100 Congress Ave"));
        assert_eq!(austin.state, Some(UsState::Texas));
        assert_eq!(
            austin.coordinate,
            Some(Coordinate {
                lat: 30.2672,
                lon: -97.7431
            })
        );
        assert_eq!(austin.asking_price, Some(1_800_000.0));
        assert_eq!(austin.population, TargetPopulation::Elderly);
        assert!(austin.warnings.is_empty());
    }

    #[test]
    fn bad_cells_become_warnings_not_errors() {
        let properties = parse_properties(LISTINGS.as_bytes()).expect("parse");

        let fresno = &properties[1];
        assert_eq!(fresno.id, "3");
        assert_eq!(fresno.state, Some(UsState::California));
        assert_eq!(fresno.coordinate, None);
        assert_eq!(fresno.asking_price, None);
        assert_eq!(fresno.acres, Some(2.0));
        assert_eq!(fresno.warnings.len(), 1);
        assert!(fresno.warnings[0].contains("asking price"));

        let santa_fe = &properties[2];
        assert_eq!(santa_fe.coordinate, None);
        assert_eq!(santa_fe.population, TargetPopulation::General);
        assert_eq!(santa_fe.warnings.len(), 2);
    }

    #[test]
    fn blank_ids_fall_back_to_name_then_row_number() {
        let sheet = "Property ID,Property Name,State,Latitude,Longitude\n\
            ,Riverside Tract,TX,29.75,-95.35\n\
            ,,TX,29.76,-95.36\n";
        let properties = parse_properties(sheet.as_bytes()).expect("parse");
        assert_eq!(properties[0].id, "Riverside Tract");
        assert_eq!(properties[1].id, "2");
    }

    #[test]
    fn rejects_sheets_without_location_columns() {
        let err = parse_properties("id,acres\n1,2\n".as_bytes()).expect_err("no location");
        assert!(matches!(err, ImportError::MissingColumns(_)));
    }
}
