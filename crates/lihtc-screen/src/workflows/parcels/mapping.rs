use super::normalizer::normalize_header;
use csv::StringRecord;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical columns recognised in property and competitor spreadsheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Id,
    Name,
    Address,
    City,
    County,
    State,
    Zip,
    Latitude,
    Longitude,
    Acres,
    AskingPrice,
    MarketRent,
    AmiRentLimit,
    Population,
    AwardYear,
    PlacedInService,
    Units,
}

static COLUMN_ALIASES: OnceLock<HashMap<String, Column>> = OnceLock::new();

pub(crate) fn column_for(header: &str) -> Option<Column> {
    column_aliases().get(&normalize_header(header)).copied()
}

fn column_aliases() -> &'static HashMap<String, Column> {
    COLUMN_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, Column)] = &[
            ("id", Column::Id),
            ("property id", Column::Id),
            ("parcel id", Column::Id),
            ("site id", Column::Id),
            ("apn", Column::Id),
            ("listing id", Column::Id),
            ("name", Column::Name),
            ("property name", Column::Name),
            ("project name", Column::Name),
            ("development name", Column::Name),
            ("development", Column::Name),
            ("address", Column::Address),
            ("street", Column::Address),
            ("street address", Column::Address),
            ("property address", Column::Address),
            ("project address", Column::Address),
            ("city", Column::City),
            ("project city", Column::City),
            ("county", Column::County),
            ("county name", Column::County),
            ("project county", Column::County),
            ("state", Column::State),
            ("st", Column::State),
            ("state code", Column::State),
            ("project state", Column::State),
            ("zip", Column::Zip),
            ("zip code", Column::Zip),
            ("zipcode", Column::Zip),
            ("postal code", Column::Zip),
            ("project zip code", Column::Zip),
            ("latitude", Column::Latitude),
            ("lat", Column::Latitude),
            ("y", Column::Latitude),
            ("longitude", Column::Longitude),
            ("lon", Column::Longitude),
            ("long", Column::Longitude),
            ("lng", Column::Longitude),
            ("x", Column::Longitude),
            ("acres", Column::Acres),
            ("acreage", Column::Acres),
            ("lot size acres", Column::Acres),
            ("lot acres", Column::Acres),
            ("asking price", Column::AskingPrice),
            ("price", Column::AskingPrice),
            ("list price", Column::AskingPrice),
            ("sale price", Column::AskingPrice),
            ("market rent", Column::MarketRent),
            ("market rent 2br", Column::MarketRent),
            ("2br market rent", Column::MarketRent),
            ("ami rent limit", Column::AmiRentLimit),
            ("60% ami rent", Column::AmiRentLimit),
            ("60% ami rent limit", Column::AmiRentLimit),
            ("rent limit 2br", Column::AmiRentLimit),
            ("target population", Column::Population),
            ("population", Column::Population),
            ("population served", Column::Population),
            ("award year", Column::AwardYear),
            ("year awarded", Column::AwardYear),
            ("allocation year", Column::AwardYear),
            ("placed in service", Column::PlacedInService),
            ("placed in service date", Column::PlacedInService),
            ("pis date", Column::PlacedInService),
            ("units", Column::Units),
            ("total units", Column::Units),
            ("unit count", Column::Units),
            ("li units", Column::Units),
        ];

        ALIASES
            .iter()
            .map(|(alias, column)| (alias.to_string(), *column))
            .collect()
    })
}

/// Positions of recognised columns in a header row. First occurrence wins.
#[derive(Debug, Default)]
pub(crate) struct HeaderIndex {
    positions: HashMap<Column, usize>,
}

impl HeaderIndex {
    pub(crate) fn from_headers(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            if let Some(column) = column_for(header) {
                positions.entry(column).or_insert(position);
            }
        }
        Self { positions }
    }

    pub(crate) fn contains(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Trimmed, non-empty cell for `column`.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        let position = *self.positions.get(&column)?;
        record
            .get(position)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
