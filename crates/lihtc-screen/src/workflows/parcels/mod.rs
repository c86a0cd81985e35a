mod geocode;
pub(crate) mod mapping;
pub(crate) mod normalizer;
pub(crate) mod parser;

pub use geocode::{
    fill_missing_coordinates, write_batch_request, CensusBatchGeocoder, GeocodeError,
    GeocodeQuery, GeocodeStats, Geocoder, NoopGeocoder,
};

use crate::workflows::screening::domain::PropertyRecord;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumns(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read spreadsheet: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::MissingColumns(expected) => {
                write!(f, "spreadsheet is missing required columns: {}", expected)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::MissingColumns(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads candidate parcels from a broker or CoStar style CSV export.
pub struct PropertyImporter;

impl PropertyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PropertyRecord>, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let properties = Self::from_reader(file)?;
        info!(path = %path.display(), properties = properties.len(), "imported property sheet");
        Ok(properties)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, ImportError> {
        parser::parse_properties(reader)
    }
}
