mod competitors;

use crate::spatial::{SpatialError, ZoneLayer};
use crate::workflows::parcels::ImportError;
use crate::workflows::screening::domain::CompetitorProject;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to load {layer} layer from {path}: {source}")]
    Layer {
        layer: &'static str,
        path: PathBuf,
        #[source]
        source: SpatialError,
    },
    #[error("failed to load competitor projects from {path}: {source}")]
    Competitors {
        path: PathBuf,
        #[source]
        source: ImportError,
    },
}

/// Locations of the reference datasets. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePaths {
    pub qct: Option<PathBuf>,
    pub dda: Option<PathBuf>,
    pub flood: Option<PathBuf>,
    pub competitors: Option<PathBuf>,
}

/// Read-only layers and project lists shared by every screening run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub qct: Option<ZoneLayer>,
    pub dda: Option<ZoneLayer>,
    pub flood: Option<ZoneLayer>,
    pub competitors: Vec<CompetitorProject>,
}

impl ReferenceData {
    pub fn load(paths: &ReferencePaths) -> Result<Self, ReferenceDataError> {
        let data = Self {
            qct: load_layer("qct", paths.qct.as_deref())?,
            dda: load_layer("dda", paths.dda.as_deref())?,
            flood: load_layer("flood", paths.flood.as_deref())?,
            competitors: match paths.competitors.as_deref() {
                Some(path) => load_competitors(path)?,
                None => Vec::new(),
            },
        };

        info!(
            qct = data.qct.as_ref().map(ZoneLayer::len).unwrap_or(0),
            dda = data.dda.as_ref().map(ZoneLayer::len).unwrap_or(0),
            flood = data.flood.as_ref().map(ZoneLayer::len).unwrap_or(0),
            competitors = data.competitors.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn competitors_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<CompetitorProject>, ImportError> {
        competitors::parse_competitors(reader)
    }

    pub fn layer_names(&self) -> Vec<&str> {
        [&self.qct, &self.dda, &self.flood]
            .into_iter()
            .flatten()
            .map(ZoneLayer::name)
            .collect()
    }
}

fn load_layer(
    layer: &'static str,
    path: Option<&Path>,
) -> Result<Option<ZoneLayer>, ReferenceDataError> {
    let Some(path) = path else {
        return Ok(None);
    };
    ZoneLayer::from_geojson_path(layer, path)
        .map(Some)
        .map_err(|source| ReferenceDataError::Layer {
            layer,
            path: path.to_path_buf(),
            source,
        })
}

fn load_competitors(path: &Path) -> Result<Vec<CompetitorProject>, ReferenceDataError> {
    let wrap = |source: ImportError| ReferenceDataError::Competitors {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(|err| wrap(ImportError::from(err)))?;
    competitors::parse_competitors(file).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_paths_load_empty_reference() {
        let data = ReferenceData::load(&ReferencePaths::default()).expect("nothing to load");
        assert!(data.qct.is_none());
        assert!(data.competitors.is_empty());
        assert!(data.layer_names().is_empty());
    }

    #[test]
    fn missing_files_name_the_layer() {
        let paths = ReferencePaths {
            flood: Some(PathBuf::from("/nonexistent/nfhl.geojson")),
            ..ReferencePaths::default()
        };
        let err = ReferenceData::load(&paths).expect_err("missing file");
        assert!(matches!(err, ReferenceDataError::Layer { layer: "flood", .. }));
        assert!(err.to_string().contains("nfhl.geojson"));
    }
}
