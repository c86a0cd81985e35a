use super::coordinate::Coordinate;
use super::geojson::decode_feature_collection;
use super::polygon::MultiPolygon;
use super::SpatialError;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Attribute keys consulted (in order) for a feature's display label.
pub const DEFAULT_LABEL_KEYS: &[&str] = &["GEOID", "NAME", "DDA_NAME", "ZCTA5", "FLD_AR_ID"];

/// Polygon feature in a reference layer (a census tract, a DDA, a flood zone).
#[derive(Debug, Clone)]
pub struct ZoneFeature {
    pub label: String,
    pub attributes: BTreeMap<String, String>,
    pub geometry: MultiPolygon,
}

impl ZoneFeature {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Nearest feature to a point that lies outside every feature.
#[derive(Debug, Clone, Copy)]
pub struct NearestZone<'a> {
    pub feature: &'a ZoneFeature,
    pub distance_miles: f64,
}

/// Named, read-only polygon layer used for spatial joins.
#[derive(Debug, Clone)]
pub struct ZoneLayer {
    name: String,
    features: Vec<ZoneFeature>,
}

impl ZoneLayer {
    pub fn new(name: impl Into<String>, features: Vec<ZoneFeature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    pub fn from_geojson_path<P: AsRef<Path>>(
        name: impl Into<String>,
        path: P,
    ) -> Result<Self, SpatialError> {
        let file = std::fs::File::open(path)?;
        Self::from_geojson_reader(name, std::io::BufReader::new(file))
    }

    pub fn from_geojson_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
    ) -> Result<Self, SpatialError> {
        let name = name.into();
        let decoded = decode_feature_collection(reader)?;
        let features: Vec<ZoneFeature> = decoded
            .features
            .into_iter()
            .map(|raw| {
                let label = DEFAULT_LABEL_KEYS
                    .iter()
                    .find_map(|key| raw.attributes.get(*key))
                    .cloned()
                    .unwrap_or_else(|| format!("feature-{}", raw.index));
                ZoneFeature {
                    label,
                    attributes: raw.attributes,
                    geometry: raw.geometry,
                }
            })
            .collect();

        debug!(
            layer = %name,
            features = features.len(),
            skipped = decoded.skipped,
            "loaded zone layer"
        );

        Ok(Self::new(name, features))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[ZoneFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// First feature containing the point.
    pub fn locate(&self, point: &Coordinate) -> Option<&ZoneFeature> {
        self.locate_all(*point).next()
    }

    /// Every feature containing the point, in layer order.
    pub fn locate_all(&self, point: Coordinate) -> impl Iterator<Item = &ZoneFeature> + '_ {
        self.features
            .iter()
            .filter(move |feature| feature.geometry.contains(&point))
    }

    pub fn nearest(&self, point: &Coordinate) -> Option<NearestZone<'_>> {
        self.features
            .iter()
            .map(|feature| NearestZone {
                feature,
                distance_miles: feature.geometry.distance_miles(point),
            })
            .min_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TRACTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"GEOID": "48453001100"},
             "geometry": {"type": "Polygon", "coordinates": [[[-97.80,30.20],[-97.70,30.20],[-97.70,30.30],[-97.80,30.30],[-97.80,30.20]]]}},
            {"type": "Feature", "properties": {"NAME": "Tract 12"},
             "geometry": {"type": "Polygon", "coordinates": [[[-97.60,30.20],[-97.50,30.20],[-97.50,30.30],[-97.60,30.30],[-97.60,30.20]]]}},
            {"type": "Feature", "properties": {"OTHER": "x"},
             "geometry": {"type": "Polygon", "coordinates": [[[-97.75,30.25],[-97.65,30.25],[-97.65,30.35],[-97.75,30.35],[-97.75,30.25]]]}}
        ]
    }"#;

    fn layer() -> ZoneLayer {
        ZoneLayer::from_geojson_reader("qct", Cursor::new(TRACTS)).expect("layer loads")
    }

    #[test]
    fn labels_fall_back_through_keys_and_index() {
        let layer = layer();
        let labels: Vec<&str> = layer.features().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["48453001100", "Tract 12", "feature-2"]);
        assert_eq!(layer.name(), "qct");
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn flood_areas_are_labelled_by_area_id() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"FLD_AR_ID": "48201C_1234", "FLD_ZONE": "AE"},
             "geometry": {"type": "Polygon", "coordinates": [[[-95.4,29.7],[-95.3,29.7],[-95.3,29.8],[-95.4,29.8],[-95.4,29.7]]]}}
        ]}"#;
        let layer = ZoneLayer::from_geojson_reader("flood", Cursor::new(json)).expect("layer loads");
        assert_eq!(layer.features()[0].label, "48201C_1234");
    }

    #[test]
    fn locate_returns_first_containing_feature() {
        let layer = layer();
        let overlap = Coordinate {
            lat: 30.27,
            lon: -97.72,
        };
        assert_eq!(
            layer.locate(&overlap).map(|f| f.label.as_str()),
            Some("48453001100")
        );
        assert_eq!(layer.locate_all(overlap).count(), 2);

        let outside = Coordinate {
            lat: 30.10,
            lon: -97.55,
        };
        assert!(layer.locate(&outside).is_none());
    }

    #[test]
    fn nearest_reports_closest_feature_distance() {
        let layer = layer();
        let south_of_tract_12 = Coordinate {
            lat: 30.10,
            lon: -97.55,
        };
        let nearest = layer.nearest(&south_of_tract_12).expect("non-empty layer");
        assert_eq!(nearest.feature.label, "Tract 12");
        assert!((nearest.distance_miles - 6.909).abs() < 0.01);

        let empty = ZoneLayer::new("empty", Vec::new());
        assert!(empty.nearest(&south_of_tract_12).is_none());
        assert!(empty.is_empty());
    }

    #[test]
    fn from_geojson_path_propagates_io_errors() {
        let error = ZoneLayer::from_geojson_path("qct", "./does-not-exist.geojson")
            .expect_err("missing file");
        assert!(matches!(error, SpatialError::Io(_)));
    }
}
